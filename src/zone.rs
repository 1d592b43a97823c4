//! Zone resolution: raw generator lists become zone lists plus an
//! optional global zone.

use crate::bank::RawZone;
use crate::generator::GeneratorSet;

/// Which parent a zone list belongs to. The scope decides the
/// identifying reference used for global-zone detection: an instrument
/// reference for preset zones, a sample reference for instrument zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneScope {
    Preset,
    Instrument,
}

/// A resolved zone list. `zones` keeps every non-global zone in parser
/// order, including instrument zones with no sample reference; the
/// synthesis walk skips those with a warning while the diagnostic walk
/// records them. [`ResolvedZones::sample_zones`] is the filtered view.
#[derive(Clone, Debug, Default)]
pub struct ResolvedZones {
    pub global: Option<GeneratorSet>,
    pub zones: Vec<GeneratorSet>,
}

impl ResolvedZones {
    /// Instrument zones that actually carry a sample reference.
    pub fn sample_zones(&self) -> impl Iterator<Item = &GeneratorSet> {
        self.zones.iter().filter(|z| z.sample_id.is_some())
    }
}

/// Splits a raw zone list into its global zone and regular zones. The
/// first zone is the global zone iff it lacks the scope's identifying
/// reference; an empty list has no global zone.
pub fn resolve_zones(raw: &[RawZone], scope: ZoneScope) -> ResolvedZones {
    let mut resolved = ResolvedZones::default();

    for (i, zone) in raw.iter().enumerate() {
        let set = GeneratorSet::from_gen_list(zone);
        let reference = match scope {
            ZoneScope::Preset => set.instrument,
            ZoneScope::Instrument => set.sample_id,
        };

        if i == 0 && reference.is_none() {
            resolved.global = Some(set);
        } else {
            resolved.zones.push(set);
        }
    }

    resolved
}

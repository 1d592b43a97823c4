//! The audit variant of the conversion walk: nothing is discarded, every
//! zone is recorded and classified, and two analyses can be compared
//! side by side.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    bank::SoundBank,
    zone::{resolve_zones, ZoneScope},
};

/// Classification of one recorded zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneClass {
    /// Parent-level defaults shared by the sibling zones.
    Global,
    /// A regular zone with a sample reference.
    Valid,
    /// A non-global zone with no sample reference: a corruption signal
    /// or a zone-ordering violation.
    Invalid,
}

/// One zone observed during the audit walk. Fields that could not be
/// resolved (a missing or out-of-range instrument reference, an absent
/// sample reference) stay `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub bank: u16,
    pub program: u16,
    pub preset_name: String,
    /// Index of the owning preset zone within its preset.
    pub preset_zone: usize,
    pub instrument: Option<u16>,
    pub instrument_name: Option<String>,
    pub sample_id: Option<u16>,
    pub class: ZoneClass,
}

impl fmt::Display for ZoneRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03}:{:03} {} zone {}",
            self.bank, self.program, self.preset_name, self.preset_zone
        )?;
        match (&self.instrument_name, self.instrument) {
            (Some(name), _) => write!(f, " -> {}", name)?,
            (None, Some(idx)) => write!(f, " -> instrument {} (unresolved)", idx)?,
            (None, None) => write!(f, " -> no instrument")?,
        }
        match self.sample_id {
            Some(id) => write!(f, ", sample {}", id),
            None => write!(f, ", no sample"),
        }
    }
}

/// Zone counts of one analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_zones: usize,
    pub global_zones: usize,
    pub valid_zones: usize,
    pub invalid_zones: usize,
}

/// The structured report of one bank audit, serializable as a
/// self-describing record. Counts exclude the terminal sentinel
/// records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BankAnalysis {
    pub name: String,
    pub total_presets: usize,
    pub total_instruments: usize,
    pub total_samples: usize,
    pub zones: Vec<ZoneRecord>,
    pub zones_with_undefined_sample_id: Vec<ZoneRecord>,
    pub summary: AnalysisSummary,
}

impl BankAnalysis {
    /// Pairs this analysis with another for side-by-side inspection.
    pub fn compare<'a>(&'a self, other: &'a BankAnalysis) -> AnalysisComparison<'a> {
        AnalysisComparison {
            left: self,
            right: other,
        }
    }
}

/// Performs the same preset/instrument walk as the synthesizer but
/// keeps a record for every zone it sees, including ones the
/// synthesizer would drop.
pub fn analyze(bank: &SoundBank, name: impl Into<String>) -> BankAnalysis {
    let mut zones: Vec<ZoneRecord> = Vec::new();
    let instrument_count = bank.instrument_count();

    for (preset_idx, preset) in bank.presets.iter().enumerate() {
        if preset.is_sentinel() {
            continue;
        }
        let preset_zones = resolve_zones(bank.preset_generators(preset_idx), ZoneScope::Preset);
        let preset_global = preset_zones.global.clone().unwrap_or_default();

        for (zone_idx, zone) in preset_zones.zones.iter().enumerate() {
            let preset_gen = zone.merged_over(&preset_global);
            let record = |instrument_name: Option<String>,
                          sample_id: Option<u16>,
                          class: ZoneClass| ZoneRecord {
                bank: preset.bank,
                program: preset.program,
                preset_name: preset.name.clone(),
                preset_zone: zone_idx,
                instrument: preset_gen.instrument,
                instrument_name,
                sample_id,
                class,
            };

            let resolved_instrument = preset_gen
                .instrument
                .filter(|&idx| (idx as usize) < instrument_count);
            let Some(instrument_idx) = resolved_instrument else {
                // Missing or out-of-range reference: keep a flagged
                // record instead of skipping.
                zones.push(record(None, None, ZoneClass::Invalid));
                continue;
            };

            let instrument_name = bank
                .instruments
                .get(instrument_idx as usize)
                .map(|i| i.name.clone());
            let inst_zones = resolve_zones(
                bank.instrument_generators(instrument_idx as usize),
                ZoneScope::Instrument,
            );

            if inst_zones.global.is_some() {
                zones.push(record(instrument_name.clone(), None, ZoneClass::Global));
            }
            for inst_zone in &inst_zones.zones {
                let class = match inst_zone.sample_id {
                    Some(_) => ZoneClass::Valid,
                    None => ZoneClass::Invalid,
                };
                zones.push(record(instrument_name.clone(), inst_zone.sample_id, class));
            }
        }
    }

    let summary = AnalysisSummary {
        total_zones: zones.len(),
        global_zones: zones.iter().filter(|z| z.class == ZoneClass::Global).count(),
        valid_zones: zones.iter().filter(|z| z.class == ZoneClass::Valid).count(),
        invalid_zones: zones.iter().filter(|z| z.class == ZoneClass::Invalid).count(),
    };
    let zones_with_undefined_sample_id = zones
        .iter()
        .filter(|z| z.class == ZoneClass::Invalid)
        .cloned()
        .collect();

    BankAnalysis {
        name: name.into(),
        total_presets: bank.preset_count(),
        total_instruments: bank.instrument_count(),
        total_samples: bank.sample_count(),
        zones,
        zones_with_undefined_sample_id,
        summary,
    }
}

/// Two analyses rendered side by side for manual inspection.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisComparison<'a> {
    pub left: &'a BankAnalysis,
    pub right: &'a BankAnalysis,
}

impl fmt::Display for AnalysisComparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (l, r) = (self.left, self.right);
        let mut row = |label: &str, left: &dyn fmt::Display, right: &dyn fmt::Display| {
            writeln!(f, "{:<16} {:<24} {:<24}", label, left, right)
        };
        row("", &l.name, &r.name)?;
        row("presets", &l.total_presets, &r.total_presets)?;
        row("instruments", &l.total_instruments, &r.total_instruments)?;
        row("samples", &l.total_samples, &r.total_samples)?;
        row("zones", &l.summary.total_zones, &r.summary.total_zones)?;
        row("  global", &l.summary.global_zones, &r.summary.global_zones)?;
        row("  valid", &l.summary.valid_zones, &r.summary.valid_zones)?;
        row("  invalid", &l.summary.invalid_zones, &r.summary.invalid_zones)?;

        for side in [l, r] {
            if side.zones_with_undefined_sample_id.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "invalid zones in {}:", side.name)?;
            for zone in &side.zones_with_undefined_sample_id {
                writeln!(f, "  {}", zone)?;
            }
        }
        Ok(())
    }
}

//! The conversion pass: walks every preset → preset zone → instrument →
//! instrument zone combination, composes generators and emits playable
//! regions plus a deduplicated map of decoded sample buffers.

use std::{collections::HashMap, sync::Arc};

use log::warn;

use crate::{
    bank::SoundBank,
    generator::GeneratorSet,
    region::{resolve_loop, AmpEnvelope, SampleRegion},
    units::{centibels_to_gain, timecents_to_secs},
    zone::{resolve_zones, ZoneScope},
};

/// The finished output of one conversion pass: regions in walk order,
/// and one decoded buffer per sample actually referenced.
#[derive(Clone, Debug, Default)]
pub struct BankRegions {
    pub regions: Vec<SampleRegion>,
    pub samples: HashMap<u16, Arc<[f32]>>,
}

/// One entry of the event stream handed to a synthesis engine.
#[derive(Clone, Debug)]
pub enum SynthEvent {
    SampleLoad { sample_id: u16, data: Arc<[f32]> },
    Region(SampleRegion),
}

impl BankRegions {
    /// Drains the pass output as an event stream: every load event
    /// first, then the regions referencing them.
    pub fn into_events(self) -> impl Iterator<Item = SynthEvent> {
        let mut loads: Vec<_> = self.samples.into_iter().collect();
        loads.sort_by_key(|(sample_id, _)| *sample_id);

        loads
            .into_iter()
            .map(|(sample_id, data)| SynthEvent::SampleLoad { sample_id, data })
            .chain(self.regions.into_iter().map(SynthEvent::Region))
    }
}

/// Converts a decoded bank into its flat region table. Structurally
/// invalid references drop the affected zone with a warning; the pass
/// itself always completes.
pub fn synthesize_regions(bank: &SoundBank) -> BankRegions {
    let mut out = BankRegions::default();
    let defaults = GeneratorSet::instrument_defaults();
    let instrument_count = bank.instrument_count();
    let sample_count = bank.sample_count();

    for (preset_idx, preset) in bank.presets.iter().enumerate() {
        if preset.is_sentinel() {
            continue;
        }
        let preset_zones = resolve_zones(bank.preset_generators(preset_idx), ZoneScope::Preset);
        let preset_global = preset_zones.global.clone().unwrap_or_default();

        for zone in &preset_zones.zones {
            let preset_gen = zone.merged_over(&preset_global);

            let Some(instrument_idx) = preset_gen.instrument else {
                warn!(
                    "preset {:?}: zone has no instrument reference, skipping",
                    preset.name
                );
                continue;
            };
            if instrument_idx as usize >= instrument_count {
                warn!(
                    "preset {:?}: instrument reference {} out of range ({} instruments), skipping zone",
                    preset.name, instrument_idx, instrument_count
                );
                continue;
            }

            let inst_zones =
                resolve_zones(bank.instrument_generators(instrument_idx as usize), ZoneScope::Instrument);
            let inst_base = match &inst_zones.global {
                Some(global) => global.merged_over(&defaults),
                None => defaults.clone(),
            };

            for inst_zone in &inst_zones.zones {
                let Some(sample_id) = inst_zone.sample_id else {
                    warn!(
                        "instrument {}: zone has no sample reference, skipping",
                        instrument_idx
                    );
                    continue;
                };
                if sample_id as usize >= sample_count {
                    warn!(
                        "instrument {}: sample reference {} out of range ({} samples), skipping zone",
                        instrument_idx, sample_id, sample_count
                    );
                    continue;
                }

                let mut gen = inst_zone.merged_over(&inst_base);
                let velrange = gen
                    .velrange
                    .clone()
                    .or_else(|| preset_gen.velrange.clone())
                    .unwrap_or(0..=127);
                gen.add_numeric(&preset_gen);

                let header = &bank.samples[sample_id as usize];
                let data = out
                    .samples
                    .entry(sample_id)
                    .or_insert_with(|| decode_sample(&bank.sample_data[sample_id as usize]))
                    .clone();

                let tune = gen.coarse_tune.unwrap_or(0) as f32
                    + gen.fine_tune.unwrap_or(0) as f32 / 100.0;
                let root = gen.root_override.unwrap_or(header.original_pitch as i16);
                let base_pitch =
                    tune + header.pitch_correction as f32 / 100.0 - root as f32;

                let sample_start = compose_offset(gen.start_offset_coarse, gen.start_offset);
                let raw_end = compose_offset(gen.end_offset_coarse, gen.end_offset);
                // An end offset of exactly zero means the full buffer.
                let sample_end = if raw_end == 0 {
                    data.len() as u32
                } else {
                    raw_end.max(0) as u32
                };

                let loop_start = header.loop_start as i32
                    + compose_offset(gen.loop_start_offset_coarse, gen.loop_start_offset);
                let loop_end = header.loop_end as i32
                    + compose_offset(gen.loop_end_offset_coarse, gen.loop_end_offset);

                out.regions.push(SampleRegion {
                    bank: preset.bank,
                    program: preset.program,
                    keyrange: gen.keyrange.clone().unwrap_or(0..=127),
                    velrange,
                    sample_id,
                    sample_rate: header.sample_rate,
                    pitch: -base_pitch,
                    scale_tuning: gen.scale_tuning.unwrap_or(100) as f32 / 100.0,
                    pan: gen.pan.unwrap_or(0) as f32 / 500.0,
                    volume: centibels_to_gain(-(gen.attenuation.unwrap_or(0) as f32)),
                    exclusive_class: gen.exclusive_class.unwrap_or(0),
                    envelope: AmpEnvelope {
                        attack: timecents_to_secs(gen.env_attack.unwrap_or(-12000)),
                        hold: timecents_to_secs(gen.env_hold.unwrap_or(-12000)),
                        decay: timecents_to_secs(gen.env_decay.unwrap_or(-12000)),
                        sustain: 1.0 / centibels_to_gain(gen.env_sustain.unwrap_or(0) as f32),
                        release: timecents_to_secs(gen.env_release.unwrap_or(-12000)),
                    },
                    sample_loop: resolve_loop(
                        gen.sample_modes.unwrap_or(0),
                        loop_start,
                        loop_end,
                    ),
                    sample_start: sample_start.max(0) as u32,
                    sample_end,
                });
            }
        }
    }

    out
}

fn compose_offset(coarse: Option<i16>, fine: Option<i16>) -> i32 {
    coarse.unwrap_or(0) as i32 * 32768 + fine.unwrap_or(0) as i32
}

fn decode_sample(raw: &[i16]) -> Arc<[f32]> {
    raw.iter().map(|&s| s as f32 / 32767.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_maps_full_scale_to_unity() {
        let decoded = decode_sample(&[0, i16::MAX, -32767]);
        assert_eq!(decoded[0], 0.0);
        assert_eq!(decoded[1], 1.0);
        assert_eq!(decoded[2], -1.0);
    }

    #[test]
    fn coarse_offsets_scale_by_32768() {
        assert_eq!(compose_offset(Some(2), Some(10)), 65546);
        assert_eq!(compose_offset(None, Some(-5)), -5);
        assert_eq!(compose_offset(None, None), 0);
    }
}

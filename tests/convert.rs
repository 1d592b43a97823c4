//! End-to-end conversion and audit tests over synthetically built banks.

use std::sync::Arc;

use sf2_regions::bank::{
    GenAmount, InstrumentHeader, PresetHeader, RawGenerator, RawZone, SampleHeader, SoundBank,
};
use sf2_regions::{analyze, synthesize_regions, BankAnalysis, SampleLoop, SynthEvent, ZoneClass};
use soundfont::data::hydra::generator::GeneratorType;

fn value(ty: GeneratorType, v: i16) -> RawGenerator {
    RawGenerator {
        ty,
        amount: GenAmount::Value(v),
    }
}

fn index(ty: GeneratorType, v: u16) -> RawGenerator {
    RawGenerator {
        ty,
        amount: GenAmount::Index(v),
    }
}

fn range(ty: GeneratorType, lo: u8, hi: u8) -> RawGenerator {
    RawGenerator {
        ty,
        amount: GenAmount::Range { lo, hi },
    }
}

fn zone(gen_list: Vec<RawGenerator>) -> RawZone {
    RawZone { gen_list }
}

fn preset(name: &str, bank: u16, program: u16) -> PresetHeader {
    PresetHeader {
        name: name.to_string(),
        bank,
        program,
    }
}

fn instrument(name: &str) -> InstrumentHeader {
    InstrumentHeader {
        name: name.to_string(),
    }
}

fn sample(name: &str, loop_start: u32, loop_end: u32) -> SampleHeader {
    SampleHeader {
        name: name.to_string(),
        sample_rate: 44100,
        original_pitch: 60,
        pitch_correction: 0,
        loop_start,
        loop_end,
    }
}

fn buffer(len: usize) -> Arc<[i16]> {
    vec![0i16; len].into()
}

/// One preset with an empty global zone and one zone referencing
/// instrument 0; the instrument has a pan global zone and one full-range
/// zone on sample 0 with a continuous loop. Sentinels included.
fn single_region_bank() -> SoundBank {
    SoundBank {
        presets: vec![preset("Test Preset", 0, 0), preset("EOP", 0, 0)],
        preset_zones: vec![
            vec![zone(vec![]), zone(vec![index(GeneratorType::Instrument, 0)])],
            vec![],
        ],
        instruments: vec![instrument("Test Instrument"), instrument("EOI")],
        instrument_zones: vec![
            vec![
                zone(vec![value(GeneratorType::Pan, 0)]),
                zone(vec![
                    range(GeneratorType::KeyRange, 0, 127),
                    range(GeneratorType::VelRange, 0, 127),
                    value(GeneratorType::SampleModes, 1),
                    index(GeneratorType::SampleID, 0),
                ]),
            ],
            vec![],
        ],
        samples: vec![sample("Sample 0", 100, 200), sample("EOS", 0, 0)],
        sample_data: vec![buffer(300), buffer(0)],
    }
}

#[test]
fn single_region_bank_resolves_to_expected_parameters() {
    let output = synthesize_regions(&single_region_bank());
    assert_eq!(output.regions.len(), 1);

    let region = &output.regions[0];
    assert_eq!(region.bank, 0);
    assert_eq!(region.program, 0);
    assert_eq!(region.keyrange, 0..=127);
    assert_eq!(region.velrange, 0..=127);
    assert_eq!(region.pitch, 60.0);
    assert_eq!(
        region.sample_loop,
        SampleLoop::Continuous {
            start: 100,
            end: 200
        }
    );
    assert_eq!(region.pan, 0.0);
    assert_eq!(region.volume, 1.0);
    assert_eq!(region.envelope.sustain, 1.0);
    // Default envelope times are effectively instant.
    assert!(region.envelope.attack < 0.01);
    assert!(region.envelope.release < 0.01);
    // End offset of zero means the whole decoded buffer.
    assert_eq!(region.sample_start, 0);
    assert_eq!(region.sample_end, 300);
    assert_eq!(region.sample_rate, 44100);
}

#[test]
fn decoded_buffers_are_cached_per_sample() {
    let mut bank = single_region_bank();
    // Second zone on the same sample.
    bank.instrument_zones[0].push(zone(vec![
        range(GeneratorType::KeyRange, 0, 60),
        index(GeneratorType::SampleID, 0),
    ]));

    let output = synthesize_regions(&bank);
    assert_eq!(output.regions.len(), 2);
    assert_eq!(output.samples.len(), 1);

    let cached = &output.samples[&0];
    assert_eq!(cached.len(), 300);
}

#[test]
fn out_of_range_instrument_reference_drops_only_that_zone() {
    let mut bank = single_region_bank();
    bank.preset_zones[0].insert(1, zone(vec![index(GeneratorType::Instrument, 999)]));

    let output = synthesize_regions(&bank);
    // The bad zone yields nothing; the valid zone still converts.
    assert_eq!(output.regions.len(), 1);
    assert_eq!(output.regions[0].pitch, 60.0);
}

#[test]
fn out_of_range_sample_reference_drops_only_that_zone() {
    let mut bank = single_region_bank();
    bank.instrument_zones[0].push(zone(vec![index(GeneratorType::SampleID, 42)]));

    let output = synthesize_regions(&bank);
    assert_eq!(output.regions.len(), 1);
}

#[test]
fn referencing_the_sentinel_instrument_is_out_of_range() {
    let mut bank = single_region_bank();
    // Index 1 is the EOI record, not a real instrument.
    bank.preset_zones[0][1] = zone(vec![index(GeneratorType::Instrument, 1)]);

    let output = synthesize_regions(&bank);
    assert!(output.regions.is_empty());
}

#[test]
fn preset_generators_add_onto_instrument_generators() {
    let mut bank = single_region_bank();
    bank.preset_zones[0][1] = zone(vec![
        index(GeneratorType::Instrument, 0),
        value(GeneratorType::Pan, 250),
        value(GeneratorType::InitialAttenuation, 60),
        range(GeneratorType::VelRange, 10, 20),
    ]);
    // Rebuild the instrument zone without a velocity range of its own.
    bank.instrument_zones[0][1] = zone(vec![
        range(GeneratorType::KeyRange, 0, 127),
        value(GeneratorType::Pan, 100),
        value(GeneratorType::SampleModes, 1),
        index(GeneratorType::SampleID, 0),
    ]);

    let output = synthesize_regions(&bank);
    assert_eq!(output.regions.len(), 1);

    let region = &output.regions[0];
    // 100 from the instrument zone plus 250 from the preset zone.
    assert!((region.pan - 350.0 / 500.0).abs() < 1e-6);
    // Attenuation was only set at preset level; the built-in default 0
    // makes it additive all the same.
    assert!((region.volume - 10f32.powf(-60.0 / 200.0)).abs() < 1e-6);
    // The instrument zone has no velocity range, so the preset's is
    // inherited rather than intersected.
    assert_eq!(region.velrange, 10..=20);
}

#[test]
fn root_key_override_wins_over_the_sample_pitch() {
    let mut bank = single_region_bank();
    bank.instrument_zones[0][1]
        .gen_list
        .push(value(GeneratorType::OverridingRootKey, 72));

    let output = synthesize_regions(&bank);
    assert_eq!(output.regions[0].pitch, 72.0);
}

#[test]
fn tuning_shifts_the_stored_pitch() {
    let mut bank = single_region_bank();
    bank.instrument_zones[0][1]
        .gen_list
        .push(value(GeneratorType::CoarseTune, 2));
    bank.instrument_zones[0][1]
        .gen_list
        .push(value(GeneratorType::FineTune, 50));

    let output = synthesize_regions(&bank);
    // pitch = -(tune - original_pitch)
    assert!((output.regions[0].pitch - (60.0 - 2.5)).abs() < 1e-6);
}

#[test]
fn region_count_matches_valid_zone_combinations() {
    let mut bank = single_region_bank();
    // Two preset zones, both on instrument 0.
    bank.preset_zones[0].push(zone(vec![index(GeneratorType::Instrument, 0)]));
    // Instrument 0: two valid zones plus one without a sample reference.
    bank.instrument_zones[0].push(zone(vec![index(GeneratorType::SampleID, 0)]));
    bank.instrument_zones[0].push(zone(vec![range(GeneratorType::KeyRange, 0, 10)]));

    let output = synthesize_regions(&bank);
    // 2 preset zones x 2 instrument zones with a sample reference.
    assert_eq!(output.regions.len(), 4);
}

#[test]
fn events_load_samples_before_regions() {
    let events: Vec<SynthEvent> = synthesize_regions(&single_region_bank())
        .into_events()
        .collect();
    assert_eq!(events.len(), 2);

    match &events[0] {
        SynthEvent::SampleLoad { sample_id, data } => {
            assert_eq!(*sample_id, 0);
            assert_eq!(data.len(), 300);
        }
        other => panic!("expected a sample load first, got {:?}", other),
    }
    match &events[1] {
        SynthEvent::Region(region) => assert_eq!(region.sample_id, 0),
        other => panic!("expected a region second, got {:?}", other),
    }
}

#[test]
fn analyzer_flags_zones_without_a_sample_reference() {
    let mut bank = single_region_bank();
    bank.instrument_zones[0].push(zone(vec![range(GeneratorType::KeyRange, 0, 10)]));

    let analysis = analyze(&bank, "test.sf2");
    assert_eq!(analysis.total_presets, 1);
    assert_eq!(analysis.total_instruments, 1);
    assert_eq!(analysis.total_samples, 1);

    // Global pan zone + valid zone + the flagged one.
    assert_eq!(analysis.summary.total_zones, 3);
    assert_eq!(analysis.summary.global_zones, 1);
    assert_eq!(analysis.summary.valid_zones, 1);
    assert_eq!(analysis.summary.invalid_zones, 1);

    assert_eq!(analysis.zones_with_undefined_sample_id.len(), 1);
    let flagged = &analysis.zones_with_undefined_sample_id[0];
    assert_eq!(flagged.class, ZoneClass::Invalid);
    assert_eq!(flagged.sample_id, None);
    assert_eq!(flagged.instrument_name.as_deref(), Some("Test Instrument"));
}

#[test]
fn analyzer_keeps_a_record_for_unresolvable_instrument_references() {
    let mut bank = single_region_bank();
    bank.preset_zones[0][1] = zone(vec![index(GeneratorType::Instrument, 7)]);

    let analysis = analyze(&bank, "test.sf2");
    assert_eq!(analysis.summary.total_zones, 1);
    assert_eq!(analysis.summary.invalid_zones, 1);

    let record = &analysis.zones[0];
    assert_eq!(record.instrument, Some(7));
    assert_eq!(record.instrument_name, None);
    assert_eq!(record.sample_id, None);
    assert_eq!(record.class, ZoneClass::Invalid);
}

#[test]
fn analysis_round_trips_through_json() {
    let analysis = analyze(&single_region_bank(), "roundtrip.sf2");
    let json = serde_json::to_string(&analysis).unwrap();
    let back: BankAnalysis = serde_json::from_str(&json).unwrap();

    assert_eq!(back.name, "roundtrip.sf2");
    assert_eq!(back.summary, analysis.summary);
    assert_eq!(back.zones, analysis.zones);
}

#[test]
fn comparison_renders_both_sides() {
    let left = analyze(&single_region_bank(), "left.sf2");

    let mut corrupt = single_region_bank();
    corrupt.instrument_zones[0].push(zone(vec![range(GeneratorType::KeyRange, 0, 10)]));
    let right = analyze(&corrupt, "right.sf2");

    let rendered = left.compare(&right).to_string();
    assert!(rendered.contains("left.sf2"));
    assert!(rendered.contains("right.sf2"));
    assert!(rendered.contains("invalid zones in right.sf2:"));
}

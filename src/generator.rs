//! Composed generator state: one optional slot per supported generator,
//! so "field present" and "field absent, inherit from context" stay
//! distinct through every merge step.

use std::ops::RangeInclusive;

use soundfont::data::hydra::generator::GeneratorType;

use crate::bank::RawZone;

/// The generator values of one zone, or of several zones composed
/// together. Values stay in their raw SF2 units (timecents, centibels,
/// sample counts) until region derivation.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct GeneratorSet {
    /// Instrument reference; only meaningful on preset-level zones.
    pub instrument: Option<u16>,
    /// Sample reference; only meaningful on instrument-level zones.
    pub sample_id: Option<u16>,
    pub start_offset: Option<i16>,
    pub start_offset_coarse: Option<i16>,
    pub end_offset: Option<i16>,
    pub end_offset_coarse: Option<i16>,
    pub loop_start_offset: Option<i16>,
    pub loop_start_offset_coarse: Option<i16>,
    pub loop_end_offset: Option<i16>,
    pub loop_end_offset_coarse: Option<i16>,
    pub sample_modes: Option<i16>,
    pub pan: Option<i16>,
    pub attenuation: Option<i16>,
    pub env_attack: Option<i16>,
    pub env_hold: Option<i16>,
    pub env_decay: Option<i16>,
    pub env_sustain: Option<i16>,
    pub env_release: Option<i16>,
    pub coarse_tune: Option<i16>,
    pub fine_tune: Option<i16>,
    pub scale_tuning: Option<i16>,
    pub root_override: Option<i16>,
    pub exclusive_class: Option<i16>,
    pub keyrange: Option<RangeInclusive<u8>>,
    pub velrange: Option<RangeInclusive<u8>>,
}

impl GeneratorSet {
    /// Collects the recognized generators of one raw zone. Unknown or
    /// malformed generator records are ignored.
    pub fn from_gen_list(zone: &RawZone) -> Self {
        let mut set = GeneratorSet::default();

        for gen in &zone.gen_list {
            match gen.ty {
                GeneratorType::StartAddrsOffset => set.start_offset = gen.amount.value(),
                GeneratorType::StartAddrsCoarseOffset => {
                    set.start_offset_coarse = gen.amount.value()
                }
                GeneratorType::EndAddrsOffset => set.end_offset = gen.amount.value(),
                GeneratorType::EndAddrsCoarseOffset => set.end_offset_coarse = gen.amount.value(),
                GeneratorType::StartloopAddrsOffset => set.loop_start_offset = gen.amount.value(),
                GeneratorType::StartloopAddrsCoarseOffset => {
                    set.loop_start_offset_coarse = gen.amount.value()
                }
                GeneratorType::EndloopAddrsOffset => set.loop_end_offset = gen.amount.value(),
                GeneratorType::EndloopAddrsCoarseOffset => {
                    set.loop_end_offset_coarse = gen.amount.value()
                }
                GeneratorType::SampleModes => set.sample_modes = gen.amount.value(),
                GeneratorType::Pan => set.pan = gen.amount.value(),
                GeneratorType::InitialAttenuation => set.attenuation = gen.amount.value(),
                GeneratorType::AttackVolEnv => set.env_attack = gen.amount.value(),
                GeneratorType::HoldVolEnv => set.env_hold = gen.amount.value(),
                GeneratorType::DecayVolEnv => set.env_decay = gen.amount.value(),
                GeneratorType::SustainVolEnv => set.env_sustain = gen.amount.value(),
                GeneratorType::ReleaseVolEnv => set.env_release = gen.amount.value(),
                GeneratorType::CoarseTune => set.coarse_tune = gen.amount.value(),
                GeneratorType::FineTune => set.fine_tune = gen.amount.value(),
                GeneratorType::ScaleTuning => set.scale_tuning = gen.amount.value(),
                GeneratorType::OverridingRootKey => set.root_override = gen.amount.value(),
                GeneratorType::ExclusiveClass => set.exclusive_class = gen.amount.value(),
                GeneratorType::KeyRange => set.keyrange = gen.amount.range(),
                GeneratorType::VelRange => set.velrange = gen.amount.range(),
                GeneratorType::Instrument => set.instrument = gen.amount.index(),
                GeneratorType::SampleID => set.sample_id = gen.amount.index(),
                _ => {}
            }
        }

        set
    }

    /// Per-field override merge: this set's value wins wherever present,
    /// `base` fills everything else.
    pub fn merged_over(&self, base: &GeneratorSet) -> GeneratorSet {
        macro_rules! pick {
            ($($field:ident),+ $(,)?) => {
                GeneratorSet {
                    $($field: self.$field.clone().or_else(|| base.$field.clone())),+
                }
            };
        }
        pick!(
            instrument,
            sample_id,
            start_offset,
            start_offset_coarse,
            end_offset,
            end_offset_coarse,
            loop_start_offset,
            loop_start_offset_coarse,
            loop_end_offset,
            loop_end_offset_coarse,
            sample_modes,
            pan,
            attenuation,
            env_attack,
            env_hold,
            env_decay,
            env_sustain,
            env_release,
            coarse_tune,
            fine_tune,
            scale_tuning,
            root_override,
            exclusive_class,
            keyrange,
            velrange,
        )
    }

    /// Preset-level numeric generators add on top of instrument-level
    /// ones rather than overriding them. A field is summed only when
    /// present on both sides; reference and range fields never
    /// participate.
    pub fn add_numeric(&mut self, preset: &GeneratorSet) {
        macro_rules! add {
            ($($field:ident),+ $(,)?) => {
                $(if let (Some(a), Some(b)) = (self.$field, preset.$field) {
                    self.$field = Some(a.saturating_add(b));
                })+
            };
        }
        add!(
            start_offset,
            start_offset_coarse,
            end_offset,
            end_offset_coarse,
            loop_start_offset,
            loop_start_offset_coarse,
            loop_end_offset,
            loop_end_offset_coarse,
            sample_modes,
            pan,
            attenuation,
            env_attack,
            env_hold,
            env_decay,
            env_sustain,
            env_release,
            coarse_tune,
            fine_tune,
            scale_tuning,
            root_override,
            exclusive_class,
        );
    }

    /// Built-in defaults underneath every instrument-level merge. Plain
    /// numeric generators default to 0, envelope times to -12000
    /// timecents, scale tuning to 100. References, ranges and the root
    /// key override stay absent so inheritance and fallback rules can
    /// see that nothing was specified.
    pub fn instrument_defaults() -> GeneratorSet {
        GeneratorSet {
            instrument: None,
            sample_id: None,
            start_offset: Some(0),
            start_offset_coarse: Some(0),
            end_offset: Some(0),
            end_offset_coarse: Some(0),
            loop_start_offset: Some(0),
            loop_start_offset_coarse: Some(0),
            loop_end_offset: Some(0),
            loop_end_offset_coarse: Some(0),
            sample_modes: Some(0),
            pan: Some(0),
            attenuation: Some(0),
            env_attack: Some(-12000),
            env_hold: Some(-12000),
            env_decay: Some(-12000),
            env_sustain: Some(0),
            env_release: Some(-12000),
            coarse_tune: Some(0),
            fine_tune: Some(0),
            scale_tuning: Some(100),
            root_override: None,
            exclusive_class: Some(0),
            keyrange: None,
            velrange: None,
        }
    }
}

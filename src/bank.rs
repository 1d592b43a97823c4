//! The parsed-bank contract: the logical records an SF2 file decodes to,
//! plus a loader that fills them in from the `soundfont` parser.
//!
//! Everything downstream (zone resolution, region synthesis, diagnostics)
//! works off these records only; the RIFF container layout never leaks
//! past this module.

use std::{fs::File, ops::RangeInclusive, path::PathBuf, sync::Arc};

use soundfont::data::hydra::generator::GeneratorType;
use thiserror::Error;

/// Errors that can be generated when loading an SF2 file. All of these
/// are fatal; recovery only happens for semantically inconsistent
/// generator references, never for a corrupt container.
#[derive(Error, Debug, Clone)]
pub enum BankError {
    #[error("Failed to read file: {0}")]
    FailedToReadFile(PathBuf),

    #[error("Failed to parse file: {0}")]
    FailedToParseFile(String),

    #[error("Bank has no sample data chunk")]
    MissingSampleData,

    #[error("Sample {name:?} window [{start}, {end}) is outside the sample data")]
    SampleOutOfBounds { name: String, start: u32, end: u32 },
}

/// The amount payload of one raw generator record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenAmount {
    /// A plain numeric generator value.
    Value(i16),
    /// An instrument or sample index.
    Index(u16),
    /// A closed key or velocity range.
    Range { lo: u8, hi: u8 },
}

impl GenAmount {
    pub fn value(self) -> Option<i16> {
        match self {
            GenAmount::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn index(self) -> Option<u16> {
        match self {
            GenAmount::Index(v) => Some(v),
            _ => None,
        }
    }

    pub fn range(self) -> Option<RangeInclusive<u8>> {
        match self {
            GenAmount::Range { lo, hi } => Some(lo..=hi),
            _ => None,
        }
    }
}

/// One generator as emitted by the bank parser, before any zone
/// resolution or composition.
#[derive(Clone, Copy, Debug)]
pub struct RawGenerator {
    pub ty: GeneratorType,
    pub amount: GenAmount,
}

/// The ordered generator list of one raw preset or instrument zone.
#[derive(Clone, Debug, Default)]
pub struct RawZone {
    pub gen_list: Vec<RawGenerator>,
}

/// Header of one preset record.
#[derive(Clone, Debug)]
pub struct PresetHeader {
    pub name: String,
    pub bank: u16,
    pub program: u16,
}

impl PresetHeader {
    /// The terminal end-of-presets record.
    pub fn is_sentinel(&self) -> bool {
        is_sentinel_name(&self.name, "EOP")
    }
}

/// Header of one instrument record.
#[derive(Clone, Debug)]
pub struct InstrumentHeader {
    pub name: String,
}

impl InstrumentHeader {
    /// The terminal end-of-instruments record.
    pub fn is_sentinel(&self) -> bool {
        is_sentinel_name(&self.name, "EOI")
    }
}

/// Immutable facts about one raw sample. Loop points are relative to
/// the sample's own window, not to the shared sample data chunk.
#[derive(Clone, Debug)]
pub struct SampleHeader {
    pub name: String,
    pub sample_rate: u32,
    pub original_pitch: u8,
    pub pitch_correction: i8,
    pub loop_start: u32,
    pub loop_end: u32,
}

impl SampleHeader {
    /// The terminal end-of-samples record.
    pub fn is_sentinel(&self) -> bool {
        is_sentinel_name(&self.name, "EOS")
    }
}

// Record names in SF2 files are fixed-width and NUL padded.
fn is_sentinel_name(name: &str, sentinel: &str) -> bool {
    name.trim_end_matches('\0').trim() == sentinel
}

/// A decoded bank: ordered header records, raw 16-bit sample buffers
/// and the per-zone generator lists of every preset and instrument.
///
/// Sentinel records are kept as stored; the walks recognize them by
/// name, so banks from parsers that strip them work unchanged.
#[derive(Clone, Debug, Default)]
pub struct SoundBank {
    pub presets: Vec<PresetHeader>,
    pub instruments: Vec<InstrumentHeader>,
    pub samples: Vec<SampleHeader>,
    pub sample_data: Vec<Arc<[i16]>>,
    pub preset_zones: Vec<Vec<RawZone>>,
    pub instrument_zones: Vec<Vec<RawZone>>,
}

impl SoundBank {
    /// Reads and decodes an SF2 file. Container-level problems are
    /// returned as errors; reference-level inconsistencies are left for
    /// the synthesis and diagnostic walks to deal with.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, BankError> {
        let path: PathBuf = path.into();
        let path: PathBuf = path
            .canonicalize()
            .map_err(|_| BankError::FailedToReadFile(path.clone()))?;
        let mut file =
            File::open(&path).map_err(|_| BankError::FailedToReadFile(path.clone()))?;
        let file = &mut file;
        let sf2 = soundfont::SoundFont2::load(file)
            .map_err(|e| BankError::FailedToParseFile(format!("{:#?}", e)))?;

        Self::from_soundfont(sf2, file)
    }

    fn from_soundfont(sf2: soundfont::SoundFont2, file: &mut File) -> Result<Self, BankError> {
        let smpl = sf2
            .sample_data
            .smpl
            .ok_or(BankError::MissingSampleData)?
            .read_contents(file)
            .map_err(|_| BankError::FailedToParseFile("unreadable smpl chunk".to_string()))?;

        // 16-bit little-endian frames. Banks carrying the 24-bit sm24
        // extension are read at 16-bit precision.
        let frames: Vec<i16> = smpl
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();

        let mut samples = Vec::with_capacity(sf2.sample_headers.len());
        let mut sample_data = Vec::with_capacity(sf2.sample_headers.len());

        for h in &sf2.sample_headers {
            let window = frames
                .get(h.start as usize..h.end as usize)
                .ok_or_else(|| BankError::SampleOutOfBounds {
                    name: h.name.clone(),
                    start: h.start,
                    end: h.end,
                })?;
            sample_data.push(Arc::from(window));
            samples.push(SampleHeader {
                name: h.name.clone(),
                sample_rate: h.sample_rate,
                original_pitch: h.origpitch,
                pitch_correction: h.pitchadj,
                loop_start: h.loop_start.saturating_sub(h.start),
                loop_end: h.loop_end.saturating_sub(h.start),
            });
        }

        Ok(SoundBank {
            presets: sf2
                .presets
                .iter()
                .map(|p| PresetHeader {
                    name: p.header.name.clone(),
                    bank: p.header.bank,
                    program: p.header.preset,
                })
                .collect(),
            preset_zones: sf2
                .presets
                .iter()
                .map(|p| p.zones.iter().map(convert_zone).collect())
                .collect(),
            instruments: sf2
                .instruments
                .iter()
                .map(|i| InstrumentHeader {
                    name: i.header.name.clone(),
                })
                .collect(),
            instrument_zones: sf2
                .instruments
                .iter()
                .map(|i| i.zones.iter().map(convert_zone).collect())
                .collect(),
            samples,
            sample_data,
        })
    }

    /// Raw zone list of the preset at `index`.
    pub fn preset_generators(&self, index: usize) -> &[RawZone] {
        self.preset_zones.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Raw zone list of the instrument at `index`.
    pub fn instrument_generators(&self, index: usize) -> &[RawZone] {
        self.instrument_zones
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of presets, excluding the terminal sentinel.
    pub fn preset_count(&self) -> usize {
        self.presets.iter().filter(|p| !p.is_sentinel()).count()
    }

    /// Number of instruments, excluding the terminal sentinel. This is
    /// also the exclusive upper bound for valid instrument references.
    pub fn instrument_count(&self) -> usize {
        self.instruments.iter().filter(|i| !i.is_sentinel()).count()
    }

    /// Number of samples, excluding the terminal sentinel. This is also
    /// the exclusive upper bound for valid sample references.
    pub fn sample_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_sentinel()).count()
    }
}

fn convert_zone(zone: &soundfont::Zone) -> RawZone {
    let gen_list = zone
        .gen_list
        .iter()
        .filter_map(|gen| {
            let amount = match gen.ty {
                GeneratorType::KeyRange | GeneratorType::VelRange => {
                    let range = gen.amount.as_range()?;
                    GenAmount::Range {
                        lo: range.low,
                        hi: range.high,
                    }
                }
                GeneratorType::Instrument | GeneratorType::SampleID => {
                    GenAmount::Index(*gen.amount.as_u16()?)
                }
                _ => GenAmount::Value(*gen.amount.as_i16()?),
            };
            Some(RawGenerator { ty: gen.ty, amount })
        })
        .collect();

    RawZone { gen_list }
}

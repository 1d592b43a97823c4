//! Flattens SF2 SoundFont banks into a table of per-region playback
//! parameters and decoded sample buffers for a sample-based synthesizer,
//! and audits the same resolution walk for structural corruption.
//!
//! The binary container is decoded by the `soundfont` crate; this crate
//! owns everything after that: zone resolution with the global-zone
//! defaulting rule, generator composition (override plus the additive
//! preset-over-instrument rule), derived playback parameters, and the
//! diagnostic walk that classifies every zone instead of dropping the
//! broken ones.
//!
//! ```no_run
//! use sf2_regions::{synthesize_regions, SoundBank};
//!
//! # fn main() -> Result<(), sf2_regions::BankError> {
//! let bank = SoundBank::load("bank.sf2")?;
//! let output = synthesize_regions(&bank);
//! for region in &output.regions {
//!     println!("{:03}:{:03} sample {}", region.bank, region.program, region.sample_id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bank;
pub mod diagnostic;
pub mod generator;
pub mod region;
pub mod synth;
pub mod units;
pub mod zone;

pub use bank::{BankError, SoundBank};
pub use diagnostic::{analyze, AnalysisSummary, BankAnalysis, ZoneClass, ZoneRecord};
pub use generator::GeneratorSet;
pub use region::{AmpEnvelope, SampleLoop, SampleRegion};
pub use synth::{synthesize_regions, BankRegions, SynthEvent};
pub use zone::{resolve_zones, ResolvedZones, ZoneScope};

//! The synthesis-ready output types: one region per playable
//! preset/instrument/sample combination.

use std::ops::RangeInclusive;

/// Resolved loop behavior of one region, with its window in samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleLoop {
    None,
    Continuous { start: u32, end: u32 },
    Sustain { start: u32, end: u32 },
}

/// Amplitude envelope: stage times in seconds, sustain as a linear
/// level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmpEnvelope {
    pub attack: f32,
    pub hold: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

/// One fully resolved, immutable playback unit. The sample window is
/// `[sample_start, sample_end)` into the decoded buffer identified by
/// `sample_id`.
#[derive(Clone, Debug)]
pub struct SampleRegion {
    pub bank: u16,
    pub program: u16,
    pub keyrange: RangeInclusive<u8>,
    pub velrange: RangeInclusive<u8>,
    pub sample_id: u16,
    pub sample_rate: u32,
    /// Semitone offset applied on top of the played key.
    pub pitch: f32,
    pub scale_tuning: f32,
    /// -1.0 (left) to 1.0 (right).
    pub pan: f32,
    pub volume: f32,
    pub exclusive_class: i16,
    pub envelope: AmpEnvelope,
    pub sample_loop: SampleLoop,
    pub sample_start: u32,
    pub sample_end: u32,
}

/// Resolves the raw sample-modes code against the computed loop window.
///
/// Mode 1 with a non-positive loop end historically falls through to
/// the mode 3 check, which rejects it again; either looping mode with a
/// non-positive end therefore resolves to `None`. Keep the truth table
/// below intact when touching this.
pub fn resolve_loop(sample_modes: i16, start: i32, end: i32) -> SampleLoop {
    match sample_modes {
        1 if end > 0 => SampleLoop::Continuous {
            start: start.max(0) as u32,
            end: end as u32,
        },
        1 | 3 if end > 0 => SampleLoop::Sustain {
            start: start.max(0) as u32,
            end: end as u32,
        },
        _ => SampleLoop::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_zero_never_loops() {
        assert_eq!(resolve_loop(0, 100, 200), SampleLoop::None);
        assert_eq!(resolve_loop(0, 0, 0), SampleLoop::None);
    }

    #[test]
    fn mode_one_loops_continuously_with_positive_end() {
        assert_eq!(
            resolve_loop(1, 100, 200),
            SampleLoop::Continuous {
                start: 100,
                end: 200
            }
        );
    }

    #[test]
    fn mode_one_without_positive_end_does_not_loop() {
        assert_eq!(resolve_loop(1, 100, 0), SampleLoop::None);
        assert_eq!(resolve_loop(1, 100, -5), SampleLoop::None);
    }

    #[test]
    fn mode_three_sustains_with_positive_end() {
        assert_eq!(
            resolve_loop(3, 100, 200),
            SampleLoop::Sustain {
                start: 100,
                end: 200
            }
        );
    }

    #[test]
    fn mode_three_without_positive_end_does_not_loop() {
        assert_eq!(resolve_loop(3, 100, 0), SampleLoop::None);
        assert_eq!(resolve_loop(3, 100, -1), SampleLoop::None);
    }

    #[test]
    fn unknown_modes_do_not_loop() {
        assert_eq!(resolve_loop(2, 100, 200), SampleLoop::None);
        assert_eq!(resolve_loop(-1, 100, 200), SampleLoop::None);
    }

    #[test]
    fn negative_loop_start_clamps_to_zero() {
        assert_eq!(
            resolve_loop(1, -40, 200),
            SampleLoop::Continuous { start: 0, end: 200 }
        );
    }
}

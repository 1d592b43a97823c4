//! Conversions out of the SF2 logarithmic unit domains.

/// Converts absolute timecents to seconds. `-32768` is the format's
/// "instant" marker and maps to zero; everything else is clamped to the
/// usable range before the exponential.
pub fn timecents_to_secs(timecents: i16) -> f32 {
    if timecents <= -32768 {
        return 0.0;
    }
    2f32.powf(timecents.clamp(-12000, 8000) as f32 / 1200.0)
}

/// Converts centibels to a linear gain factor.
pub fn centibels_to_gain(centibels: f32) -> f32 {
    10f32.powf(centibels / 200.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_marker_maps_to_zero() {
        assert_eq!(timecents_to_secs(-32768), 0.0);
    }

    #[test]
    fn timecents_follow_the_exponential() {
        assert_eq!(timecents_to_secs(0), 1.0);
        assert_eq!(timecents_to_secs(1200), 2.0);
        assert!((timecents_to_secs(-1200) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn timecents_clamp_before_converting() {
        assert_eq!(timecents_to_secs(-20000), timecents_to_secs(-12000));
        assert_eq!(timecents_to_secs(12000), timecents_to_secs(8000));
    }

    #[test]
    fn centibel_gain() {
        assert_eq!(centibels_to_gain(0.0), 1.0);
        assert!((centibels_to_gain(200.0) - 10.0).abs() < 1e-5);
        assert!((centibels_to_gain(-200.0) - 0.1).abs() < 1e-6);
    }
}

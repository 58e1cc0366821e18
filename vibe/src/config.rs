//! Model parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Channels;

pub const DEFAULT_COLOR_DIST_THRESHOLD: u32 = 20;
pub const DEFAULT_BG_SAMPLES: usize = 16;
pub const DEFAULT_REQUIRED_BG_SAMPLES: usize = 2;
/// The 'subsampling' factor: an accepted pixel updates its model with
/// probability `1 / DEFAULT_LEARNING_RATE`.
pub const DEFAULT_LEARNING_RATE: u32 = 8;

/// Parameters of one background model. Immutable once a model is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Match radius ('R' in the ViBe paper). For RGB frames the squared
    /// Euclidean distance is compared against `(3 * R)^2`.
    pub color_dist_threshold: u32,
    /// Samples kept per pixel ('N').
    pub bg_samples: usize,
    /// Matching samples needed to call a pixel background ('#min').
    pub required_bg_samples: usize,
    /// Update probability denominator. Must be a power of two since the
    /// coin flip is `rng & (learning_rate - 1) == 0`.
    pub learning_rate: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            color_dist_threshold: DEFAULT_COLOR_DIST_THRESHOLD,
            bg_samples: DEFAULT_BG_SAMPLES,
            required_bg_samples: DEFAULT_REQUIRED_BG_SAMPLES,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl Params {
    pub fn new(
        color_dist_threshold: u32,
        bg_samples: usize,
        required_bg_samples: usize,
        learning_rate: u32,
    ) -> Self {
        Self {
            color_dist_threshold,
            bg_samples,
            required_bg_samples,
            learning_rate,
        }
    }

    /// Parses YAML, filling absent fields from [`Params::default`], and validates.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let params: Params = serde_yml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.color_dist_threshold == 0 {
            return Err(Error::ZeroThreshold);
        }
        if self.bg_samples == 0 {
            return Err(Error::ZeroSamples);
        }
        if self.required_bg_samples == 0 || self.required_bg_samples > self.bg_samples {
            return Err(Error::InvalidRequiredSamples {
                required: self.required_bg_samples,
                samples: self.bg_samples,
            });
        }
        if !self.learning_rate.is_power_of_two() {
            return Err(Error::LearningRateNotPowerOfTwo(self.learning_rate));
        }
        Ok(())
    }

    /// `learning_rate - 1`, the bits tested by the update coin flip.
    ///
    /// Only meaningful for params that passed [`validate`](Self::validate);
    /// every model constructor enforces that.
    #[inline]
    pub fn learning_rate_mask(&self) -> u32 {
        debug_assert!(self.learning_rate.is_power_of_two());
        self.learning_rate.wrapping_sub(1)
    }

    /// Distance a sample must stay strictly below to count as a match:
    /// absolute difference for gray, squared Euclidean for RGB.
    pub fn match_threshold(&self, channels: Channels) -> u32 {
        match channels {
            Channels::Gray => self.color_dist_threshold,
            Channels::Rgb => {
                let radius = self.color_dist_threshold.saturating_mul(3);
                radius.saturating_mul(radius)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = Params::default();
        params.validate().unwrap();
        assert_eq!(params.learning_rate_mask(), 7);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let params = Params {
            color_dist_threshold: 0,
            ..Params::default()
        };
        assert!(matches!(params.validate(), Err(Error::ZeroThreshold)));
    }

    #[test]
    fn test_zero_samples_rejected() {
        let params = Params {
            bg_samples: 0,
            ..Params::default()
        };
        assert!(matches!(params.validate(), Err(Error::ZeroSamples)));
    }

    #[test]
    fn test_required_exceeding_samples_rejected() {
        let params = Params::new(20, 4, 5, 8);
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidRequiredSamples {
                required: 5,
                samples: 4
            })
        ));
    }

    #[test]
    fn test_zero_required_rejected() {
        let params = Params::new(20, 4, 0, 8);
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidRequiredSamples { required: 0, .. })
        ));
    }

    #[test]
    fn test_required_equal_to_samples_accepted() {
        Params::new(20, 4, 4, 8).validate().unwrap();
    }

    #[test]
    fn test_learning_rate_power_of_two() {
        for rate in [1, 2, 4, 16, 1024] {
            Params::new(20, 16, 2, rate).validate().unwrap();
        }
        for rate in [0, 3, 6, 10, 15] {
            assert!(matches!(
                Params::new(20, 16, 2, rate).validate(),
                Err(Error::LearningRateNotPowerOfTwo(r)) if r == rate
            ));
        }
    }

    #[test]
    fn test_learning_rate_one_always_fires() {
        assert_eq!(Params::new(10, 4, 2, 1).learning_rate_mask(), 0);
    }

    #[test]
    fn test_match_threshold_per_channel_layout() {
        let params = Params::new(10, 16, 2, 8);
        assert_eq!(params.match_threshold(Channels::Gray), 10);
        assert_eq!(params.match_threshold(Channels::Rgb), 900);
    }

    #[test]
    fn test_from_yaml_partial() {
        let params = Params::from_yaml("color_dist_threshold: 12\nbg_samples: 20\n").unwrap();
        assert_eq!(params.color_dist_threshold, 12);
        assert_eq!(params.bg_samples, 20);
        assert_eq!(params.required_bg_samples, DEFAULT_REQUIRED_BG_SAMPLES);
        assert_eq!(params.learning_rate, DEFAULT_LEARNING_RATE);
    }

    #[test]
    fn test_from_yaml_validates() {
        let err = Params::from_yaml("learning_rate: 12\n").unwrap_err();
        assert!(matches!(err, Error::LearningRateNotPowerOfTwo(12)));
    }

    #[test]
    fn test_from_yaml_malformed() {
        let err = Params::from_yaml("bg_samples: [1, 2]\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_yaml_roundtrip_defaults() {
        let yaml = serde_yml::to_string(&Params::default()).unwrap();
        assert_eq!(Params::from_yaml(&yaml).unwrap(), Params::default());
    }
}

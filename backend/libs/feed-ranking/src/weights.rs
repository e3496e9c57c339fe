/// Feed ranking weights
///
/// One configuration struct replaces the decay/weight constants that used to be
/// duplicated across call sites. Defaults: 48h decay, 0.3 view-count weight,
/// 0.7 freshness weight.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RECENCY_DECAY_HOURS: f64 = 48.0;
pub const DEFAULT_VIEW_COUNT_WEIGHT: f64 = 0.3;
pub const DEFAULT_FRESHNESS_WEIGHT: f64 = 0.7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeightsError {
    #[error("recency_decay_hours must be a finite value greater than 0, got {0}")]
    InvalidDecay(f64),

    #[error("{name} must be a finite, non-negative value, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("Failed to parse {key}='{value}': {reason}")]
    Parse {
        key: String,
        value: String,
        reason: String,
    },
}

/// Weights applied by [`crate::ranking_score`].
///
/// `recency_decay_hours` is an e-folding constant: an article exactly
/// `recency_decay_hours` old keeps `1/e` (~0.368) of its recency, not half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedWeights {
    pub recency_decay_hours: f64,
    pub view_count_weight: f64,
    pub freshness_weight: f64,
}

impl Default for FeedWeights {
    fn default() -> Self {
        Self {
            recency_decay_hours: DEFAULT_RECENCY_DECAY_HOURS,
            view_count_weight: DEFAULT_VIEW_COUNT_WEIGHT,
            freshness_weight: DEFAULT_FRESHNESS_WEIGHT,
        }
    }
}

impl FeedWeights {
    pub fn new(recency_decay_hours: f64, view_count_weight: f64, freshness_weight: f64) -> Self {
        Self {
            recency_decay_hours,
            view_count_weight,
            freshness_weight,
        }
    }

    /// Reject weights that would make the score meaningless.
    pub fn validate(&self) -> Result<(), WeightsError> {
        if !self.recency_decay_hours.is_finite() || self.recency_decay_hours <= 0.0 {
            return Err(WeightsError::InvalidDecay(self.recency_decay_hours));
        }
        check_weight("view_count_weight", self.view_count_weight)?;
        check_weight("freshness_weight", self.freshness_weight)?;
        Ok(())
    }

    /// Copy that is always safe to score with.
    ///
    /// An invalid decay falls back to the default; negative or non-finite
    /// weights are clamped to 0.
    pub fn sanitized(&self) -> Self {
        let recency_decay_hours =
            if self.recency_decay_hours.is_finite() && self.recency_decay_hours > 0.0 {
                self.recency_decay_hours
            } else {
                DEFAULT_RECENCY_DECAY_HOURS
            };

        Self {
            recency_decay_hours,
            view_count_weight: clamp_weight(self.view_count_weight),
            freshness_weight: clamp_weight(self.freshness_weight),
        }
    }

    /// Load weights from `FEED_RECENCY_DECAY_HOURS`, `FEED_VIEW_COUNT_WEIGHT`
    /// and `FEED_FRESHNESS_WEIGHT`, falling back to defaults when unset.
    pub fn from_env() -> Result<Self, WeightsError> {
        let weights = Self {
            recency_decay_hours: parse_env_or_default(
                "FEED_RECENCY_DECAY_HOURS",
                DEFAULT_RECENCY_DECAY_HOURS,
            )?,
            view_count_weight: parse_env_or_default(
                "FEED_VIEW_COUNT_WEIGHT",
                DEFAULT_VIEW_COUNT_WEIGHT,
            )?,
            freshness_weight: parse_env_or_default(
                "FEED_FRESHNESS_WEIGHT",
                DEFAULT_FRESHNESS_WEIGHT,
            )?,
        };
        weights.validate()?;
        Ok(weights)
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<(), WeightsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WeightsError::InvalidWeight { name, value })
    }
}

fn clamp_weight(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn parse_env_or_default(key: &str, default: f64) -> Result<f64, WeightsError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: std::num::ParseFloatError| WeightsError::Parse {
            key: key.to_string(),
            value: val.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("FEED_RECENCY_DECAY_HOURS");
        std::env::remove_var("FEED_VIEW_COUNT_WEIGHT");
        std::env::remove_var("FEED_FRESHNESS_WEIGHT");
    }

    #[test]
    fn test_defaults_match_reference_constants() {
        let weights = FeedWeights::default();
        assert_eq!(weights.recency_decay_hours, 48.0);
        assert_eq!(weights.view_count_weight, 0.3);
        assert_eq!(weights.freshness_weight, 0.7);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_decay() {
        assert_eq!(
            FeedWeights::new(0.0, 0.3, 0.7).validate(),
            Err(WeightsError::InvalidDecay(0.0))
        );
        assert!(FeedWeights::new(-1.0, 0.3, 0.7).validate().is_err());
        assert!(FeedWeights::new(f64::NAN, 0.3, 0.7).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_weights() {
        let err = FeedWeights::new(48.0, -0.1, 0.7).validate().unwrap_err();
        assert!(matches!(
            err,
            WeightsError::InvalidWeight {
                name: "view_count_weight",
                ..
            }
        ));
        assert!(FeedWeights::new(48.0, 0.3, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_zero_weights_are_valid() {
        assert!(FeedWeights::new(1.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_sanitized_clamps_invalid_values() {
        let sanitized = FeedWeights::new(-5.0, -1.0, f64::NAN).sanitized();
        assert_eq!(sanitized.recency_decay_hours, DEFAULT_RECENCY_DECAY_HOURS);
        assert_eq!(sanitized.view_count_weight, 0.0);
        assert_eq!(sanitized.freshness_weight, 0.0);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let weights = FeedWeights::new(12.0, 0.5, 0.5);
        assert_eq!(weights.sanitized(), weights);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_when_unset() {
        clear_env();
        assert_eq!(FeedWeights::from_env().unwrap(), FeedWeights::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        std::env::set_var("FEED_RECENCY_DECAY_HOURS", "24");
        std::env::set_var("FEED_VIEW_COUNT_WEIGHT", "0.5");
        let weights = FeedWeights::from_env().unwrap();
        clear_env();

        assert_eq!(weights.recency_decay_hours, 24.0);
        assert_eq!(weights.view_count_weight, 0.5);
        assert_eq!(weights.freshness_weight, DEFAULT_FRESHNESS_WEIGHT);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        std::env::set_var("FEED_FRESHNESS_WEIGHT", "heavy");
        let result = FeedWeights::from_env();
        clear_env();

        assert!(matches!(result, Err(WeightsError::Parse { .. })));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_decay() {
        clear_env();
        std::env::set_var("FEED_RECENCY_DECAY_HOURS", "0");
        let result = FeedWeights::from_env();
        clear_env();

        assert_eq!(result, Err(WeightsError::InvalidDecay(0.0)));
    }
}

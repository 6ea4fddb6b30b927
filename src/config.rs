use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{ComparisonError, Result};

pub const DEFAULT_F_MIN: f64 = 0.1;
pub const DEFAULT_F_MAX: f64 = 1.0;

pub const ENV_F_MIN: &str = "RELATED_F_MIN";
pub const ENV_F_MAX: &str = "RELATED_F_MAX";

type EnvValue = std::result::Result<String, env::VarError>;

/// Vocabulary pruning thresholds.
///
/// A term is kept iff `f_min < frequency < f_max`, where
/// `frequency = occurrences of the term across all records / number of records`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub f_min: f64,
    pub f_max: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            f_min: DEFAULT_F_MIN,
            f_max: DEFAULT_F_MAX,
        }
    }
}

impl ComparisonConfig {
    pub fn new(f_min: f64, f_max: f64) -> Result<Self> {
        let config = Self { f_min, f_max };
        config.validate()?;
        Ok(config)
    }

    /// Read thresholds from `RELATED_F_MIN` / `RELATED_F_MAX`.
    /// Unset variables keep their default.
    pub fn from_env() -> Result<Self> {
        Self::with_overrides(None, None)
    }

    /// Defaults, then the environment, then the explicit overrides.
    /// Validation runs once on the merged result, so an override can fix an
    /// environment value that would be invalid on its own.
    pub fn with_overrides(f_min: Option<f64>, f_max: Option<f64>) -> Result<Self> {
        Self::merge(|name| env::var(name), f_min, f_max)
    }

    fn merge<L>(lookup: L, f_min: Option<f64>, f_max: Option<f64>) -> Result<Self>
    where
        L: Fn(&str) -> EnvValue,
    {
        let mut config = Self::default();
        if let Some(v) = read_f64(ENV_F_MIN, lookup(ENV_F_MIN))? {
            config.f_min = v;
        }
        if let Some(v) = read_f64(ENV_F_MAX, lookup(ENV_F_MAX))? {
            config.f_max = v;
        }
        config.f_min = f_min.unwrap_or(config.f_min);
        config.f_max = f_max.unwrap_or(config.f_max);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.f_min.is_finite() || !self.f_max.is_finite() {
            return Err(ComparisonError::InvalidConfig(format!(
                "thresholds must be finite (f_min={}, f_max={})",
                self.f_min, self.f_max
            )));
        }
        if !(0.0 < self.f_min && self.f_min < self.f_max && self.f_max <= 1.0) {
            return Err(ComparisonError::InvalidConfig(format!(
                "expected 0 < f_min < f_max <= 1 (f_min={}, f_max={})",
                self.f_min, self.f_max
            )));
        }
        Ok(())
    }

    /// Frequency band test, strict on both sides.
    #[inline]
    pub fn keeps(&self, frequency: f64) -> bool {
        frequency > self.f_min && frequency < self.f_max
    }
}

fn read_f64(name: &str, value: EnvValue) -> Result<Option<f64>> {
    match value {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| ComparisonError::InvalidConfig(format!("{name}={raw:?}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ComparisonError::InvalidConfig(format!("{name}: {e}"))),
    }
}

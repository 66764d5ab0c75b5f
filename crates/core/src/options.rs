use crate::error::{Result, SigscopeError};
use crate::lattice::ConversionPolicy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CONVERSIONS_ENV: &str = "SIGSCOPE_CONVERSIONS";

/// Knobs for one matching run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct MatchOptions {
    /// Which primitive conversions count as compatible.
    pub conversions: ConversionPolicy,
    /// Largest parameter list a permuting query may carry.
    pub max_permuted_params: usize,
    /// Candidate count from which evaluation runs on the rayon pool.
    pub parallel_threshold: usize,
    /// Keep only the best `limit` results.
    pub limit: Option<usize>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            conversions: ConversionPolicy::default(),
            max_permuted_params: 12,
            parallel_threshold: 256,
            limit: None,
        }
    }
}

impl MatchOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_conversions(mut self, conversions: ConversionPolicy) -> Self {
        self.conversions = conversions;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Applies `SIGSCOPE_CONVERSIONS` if it is set.
    pub fn with_env_overrides(self) -> Result<Self> {
        match std::env::var(CONVERSIONS_ENV) {
            Ok(value) => self.with_conversions_str(&value),
            Err(_) => Ok(self),
        }
    }

    fn with_conversions_str(mut self, value: &str) -> Result<Self> {
        self.conversions = value
            .parse()
            .map_err(|e: String| SigscopeError::InvalidOption(format!("{}: {}", CONVERSIONS_ENV, e)))?;
        Ok(self)
    }
}

//! Tunable parameters for region assignment.
//!
//! The defaults reproduce the reference research run exactly: a 0.5 degree
//! base allowance, 111 km per degree, and the four hand-curated West Atlantic
//! corrections.
use crate::overrides::OverrideRules;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Assignment configuration
///
/// Serializable so runs can be described in JSON or TOML next to the data
/// they were made from.
///
/// # Example
///
/// ```rust
/// use reefmatch::Config;
///
/// let config = Config::default();
/// assert_eq!(config.base_radius_deg, 0.5);
///
/// let json = r#"{
///     "base_radius_deg": 0.25,
///     "max_doublings": 12,
///     "overrides": []
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.km_per_degree, 111.0);
/// assert!(config.overrides.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Starting radius multiplier in degrees; also the fixed cell-size
    /// allowance added to every region's area-derived radius.
    #[serde(default = "Config::default_base_radius_deg")]
    pub base_radius_deg: f64,

    /// Kilometers per degree used to turn sqrt(area) into degrees.
    #[serde(default = "Config::default_km_per_degree")]
    pub km_per_degree: f64,

    /// Maximum number of times the radius multiplier may double before the
    /// run is abandoned.
    #[serde(default = "Config::default_max_doublings")]
    pub max_doublings: u32,

    /// Bounding-box corrections applied after convergence.
    #[serde(default = "OverrideRules::reference")]
    pub overrides: OverrideRules,
}

impl Config {
    const MAX_DOUBLINGS_LIMIT: u32 = 64;

    const fn default_base_radius_deg() -> f64 {
        0.5
    }

    const fn default_km_per_degree() -> f64 {
        111.0
    }

    const fn default_max_doublings() -> u32 {
        30
    }

    pub fn with_base_radius(mut self, degrees: f64) -> Self {
        self.base_radius_deg = degrees;
        self
    }

    pub fn with_km_per_degree(mut self, km: f64) -> Self {
        self.km_per_degree = km;
        self
    }

    pub fn with_max_doublings(mut self, doublings: u32) -> Self {
        self.max_doublings = doublings;
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideRules) -> Self {
        self.overrides = overrides;
        self
    }

    /// Drop all override corrections.
    pub fn without_overrides(mut self) -> Self {
        self.overrides = OverrideRules::empty();
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_radius_deg.is_finite() || self.base_radius_deg <= 0.0 {
            return Err(format!(
                "Base radius must be a positive finite number of degrees, got {}",
                self.base_radius_deg
            ));
        }

        if !self.km_per_degree.is_finite() || self.km_per_degree <= 0.0 {
            return Err(format!(
                "Kilometers per degree must be positive and finite, got {}",
                self.km_per_degree
            ));
        }

        if self.max_doublings > Self::MAX_DOUBLINGS_LIMIT {
            return Err(format!(
                "Max doublings must be at most {}, got {}",
                Self::MAX_DOUBLINGS_LIMIT,
                self.max_doublings
            ));
        }

        self.overrides.validate()
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_radius_deg: Self::default_base_radius_deg(),
            km_per_degree: Self::default_km_per_degree(),
            max_doublings: Self::default_max_doublings(),
            overrides: OverrideRules::reference(),
        }
    }
}

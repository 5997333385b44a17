use std::path::PathBuf;

use chrono::NaiveDate;

use salesgen_generate::locales::LocaleKey;
use salesgen_generate::{GenerationConfig, GenerationError, IdentityPolicy, TimestampMode};

/// Values given on the command line; each one replaces the TOML value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub sales: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub seed: Option<u64>,
    pub identity: Option<IdentityPolicy>,
    pub timestamps: Option<TimestampMode>,
    pub reuse_probability: Option<f64>,
    pub no_continuity: bool,
    pub continuity_percent: Option<u32>,
    pub locales: Vec<LocaleKey>,
}

impl ConfigOverrides {
    /// Load the config file (or defaults) and apply the overrides.
    pub fn resolve(&self) -> Result<GenerationConfig, GenerationError> {
        let mut config = match &self.config_path {
            Some(path) => GenerationConfig::from_toml_path(path)?,
            None => GenerationConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut GenerationConfig) {
        if let Some(sales) = self.sales {
            config.sales = sales;
        }
        if let Some(start) = self.start_date {
            config.start_date = start;
        }
        if let Some(end) = self.end_date {
            config.end_date = end;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(identity) = self.identity {
            config.identity = identity;
        }
        if let Some(timestamps) = self.timestamps {
            config.timestamps = timestamps;
        }
        if let Some(probability) = self.reuse_probability {
            config.reuse_probability = probability;
        }
        if self.no_continuity {
            config.continuity.enabled = false;
        }
        if let Some(percent) = self.continuity_percent {
            config.continuity.fractions_percent = vec![percent];
        }
        if !self.locales.is_empty() {
            config.locales = self.locales.clone();
        }
    }
}

pub fn parse_locale(value: &str) -> Result<LocaleKey, String> {
    LocaleKey::parse(value).ok_or_else(|| {
        let known: Vec<&str> = LocaleKey::ALL.iter().map(|locale| locale.as_str()).collect();
        format!("unknown locale '{value}' (expected one of {})", known.join(", "))
    })
}

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use salesgen_core::MONEY_SCALE;

use crate::email::EmailStrategy;
use crate::errors::GenerationError;
use crate::identity::IdentityPolicy;
use crate::locales::LocaleKey;
use crate::timeline::{DateWindow, TimestampMode};

/// Parameters for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Number of sales to generate.
    pub sales: u64,
    /// First day of the sales window (midnight, inclusive).
    pub start_date: NaiveDate,
    /// Last day of the sales window (midnight, inclusive).
    pub end_date: NaiveDate,
    /// Seed for every random stream of the run.
    pub seed: u64,
    /// Probability that a sale reuses an existing customer.
    pub reuse_probability: f64,
    pub quantity: QuantityRange,
    pub identity: IdentityPolicy,
    pub timestamps: TimestampMode,
    pub email: EmailConfig,
    /// Locales drawn from when creating customers.
    pub locales: Vec<LocaleKey>,
    pub continuity: ContinuityConfig,
    /// Rows buffered by file emitters before a write.
    pub batch_size: usize,
    /// Log a progress event every N sales.
    pub progress_every: u64,
    pub taxonomy: Taxonomy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sales: 1000,
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            seed: 42,
            reuse_probability: 0.7,
            quantity: QuantityRange::default(),
            identity: IdentityPolicy::default(),
            timestamps: TimestampMode::default(),
            email: EmailConfig::default(),
            locales: vec![LocaleKey::PtBr],
            continuity: ContinuityConfig::default(),
            batch_size: 1000,
            progress_every: 100,
            taxonomy: Taxonomy::default(),
        }
    }
}

impl GenerationConfig {
    /// Load a TOML config; missing keys take their defaults.
    pub fn from_toml_path(path: &Path) -> Result<Self, GenerationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GenerationError> {
        Ok(toml::from_str(content)?)
    }

    /// Sales window at second granularity.
    pub fn window(&self) -> Result<DateWindow, GenerationError> {
        DateWindow::from_dates(self.start_date, self.end_date)
    }

    /// Reject parameters that would make the run fail midway.
    ///
    /// Called before anything is archived or emitted.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.sales == 0 {
            return Err(GenerationError::Config(
                "sales must be greater than zero".to_string(),
            ));
        }

        let window = self.window()?;
        if self.timestamps == TimestampMode::DistinctSorted {
            window.ensure_distinct_capacity(self.sales)?;
        }

        if !self.reuse_probability.is_finite() || !(0.0..=1.0).contains(&self.reuse_probability) {
            return Err(GenerationError::Config(format!(
                "reuse_probability must be within [0, 1], got {}",
                self.reuse_probability
            )));
        }

        self.quantity.validate()?;
        self.email.validate()?;
        self.continuity.validate()?;

        if self.locales.is_empty() {
            return Err(GenerationError::Config(
                "at least one locale is required".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(GenerationError::Config(
                "batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Hex SHA-256 of the serialized config, recorded in run reports.
    pub fn fingerprint(&self) -> Result<String, GenerationError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Inclusive bounds for sale quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

impl Default for QuantityRange {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl QuantityRange {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.min == 0 {
            return Err(GenerationError::Config(
                "quantity.min must be at least 1".to_string(),
            ));
        }
        if self.min > self.max {
            return Err(GenerationError::Config(format!(
                "quantity.min ({}) must be <= quantity.max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Email synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct EmailConfig {
    pub strategy: EmailStrategy,
    pub domains: Vec<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            strategy: EmailStrategy::default(),
            domains: ["gmail.com", "outlook.com", "yahoo.com.br", "hotmail.com"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl EmailConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.domains.is_empty() {
            return Err(GenerationError::Config(
                "email.domains must not be empty".to_string(),
            ));
        }
        for domain in &self.domains {
            let valid = !domain.is_empty()
                && domain.contains('.')
                && domain
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-');
            if !valid {
                return Err(GenerationError::Config(format!(
                    "invalid email domain '{domain}'"
                )));
            }
        }
        Ok(())
    }
}

/// Carry-over of prior customers into a regenerated dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ContinuityConfig {
    pub enabled: bool,
    /// Candidate sample sizes in percent of the prior customer count; one is
    /// drawn per run.
    pub fractions_percent: Vec<u32>,
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fractions_percent: vec![2, 6, 9],
        }
    }
}

impl ContinuityConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.fractions_percent.is_empty() {
            return Err(GenerationError::Config(
                "continuity.fractions_percent must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .fractions_percent
            .iter()
            .find(|percent| **percent > 100)
        {
            return Err(GenerationError::Config(format!(
                "continuity fraction {bad}% is above 100%"
            )));
        }
        Ok(())
    }
}

/// Category -> product -> unit price, in declaration order.
///
/// Construction validates the taxonomy: at least one product, unique
/// product names, non-negative prices. Prices keep their given precision;
/// only sale totals are rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawTaxonomy", into = "RawTaxonomy")]
pub struct Taxonomy {
    categories: Vec<TaxonomyCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyCategory {
    pub name: String,
    pub products: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyEntry {
    pub name: String,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct RawTaxonomy {
    categories: Vec<TaxonomyCategory>,
}

impl Taxonomy {
    pub fn new(categories: Vec<TaxonomyCategory>) -> Result<Self, GenerationError> {
        let mut names = BTreeSet::new();
        let mut categories_out = Vec::with_capacity(categories.len());

        for category in categories {
            if category.name.trim().is_empty() {
                return Err(GenerationError::Config(
                    "taxonomy category name must not be empty".to_string(),
                ));
            }
            let mut products = Vec::with_capacity(category.products.len());
            for entry in category.products {
                if entry.name.trim().is_empty() {
                    return Err(GenerationError::Config(format!(
                        "empty product name in category '{}'",
                        category.name
                    )));
                }
                if !names.insert(entry.name.clone()) {
                    return Err(GenerationError::Config(format!(
                        "duplicate product name '{}'",
                        entry.name
                    )));
                }
                if entry.unit_price.is_sign_negative() {
                    return Err(GenerationError::Config(format!(
                        "product '{}' has negative price {}",
                        entry.name, entry.unit_price
                    )));
                }
                products.push(entry);
            }
            categories_out.push(TaxonomyCategory {
                name: category.name,
                products,
            });
        }

        if names.is_empty() {
            return Err(GenerationError::Config(
                "taxonomy must contain at least one product".to_string(),
            ));
        }

        Ok(Self {
            categories: categories_out,
        })
    }

    pub fn categories(&self) -> &[TaxonomyCategory] {
        &self.categories
    }

    pub fn product_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.products.len())
            .sum()
    }
}

impl TryFrom<RawTaxonomy> for Taxonomy {
    type Error = GenerationError;

    fn try_from(raw: RawTaxonomy) -> Result<Self, Self::Error> {
        Self::new(raw.categories)
    }
}

impl From<Taxonomy> for RawTaxonomy {
    fn from(taxonomy: Taxonomy) -> Self {
        Self {
            categories: taxonomy.categories,
        }
    }
}

impl Default for Taxonomy {
    /// Consumer electronics catalogue: phones and accessories.
    fn default() -> Self {
        let category = |name: &str, products: &[(&str, i64)]| TaxonomyCategory {
            name: name.to_string(),
            products: products
                .iter()
                .map(|(product, cents)| TaxonomyEntry {
                    name: product.to_string(),
                    unit_price: Decimal::new(*cents, MONEY_SCALE),
                })
                .collect(),
        };

        Self {
            categories: vec![
                category(
                    "Celulares",
                    &[
                        ("iPhone 13", 85000),
                        ("Samsung Galaxy S22", 79900),
                        ("Google Pixel 6", 69900),
                        ("Xiaomi 12", 59900),
                        ("OnePlus 10 Pro", 75000),
                    ],
                ),
                category(
                    "Acessórios",
                    &[
                        ("Carregador USB-C", 2500),
                        ("Capa de Silicone", 1500),
                        ("Fone de Ouvido Bluetooth", 5000),
                        ("Smartwatch", 15000),
                        ("Power Bank 10000mAh", 3000),
                        ("Protetor de tela de vidro", 1000),
                    ],
                ),
            ],
        }
    }
}

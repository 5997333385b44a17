use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Locales available for customer profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LocaleKey {
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "pt_BR")]
    PtBr,
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "de_DE")]
    DeDe,
}

impl LocaleKey {
    pub const ALL: &'static [LocaleKey] = &[Self::EnUs, Self::PtBr, Self::FrFr, Self::DeDe];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en_US" => Some(Self::EnUs),
            "pt_BR" => Some(Self::PtBr),
            "fr_FR" => Some(Self::FrFr),
            "de_DE" => Some(Self::DeDe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::PtBr => "pt_BR",
            Self::FrFr => "fr_FR",
            Self::DeDe => "de_DE",
        }
    }

    /// Country written on customers created under this locale.
    pub fn country(self) -> &'static str {
        match self {
            Self::EnUs => "United States",
            Self::PtBr => "Brasil",
            Self::FrFr => "France",
            Self::DeDe => "Deutschland",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

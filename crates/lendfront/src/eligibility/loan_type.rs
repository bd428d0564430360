use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Annual rate (percent) applied to products missing from the rate card.
pub const FALLBACK_ANNUAL_RATE: f64 = 10.0;

/// Loan products offered on the site. Unknown keys are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LoanType {
    Car,
    TwoWheeler,
    Gold,
    Agriculture,
    #[default]
    Personal,
    Home,
    Industrial,
    Weaver,
    Business,
    Plot,
    Other(String),
}

impl LoanType {
    pub const CATALOG: [LoanType; 10] = [
        LoanType::Car,
        LoanType::TwoWheeler,
        LoanType::Gold,
        LoanType::Agriculture,
        LoanType::Personal,
        LoanType::Home,
        LoanType::Industrial,
        LoanType::Weaver,
        LoanType::Business,
        LoanType::Plot,
    ];

    pub fn key(&self) -> &str {
        match self {
            LoanType::Car => "car",
            LoanType::TwoWheeler => "twowheeler",
            LoanType::Gold => "gold",
            LoanType::Agriculture => "agriculture",
            LoanType::Personal => "personal",
            LoanType::Home => "home",
            LoanType::Industrial => "industrial",
            LoanType::Weaver => "weaver",
            LoanType::Business => "business",
            LoanType::Plot => "plot",
            LoanType::Other(key) => key,
        }
    }

    pub fn from_key(value: &str) -> Self {
        let key = value.trim();
        LoanType::CATALOG
            .iter()
            .find(|candidate| candidate.key() == key)
            .cloned()
            .unwrap_or_else(|| LoanType::Other(key.to_string()))
    }

    /// Annual interest rate in percent.
    pub fn annual_rate(&self) -> f64 {
        match self {
            LoanType::Car => 8.5,
            LoanType::TwoWheeler => 10.5,
            LoanType::Gold => 8.99,
            LoanType::Agriculture => 7.0,
            LoanType::Personal => 10.99,
            LoanType::Home => 7.5,
            LoanType::Industrial => 9.0,
            LoanType::Weaver => 6.0,
            LoanType::Business => 12.99,
            LoanType::Plot => 8.5,
            LoanType::Other(_) => FALLBACK_ANNUAL_RATE,
        }
    }
}

impl FromStr for LoanType {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(LoanType::from_key(value))
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for LoanType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for LoanType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LoanType::from_key(&raw))
    }
}

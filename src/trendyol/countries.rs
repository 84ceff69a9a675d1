//! Storefront countries offered by the Trendyol country selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Countries the country-select prompt can be answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    Ae,
    Sa,
}

impl Country {
    /// Returns the option label shown in the country selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Country::Ae => "United Arab Emirates",
            Country::Sa => "Saudi Arabia",
        }
    }

    /// Returns the two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Country::Ae => "ae",
            Country::Sa => "sa",
        }
    }

    /// Returns all supported countries.
    pub fn all() -> &'static [Country] {
        &[Country::Ae, Country::Sa]
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Country {
    type Err = CountryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ae" | "uae" | "united arab emirates" => Ok(Country::Ae),
            "sa" | "ksa" | "saudi arabia" => Ok(Country::Sa),
            _ => Err(CountryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountryParseError(String);

impl fmt::Display for CountryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown country '{}'. Valid countries: ae, sa", self.0)
    }
}

impl std::error::Error for CountryParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_parsing() {
        assert_eq!(Country::from_str("ae").unwrap(), Country::Ae);
        assert_eq!(Country::from_str("AE").unwrap(), Country::Ae);
        assert_eq!(Country::from_str(" uae ").unwrap(), Country::Ae);
        assert_eq!(Country::from_str("United Arab Emirates").unwrap(), Country::Ae);
        assert_eq!(Country::from_str("sa").unwrap(), Country::Sa);
        assert_eq!(Country::from_str("ksa").unwrap(), Country::Sa);
        assert_eq!(Country::from_str("saudi arabia").unwrap(), Country::Sa);

        assert!(Country::from_str("tr").is_err());
        assert!(Country::from_str("").is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Country::Ae.display_name(), "United Arab Emirates");
        assert_eq!(Country::Sa.display_name(), "Saudi Arabia");
    }

    #[test]
    fn test_country_display() {
        assert_eq!(Country::Ae.to_string(), "ae");
        assert_eq!(Country::Sa.to_string(), "sa");
    }

    #[test]
    fn test_country_all() {
        let all = Country::all();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&Country::Ae));
        assert!(all.contains(&Country::Sa));
    }

    #[test]
    fn test_parse_error_display() {
        let err = Country::from_str("xx").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("xx"));
        assert!(msg.contains("Valid countries"));
    }

    #[test]
    fn test_country_serde() {
        let json = serde_json::to_string(&Country::Sa).unwrap();
        assert_eq!(json, "\"sa\"");

        let parsed: Country = serde_json::from_str("\"ae\"").unwrap();
        assert_eq!(parsed, Country::Ae);
    }
}

//! Normalized product record produced from the embedded page state.

use crate::trendyol::payload::MISSING;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Canonical product record. Every scalar holds a value or [`MISSING`];
/// nothing is ever null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOutput {
    pub product_title: String,
    pub brand: String,
    /// Total rating count, or `"-"`
    pub review: Field,
    /// Average rating rounded to one decimal, `0` when unrated. Integral
    /// averages stay integers.
    pub rating: Number,
    /// Category names from broadest to narrowest, `/`-separated
    pub category_path: String,
    pub variants: Variants,
    /// Listed selling price
    pub msrp: Field,
    /// Discounted price
    pub price: Field,
    pub seller_name: String,
}

impl ProductOutput {
    /// Returns the discount of `price` against `msrp` in percent, when both
    /// are numeric and the price is actually lower.
    pub fn discount_percent(&self) -> Option<u8> {
        let msrp = self.msrp.as_f64()?;
        let price = self.price.as_f64()?;
        if msrp <= 0.0 || price >= msrp {
            return None;
        }
        let discount = ((msrp - price) / msrp * 100.0).round() as u8;
        Some(discount.min(99))
    }

    /// Number of size variants currently in stock.
    pub fn in_stock_count(&self) -> usize {
        self.variants.size.iter().filter(|v| v.in_stock).count()
    }
}

/// Variant groups. Trendyol only exposes the size axis in the product state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variants {
    pub size: Vec<VariantRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub value: Option<String>,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
}

/// A scalar carried over from the payload as-is: numbers stay numbers in the
/// JSON output, anything textual (including the placeholder) is a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(Number),
    Text(String),
}

impl Field {
    /// The `"-"` placeholder.
    pub fn missing() -> Self {
        Field::Text(MISSING.to_string())
    }

    /// Converts a payload scalar. Non-scalar values have no field form.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Field::Number(n.clone())),
            Value::String(s) => Some(Field::Text(s.clone())),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Text(s) if s == MISSING)
    }

    /// Numeric reading of the field; numeric strings such as `"199.99"` count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Number(n) => n.as_f64(),
            Field::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(n) => write!(f, "{}", n),
            Field::Text(s) => write!(f, "{}", s),
        }
    }
}

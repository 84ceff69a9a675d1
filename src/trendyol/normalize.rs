//! Normalization from the raw page state into a [`ProductOutput`].
//!
//! The product record comes in two shapes. When the page was rendered for a
//! foreign storefront it carries an `englishTranslation` sub-record with the
//! translated title, brand and category tree; otherwise only the Turkish base
//! record is available and the flat fields are used instead. Price and seller
//! data live under `merchantListing` in both shapes.
//!
//! Normalization never fails: absence anywhere yields the `"-"` placeholder
//! (or `0` for the rating).

use crate::trendyol::models::{Field, ProductOutput, VariantRecord, Variants};
use crate::trendyol::payload::{
    array_at, is_truthy, lookup, lookup_truthy, scalar_to_string, text_or_missing, MISSING,
};
use serde_json::{Number, Value};
use tracing::debug;

const TRANSLATION: &str = "englishTranslation";

const SELLING_PRICE: [&str; 5] =
    ["merchantListing", "winnerVariant", "price", "sellingPrice", "value"];
const DISCOUNTED_PRICE: [&str; 5] =
    ["merchantListing", "winnerVariant", "price", "discountedPrice", "value"];

/// Maps the decoded page state onto the canonical output record.
pub fn normalize(payload: &Value) -> ProductOutput {
    let empty = Value::Null;
    let product = lookup(payload, &["product"]).unwrap_or(&empty);

    let (product_title, brand, category_path) = match lookup_truthy(product, &[TRANSLATION]) {
        Some(translation) => {
            debug!("Using localized product record");
            (
                text_or_missing(translation, &["productName"]),
                text_or_missing(translation, &["brandName"]),
                translated_category_path(translation),
            )
        }
        None => {
            debug!("No localized record, using base product fields");
            (
                text_or_missing(product, &["name"]),
                text_or_missing(product, &["brand", "name"]),
                text_or_missing(product, &["category", "hierarchy"]),
            )
        }
    };

    ProductOutput {
        product_title,
        brand,
        review: field_or_missing(product, &["ratingScore", "totalCount"]),
        rating: rating(product),
        category_path,
        variants: Variants { size: variants(product) },
        msrp: field_or_missing(product, &SELLING_PRICE),
        price: field_or_missing(product, &DISCOUNTED_PRICE),
        seller_name: text_or_missing(product, &["merchantListing", "merchant", "name"]),
    }
}

/// Joins the translated category names from broadest to narrowest. The page
/// lists them narrowest first.
fn translated_category_path(translation: &Value) -> String {
    let names: Vec<String> = array_at(translation, &["webBrandCategoryGenders", "categories"])
        .iter()
        .rev()
        .filter_map(|category| lookup_truthy(category, &["name"]))
        .filter_map(scalar_to_string)
        .collect();

    if names.is_empty() {
        MISSING.to_string()
    } else {
        names.join("/")
    }
}

fn variants(product: &Value) -> Vec<VariantRecord> {
    array_at(product, &["variants"])
        .iter()
        .map(|variant| VariantRecord {
            value: lookup(variant, &["value"]).and_then(scalar_to_string),
            in_stock: lookup(variant, &["inStock"]).and_then(Value::as_bool).unwrap_or(false),
        })
        .collect()
}

/// Integral averages are kept as integers; fractional ones are rounded.
fn rating(product: &Value) -> Number {
    match lookup(product, &["ratingScore", "averageRating"]) {
        Some(Value::Number(n)) if n.is_f64() => n
            .as_f64()
            .map(round_one_decimal)
            .and_then(Number::from_f64)
            .unwrap_or_else(|| n.clone()),
        Some(Value::Number(n)) => n.clone(),
        _ => Number::from(0),
    }
}

/// Rounds the exact binary value to one decimal place. Only exact ties go to
/// even (`4.25` -> `4.2`); `4.35` is stored just below the midpoint and
/// becomes `4.3`.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// A zero count is indistinguishable from a missing one and also yields the
/// placeholder.
fn field_or_missing(value: &Value, path: &[&str]) -> Field {
    lookup(value, path)
        .filter(|v| is_truthy(v))
        .and_then(Field::from_value)
        .unwrap_or_else(Field::missing)
}

//! Output formatting for product records (JSON, table, markdown).

use crate::config::OutputFormat;
use crate::trendyol::models::{ProductOutput, VariantRecord};
use crate::trendyol::payload::MISSING;

/// Formats product records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single product.
    pub fn format_product(&self, product: &ProductOutput) -> String {
        match self.format {
            OutputFormat::Json => self.json_single(product),
            OutputFormat::Table => self.table_single(product),
            OutputFormat::Markdown => self.markdown_single(product),
        }
    }

    // JSON formatting

    fn json_single(&self, product: &ProductOutput) -> String {
        serde_json::to_string_pretty(product).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_single(&self, product: &ProductOutput) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Title:    {}", product.product_title));
        lines.push(format!("Brand:    {}", product.brand));
        lines.push(format!("Category: {}", product.category_path));
        lines.push(format!("Seller:   {}", product.seller_name));
        lines.push(format!("Price:    {}", price_line(product)));
        lines.push(format!("Rating:   {}", rating_line(product)));

        if product.variants.size.is_empty() {
            lines.push("Sizes:    N/A".to_string());
        } else {
            lines.push(format!(
                "Sizes:    {} ({}/{} in stock)",
                product.variants.size.iter().map(variant_label).collect::<Vec<_>>().join(" "),
                product.in_stock_count(),
                product.variants.size.len()
            ));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, product: &ProductOutput) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", product.product_title));
        lines.push(String::new());

        lines.push(format!("- **Brand:** {}", product.brand));
        lines.push(format!("- **Category:** {}", product.category_path));
        lines.push(format!("- **Seller:** {}", product.seller_name));

        if let Some(discount) = product.discount_percent() {
            lines.push(format!("- **Price:** {} ~~{}~~ (-{}%)", product.price, product.msrp, discount));
        } else {
            lines.push(format!("- **Price:** {}", product.price));
        }

        lines.push(format!("- **Rating:** {}", rating_line(product)));

        if !product.variants.size.is_empty() {
            lines.push(String::new());
            lines.push("| Size | In stock |".to_string());
            lines.push("|------|----------|".to_string());
            for variant in &product.variants.size {
                lines.push(format!(
                    "| {} | {} |",
                    variant.value.as_deref().unwrap_or(MISSING),
                    if variant.in_stock { "Yes" } else { "No" }
                ));
            }
        }

        lines.join("\n")
    }
}

fn price_line(product: &ProductOutput) -> String {
    match product.discount_percent() {
        Some(discount) => format!("{} (was {}, -{}%)", product.price, product.msrp, discount),
        None if product.price.is_missing() => product.msrp.to_string(),
        None => product.price.to_string(),
    }
}

fn rating_line(product: &ProductOutput) -> String {
    let rating = product.rating.as_f64().unwrap_or(0.0);
    if product.review.is_missing() {
        format!("{:.1}/5", rating)
    } else {
        format!("{:.1}/5 ({} reviews)", rating, product.review)
    }
}

/// Size value, parenthesized when sold out.
fn variant_label(variant: &VariantRecord) -> String {
    let value = variant.value.as_deref().unwrap_or(MISSING);
    if variant.in_stock {
        value.to_string()
    } else {
        format!("({})", value)
    }
}

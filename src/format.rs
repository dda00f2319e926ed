//! Answer formatting helpers shared by many rules.

use crate::table::Order;

pub(crate) const MISSING: &str = "N/A";

/// Parse a money-ish string into a number. Currency punctuation (`$`, `,`)
/// is stripped before parsing.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '$' && *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Format an amount as `$1,234.56`.
///
/// A missing amount renders as the zero display form (`$0.00`); this is the
/// one place where "missing" and "zero" are deliberately conflated.
pub fn format_currency(amount: Option<f64>) -> String {
    let value = amount.filter(|v| v.is_finite()).unwrap_or(0.0);
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = group_thousands(cents / 100);
    let rem = cents % 100;
    if negative {
        format!("-${dollars}.{rem:02}")
    } else {
        format!("${dollars}.{rem:02}")
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Recover display casing from a canonical lower-cased name. Letters after
/// any non-letter are capitalized ("o'brien & co" -> "O'Brien & Co").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

pub(crate) fn or_na(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or(MISSING)
}

pub(crate) fn quantity_display(quantity: Option<f64>) -> String {
    match quantity {
        Some(q) if q.fract() == 0.0 => format!("{}", q as i64),
        Some(q) => format!("{q}"),
        None => MISSING.to_string(),
    }
}

/// Render one order as the multi-line detail block, substituting `N/A` for
/// missing fields.
pub(crate) fn format_order(order: &Order) -> String {
    let supplier = match order.supplier_name.as_deref() {
        Some(name) => title_case(name),
        None => MISSING.to_string(),
    };
    [
        "📄 **Order Details**".to_string(),
        format!("- Requisition #: {}", or_na(&order.requisition_number)),
        format!("- PO #: {}", or_na(&order.purchase_order_number)),
        format!("- Supplier: {supplier}"),
        format!("- Item: {}", or_na(&order.item_name)),
        format!("- Description: {}", or_na(&order.item_description)),
        format!("- Quantity: {}", quantity_display(order.quantity)),
        format!("- Unit Price: {}", format_currency(order.unit_price)),
        format!("- Total Price: {}", format_currency(order.total_price)),
        format!("- Date: {}", order.purchase_date.format("%m/%d/%Y")),
        format!("- Department: {}", or_na(&order.department_name)),
        format!("- Location: {}", or_na(&order.location)),
    ]
    .join("\n")
}

/// Truncation footer for capped listings.
pub(crate) fn showing(shown: usize, total: usize, noun: &str) -> String {
    format!("\n\n(Showing {shown} of {total} total {noun})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_currency_punctuation() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("  42 "), Some(42.0));
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn formats_currency_with_grouping() {
        assert_eq!(format_currency(Some(0.0)), "$0.00");
        assert_eq!(format_currency(Some(1234.5)), "$1,234.50");
        assert_eq!(format_currency(Some(1_000_000.0)), "$1,000,000.00");
        assert_eq!(format_currency(Some(-42.0)), "-$42.00");
        assert_eq!(format_currency(None), "$0.00");
    }

    #[test]
    fn currency_formatting_is_idempotent_through_parse() {
        for value in [0.0, 0.01, 999.99, 1234.56, 7_654_321.09] {
            let formatted = format_currency(Some(value));
            let reparsed = parse_amount(&formatted).unwrap();
            assert_eq!(format_currency(Some(reparsed)), formatted);
        }
    }

    #[test]
    fn title_cases_like_display_names() {
        assert_eq!(title_case("pitney bowes"), "Pitney Bowes");
        assert_eq!(title_case("o'brien & co"), "O'Brien & Co");
        assert_eq!(title_case("IBM CORP"), "Ibm Corp");
    }

    #[test]
    fn order_block_substitutes_placeholders() {
        let order = Order::new(NaiveDate::from_ymd_opt(2014, 7, 15).unwrap());
        let block = format_order(&order);
        assert!(block.starts_with("📄 **Order Details**"));
        assert!(block.contains("- Requisition #: N/A"));
        assert!(block.contains("- Unit Price: $0.00"));
        assert!(block.contains("- Date: 07/15/2014"));
    }
}

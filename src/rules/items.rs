//! Item-centric rules: spend and quantity lookups, frequency rankings,
//! classification and segment queries.

use crate::engine::BucketMask;
use crate::format::{MISSING, format_currency, or_na, title_case};
use crate::rules::helpers::strip_plural;
use crate::table::{Order, field_contains};
use crate::{MatchCtx, Rule};

pub(crate) fn rule_frequent_items_fiscal() -> Rule {
    rule! {
        name: "most frequent items in a fiscal year",
        patterns: [regex!(r"fiscal year (\d{4})")],
        required_phrases: ["most frequently purchased items", "fiscal year"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year = ctx.group(1)?;
            let counts = ctx
                .table
                .value_counts(|o| field_contains(&o.fiscal_year, year), |o| o.item_name.as_deref());
            if counts.is_empty() {
                return Some(format!("⚠️ No purchase data found for FY{year}"));
            }
            let lines: Vec<String> =
                counts.iter().take(10).map(|(item, n)| format!("- {item} ({n})")).collect();
            Some(format!(
                "🛒 Most frequently purchased items in FY{year}:\n{}",
                lines.join("\n"),
            ))
        },
    }
}

/// UNSPSC code of the first item whose name mentions the query
pub(crate) fn rule_unspsc_lookup() -> Rule {
    rule! {
        name: "normalized UNSPSC lookup",
        patterns: [regex!(r"for (.+?)\??$")],
        required_phrases: ["normalized unspsc for"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let query = ctx.group(1)?.trim();
            let display = query.to_uppercase();
            match ctx.table.rows().iter().find(|o| field_contains(&o.item_name, query)) {
                Some(order) => Some(format!(
                    "🏷️ Normalized UNSPSC for {display}: {}",
                    or_na(&order.normalized_unspsc),
                )),
                None => Some(format!("⚠️ No UNSPSC code found for {display}")),
            }
        },
    }
}

pub(crate) fn rule_item_classification() -> Rule {
    rule! {
        name: "segment and family classification",
        patterns: [regex!(r"the (.+?)\??$")],
        required_phrases: ["segment and family classification"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let query = ctx.group(1)?.trim();
            let display = query.to_uppercase();
            match ctx.table.rows().iter().find(|o| field_contains(&o.item_name, query)) {
                Some(order) => Some(format!(
                    "🏷️ Classification for {display}:\n- Segment: {}\n- Family: {}",
                    or_na(&order.segment_title),
                    or_na(&order.family_title),
                )),
                None => Some(format!("⚠️ No classification found for item {display}")),
            }
        },
    }
}

/// quantity bought in a year for a classification or UNSPSC code
pub(crate) fn rule_item_code_quantity() -> Rule {
    rule! {
        name: "item-code quantity in a year",
        patterns: [regex!(r"items of (\w+) (?:bought|purchased) in (\d{4})")],
        required_phrases: ["how many items of", "bought in"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let code = ctx.group(1)?;
            let year: i32 = ctx.group(2)?.parse().ok()?;
            let quantity = ctx.table.sum_quantity_where(|o| {
                (field_contains(&o.classification_codes, code)
                    || field_contains(&o.normalized_unspsc, code))
                    && o.year == year
            });
            Some(format!(
                "📦 Total quantity of items with code {code} in {year}: {}",
                quantity as i64,
            ))
        },
    }
}

/// quantity of an item (by name or description) bought in a year
pub(crate) fn rule_item_quantity_in_year() -> Rule {
    rule! {
        name: "item quantity in a year",
        patterns: [
            regex!(r"(?:total|how many) quantity of (.+?) (?:purchased|bought|ordered) (?:in|during) (\d{4})"),
            regex!(r"(?:total|how many) (.+?) (?:were|was) (?:purchased|bought|ordered) (?:in|during) (\d{4})"),
        ],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let item = ctx.group(1)?.trim();
            let year: i32 = ctx.group(2)?.parse().ok()?;
            let quantity = ctx.table.sum_quantity_where(|o| {
                (field_contains(&o.item_name, item) || field_contains(&o.item_description, item))
                    && o.year == year
            });
            Some(format!(
                "📦 Total quantity of {item} purchased in {year}: **{}**",
                quantity as i64,
            ))
        },
    }
}

/// item spend in a year, "purchased/bought" phrasing, with an example item
pub(crate) fn rule_item_spend_with_example() -> Rule {
    rule! {
        name: "item spend in a year (with example item)",
        patterns: [regex!(r"total (?:price|spend|spending|amount) (?:of|for) ([\w\s\-]+) (?:purchased|bought)? (?:in|for|during) (\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let item = ctx.group(1)?.trim();
            let year: i32 = ctx.group(2)?.parse().ok()?;
            let matching = |o: &Order| field_contains(&o.item_name, item) && o.year == year;
            if ctx.table.count_where(matching) == 0 {
                return Some(format!("⚠️ No spending found for '{item}' in {year}"));
            }
            let total = ctx.table.sum_total_where(matching);
            let example = ctx.table.mode(matching, |o| o.item_name.as_deref())?;
            Some(format!(
                "💸 Total spending on {item} in {year}: **{}**\n(Example item: {example})",
                format_currency(Some(total)),
            ))
        },
    }
}

/// item spend in a year, plain phrasing; the display name is the most common
/// stored item name among the matches
pub(crate) fn rule_item_spend_in_year() -> Rule {
    rule! {
        name: "item spend in a year",
        patterns: [
            regex!(r"total (?:price|spend|spending|amount) (?:of|for|on) ([\w\s\-]+) (?:in|for|during) (\d{4})"),
            regex!(r"how much (?:was|did) (?:we|they) spend on ([\w\s\-]+) (?:in|for|during) (\d{4})"),
        ],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let item = ctx.group(1)?.trim();
            let year: i32 = ctx.group(2)?.parse().ok()?;
            let matching = |o: &Order| field_contains(&o.item_name, item) && o.year == year;
            if ctx.table.count_where(matching) == 0 {
                return Some(format!("⚠️ No spending found for '{item}' in {year}"));
            }
            let actual = ctx.table.mode(matching, |o| o.item_name.as_deref())?;
            let total = ctx.table.sum_total_where(matching);
            Some(format!(
                "💸 Total spending on {actual} in {year}: **{}**",
                format_currency(Some(total)),
            ))
        },
    }
}

pub(crate) fn rule_most_expensive_item() -> Rule {
    rule! {
        name: "most expensive item",
        patterns: [],
        required_phrases: ["most expensive"],
        optional_phrases: ["item", "purchase"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let order = ctx.table.max_total_row(|_| true)?;
            let supplier = match order.supplier_name.as_deref() {
                Some(name) => title_case(name),
                None => MISSING.to_string(),
            };
            Some(format!(
                "💎 Most expensive item purchased: **{}**\n- Price: **{}**\n- Supplier: {supplier}\n- Date: {}",
                or_na(&order.item_name),
                format_currency(order.total_price),
                order.purchase_date.format("%m/%d/%Y"),
            ))
        },
    }
}

pub(crate) fn rule_most_frequent_items() -> Rule {
    rule! {
        name: "top 5 frequent items",
        patterns: [],
        required_phrases: ["most frequent", "item"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let counts = ctx.table.value_counts(|_| true, |o| o.item_name.as_deref());
            let lines: Vec<String> =
                counts.iter().take(5).map(|(item, n)| format!("- {item} ({n})")).collect();
            Some(format!("🛒 Top 5 most frequently purchased items:\n\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_most_common_class() -> Rule {
    rule! {
        name: "most common class",
        patterns: [],
        required_phrases: ["most common class"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let (class, count) =
                ctx.table.value_counts(|_| true, |o| o.class_title.as_deref()).into_iter().next()?;
            Some(format!("📚 Most common class: **{class}** ({count} orders)"))
        },
    }
}

pub(crate) fn rule_top_segments() -> Rule {
    rule! {
        name: "top segments",
        patterns: [],
        optional_phrases: ["top categories", "top segments"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let counts = ctx.table.value_counts(|_| true, |o| o.segment_title.as_deref());
            let lines: Vec<String> =
                counts.iter().take(5).map(|(segment, n)| format!("- {segment} ({n})")).collect();
            Some(format!("📦 Top 5 segments:\n\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_items_bought_most() -> Rule {
    rule! {
        name: "items bought the most",
        patterns: [regex!(r"(?:what|which) (?:items|item) (?:were|was)? ?(?:bought|purchased|ordered)? ?(?:the )?most")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let counts = ctx.table.value_counts(|_| true, |o| o.item_name.as_deref());
            let lines: Vec<String> =
                counts.iter().take(5).map(|(item, n)| format!("- {item} ({n})")).collect();
            Some(format!("🛒 Top 5 most frequently bought items:\n\n{}", lines.join("\n")))
        },
    }
}

/// "how much did we spend on X" with a light plural cleanup on the query
pub(crate) fn rule_item_spend_lookup() -> Rule {
    rule! {
        name: "item spend lookup",
        patterns: [regex!(r"how much (?:did we|was)? ?(?:spend|spent) on ([\w\s&\-\.]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let query = strip_plural(ctx.group(1)?);
            let matching = |o: &Order| field_contains(&o.item_name, &query);
            if ctx.table.count_where(matching) == 0 {
                return Some(format!("⚠️ No spending found for item '{query}'"));
            }
            let actual = ctx.table.mode(matching, |o| o.item_name.as_deref())?;
            let total = ctx.table.sum_total_where(matching);
            Some(format!("💸 Total spending on {actual}: **{}**", format_currency(Some(total))))
        },
    }
}

pub(crate) fn rule_segment_orders() -> Rule {
    rule! {
        name: "orders in a segment",
        patterns: [regex!(r"orders in (?:the )?([\w\s&\-\.]+) segment")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let segment = ctx.group(1)?.trim();
            let count = ctx.table.count_where(|o| field_contains(&o.segment_title, segment));
            Some(format!("📦 Orders in the '{segment}' segment: **{count}**"))
        },
    }
}

/// the catch-all "items" ranking; deliberately last in the rule order
pub(crate) fn rule_top_items() -> Rule {
    rule! {
        name: "top N bought items",
        patterns: [regex!(r"(?:top|show|list|give me|tell me|what are|which are)? ?(\d+)? ?(?:most|top)? ?(?:bought|purchased|ordered)? ?items")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let n: usize = ctx.group(1).and_then(|s| s.parse().ok()).unwrap_or(10);
            let counts = ctx.table.value_counts(|_| true, |o| o.item_name.as_deref());
            let lines: Vec<String> =
                counts.iter().take(n).map(|(item, c)| format!("- {item} ({c})")).collect();
            Some(format!("🛒 Top {n} most bought items:\n\n{}", lines.join("\n")))
        },
    }
}

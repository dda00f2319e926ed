//! Procurement-process rules: acquisition methods and types, CalCard
//! spending, department and fiscal-year aggregates.

use std::collections::HashSet;

use crate::engine::BucketMask;
use crate::format::{format_currency, or_na, title_case};
use crate::rules::helpers::{after_phrase, year_after_in};
use crate::table::{Order, field_contains, max_by_sum};
use crate::{MatchCtx, Rule};

/// "how many purchases used the X acquisition method [in YEAR]"
pub(crate) fn rule_acquisition_method_purchases() -> Rule {
    rule! {
        name: "acquisition method purchase count",
        patterns: [regex!(r"the (.+?) acquisition method")],
        required_phrases: ["purchases used the", "acquisition method"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let method = ctx.group(1)?.trim();
            match year_after_in(ctx.question) {
                Some(year) => {
                    let count = ctx.table.count_where(|o| {
                        field_contains(&o.acquisition_method, method) && o.year == year
                    });
                    Some(format!("📦 Number of {method} purchases in {year}: {count}"))
                }
                None => {
                    let count =
                        ctx.table.count_where(|o| field_contains(&o.acquisition_method, method));
                    Some(format!("📦 Total {method} purchases: {count}"))
                }
            }
        },
    }
}

pub(crate) fn rule_top_acquisition_type() -> Rule {
    rule! {
        name: "highest-spend acquisition type",
        patterns: [],
        required_phrases: ["acquisition type had the highest spend"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year = year_after_in(ctx.question);
            let pred = |o: &Order| year.map_or(true, |y| o.year == y);
            if ctx.table.count_where(pred) == 0 {
                return Some("⚠️ No data found for specified year".to_string());
            }
            let groups = ctx.table.group_sum_total(pred, |o| o.acquisition_type.as_deref());
            let (acquisition_type, amount) = max_by_sum(groups)?;
            let period = year.map(|y| format!("in {y}")).unwrap_or_default();
            Some(format!(
                "📊 Highest spending acquisition type {period}:\n- {acquisition_type}: {}",
                format_currency(Some(amount)),
            ))
        },
    }
}

pub(crate) fn rule_sub_acquisition_transactions() -> Rule {
    rule! {
        name: "sub-acquisition method transactions",
        patterns: [regex!(r"method (.+?)\??$")],
        required_phrases: ["transactions with sub-acquisition method"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let method = ctx.group(1)?.trim();
            let rows: Vec<&Order> = ctx
                .table
                .rows()
                .iter()
                .filter(|o| field_contains(&o.sub_acquisition_method, method))
                .collect();
            if rows.is_empty() {
                return Some(format!(
                    "⚠️ No transactions found with sub-acquisition method '{method}'"
                ));
            }
            let lines: Vec<String> = rows
                .iter()
                .take(10)
                .map(|o| format!("- {} ({})", or_na(&o.item_name), format_currency(o.total_price)))
                .collect();
            Some(format!(
                "📝 Transactions with sub-acquisition method '{method}':\n{}",
                lines.join("\n"),
            ))
        },
    }
}

pub(crate) fn rule_department_fiscal_spend() -> Rule {
    rule! {
        name: "department spend in a fiscal year",
        patterns: [regex!(r"department (.+?) in fiscal year (\d{4})")],
        required_phrases: ["total spend for the department", "fiscal year"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let department = ctx.group(1)?.trim();
            let year = ctx.group(2)?;
            let total = ctx.table.sum_total_where(|o| {
                field_contains(&o.department_name, department)
                    && field_contains(&o.fiscal_year, year)
            });
            Some(format!(
                "🏛️ Total spend for {} in FY{year}: {}",
                title_case(department),
                format_currency(Some(total)),
            ))
        },
    }
}

/// distinct items bought under an acquisition type, capped at 100
pub(crate) fn rule_acquisition_type_items() -> Rule {
    rule! {
        name: "items under an acquisition type",
        patterns: [],
        required_phrases: ["list all items purchased under the acquisition type"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let acquisition_type = after_phrase(ctx.question, "acquisition type")?;
            let mut seen: HashSet<(String, String)> = HashSet::new();
            let mut lines: Vec<String> = Vec::new();
            for order in ctx
                .table
                .rows()
                .iter()
                .filter(|o| field_contains(&o.acquisition_type, acquisition_type))
            {
                let name = or_na(&order.item_name).to_string();
                let description = or_na(&order.item_description).to_string();
                if seen.insert((name.clone(), description.clone())) {
                    lines.push(format!("- {name} ({description})"));
                }
            }
            if lines.is_empty() {
                return Some(format!("⚠️ No items found under acquisition type {acquisition_type}"));
            }
            lines.truncate(100);
            Some(format!("📋 Items purchased under {acquisition_type}:\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_acquisition_method_count() -> Rule {
    rule! {
        name: "purchase count by acquisition method",
        patterns: [],
        required_phrases: ["how many purchases were made using the acquisition method"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let method = after_phrase(ctx.question, "acquisition method")?;
            let count = ctx.table.count_where(|o| field_contains(&o.acquisition_method, method));
            Some(format!("📦 Number of purchases using {method}: **{count}**"))
        },
    }
}

pub(crate) fn rule_calcard_fiscal_spend() -> Rule {
    rule! {
        name: "CalCard spend in a fiscal year",
        patterns: [regex!(r"fiscal year (\d{4})")],
        required_phrases: ["calcard", "fiscal year"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year = ctx.group(1)?;
            let total = ctx
                .table
                .sum_total_where(|o| o.calcard.is_yes() && field_contains(&o.fiscal_year, year));
            Some(format!(
                "💳 Total CalCard spending in FY{year}: **{}**",
                format_currency(Some(total)),
            ))
        },
    }
}

pub(crate) fn rule_acquisition_methods_in_year() -> Rule {
    rule! {
        name: "acquisition methods used in a year",
        patterns: [regex!(r"(\d{4})")],
        required_phrases: ["acquisition methods"],
        optional_phrases: ["used", "for purchases"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year: i32 = ctx.group(1)?.parse().ok()?;
            let counts = ctx
                .table
                .value_counts(|o| o.year == year, |o| o.acquisition_method.as_deref());
            if counts.is_empty() {
                return Some(format!("⚠️ No acquisition method data found for {year}"));
            }
            let lines: Vec<String> =
                counts.iter().map(|(method, n)| format!("- {method}: {n}")).collect();
            Some(format!("📝 Acquisition methods used in {year}:\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_calcard_year_spend() -> Rule {
    rule! {
        name: "CalCard spend in a year",
        patterns: [
            regex!(r"(?:total|how much) (?:calcard|cal card) (?:spend|spending|amount) (?:in|for|during) (\d{4})"),
            regex!(r"(?:what was|what's) (?:the)? ?(?:calcard|cal card) (?:spend|spending|amount) (?:in|for|during) (\d{4})"),
        ],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year: i32 = ctx.group(1)?.parse().ok()?;
            let total = ctx.table.sum_total_where(|o| o.calcard.is_yes() && o.year == year);
            Some(format!(
                "💳 Total CalCard spending in {year}: **{}**",
                format_currency(Some(total)),
            ))
        },
    }
}

/// orders whose acquisition method OR type mentions a keyword; a row
/// matching both tallies twice
pub(crate) fn rule_acquisition_keyword_orders() -> Rule {
    rule! {
        name: "orders by acquisition keyword",
        patterns: [regex!(r"orders (?:using|used|with) ([\w\s/\-]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let keyword = ctx.group(1)?.trim();
            let cleaned =
                regex!(r"method|type|acquisition").replace_all(keyword, "").trim().to_string();
            let method_count =
                ctx.table.count_where(|o| field_contains(&o.acquisition_method, &cleaned));
            let type_count =
                ctx.table.count_where(|o| field_contains(&o.acquisition_type, &cleaned));
            let total = method_count + type_count;
            if total == 0 {
                return Some(format!("⚠️ No orders found using '{keyword}'"));
            }
            Some(format!("⚙️ Total orders using **{keyword}**: **{total}**"))
        },
    }
}

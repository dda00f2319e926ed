//! Supplier-centric rules: top-N by spend, per-supplier counts and totals,
//! qualifications, ZIP listings, LPA agreements.

use crate::engine::BucketMask;
use crate::format::{MISSING, format_currency, or_na, showing, title_case};
use crate::rules::helpers::{after_phrase, year_after_in, years_in};
use crate::table::{Order, field_contains, field_eq, max_by_sum, top_by_sum};
use crate::{MatchCtx, Rule};

/// "top N suppliers by total spend [in YEAR]" - listed well before the
/// generic year-count rules that would otherwise shadow it
pub(crate) fn rule_top_suppliers() -> Rule {
    rule! {
        name: "top N suppliers by total spend",
        patterns: [],
        required_phrases: ["top", "suppliers", "total spend"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let n: usize = regex!(r"top (\d+)")
                .captures(ctx.question)
                .and_then(|caps| caps.get(1)?.as_str().parse().ok())
                .unwrap_or(3);
            let (period, groups) = match year_after_in(ctx.question) {
                Some(year) => (
                    format!("in {year}"),
                    ctx.table.group_sum_total(|o| o.year == year, |o| o.supplier_name.as_deref()),
                ),
                None => (
                    "overall".to_string(),
                    ctx.table.group_sum_total(|_| true, |o| o.supplier_name.as_deref()),
                ),
            };
            let top = top_by_sum(groups, n);
            if top.is_empty() {
                return Some(format!("⚠️ No supplier data found {period}"));
            }
            let lines: Vec<String> = top
                .iter()
                .enumerate()
                .map(|(i, (supplier, amount))| {
                    format!("{}. {}: {}", i + 1, title_case(supplier), format_currency(Some(*amount)))
                })
                .collect();
            Some(format!("🏆 Top {n} suppliers {period}:\n{}", lines.join("\n")))
        },
    }
}

/// spend and purchase count for an exact supplier code
pub(crate) fn rule_supplier_code_spend() -> Rule {
    rule! {
        name: "supplier code spend and count",
        patterns: [regex!(r"supplier code (\d+)")],
        required_phrases: ["supplier code"],
        optional_phrases: ["total price", "total spend"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let code = ctx.group(1)?;
            let matching = |o: &Order| field_eq(&o.supplier_code, code);
            let count = ctx.table.count_where(matching);
            if count == 0 {
                return Some(format!("⚠️ No purchases found for supplier code {code}"));
            }
            let total = ctx.table.sum_total_where(matching);
            let supplier = ctx
                .table
                .rows()
                .iter()
                .filter(|o| matching(o))
                .find_map(|o| o.supplier_name.as_deref())
                .unwrap_or(MISSING);
            Some(format!(
                "🏢 Total spend for supplier code {code} ({supplier}): {}\n- Number of purchases: {count}",
                format_currency(Some(total)),
            ))
        },
    }
}

pub(crate) fn rule_supplier_qualification_purchases() -> Rule {
    rule! {
        name: "purchases by supplier qualification",
        patterns: [],
        required_phrases: ["purchases from suppliers with the qualification"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let quals = after_phrase(ctx.question, "qualification")?;
            let display = quals.to_uppercase();
            let rows: Vec<&Order> = ctx
                .table
                .rows()
                .iter()
                .filter(|o| field_contains(&o.supplier_qualifications, quals))
                .collect();
            if rows.is_empty() {
                return Some(format!(
                    "⚠️ No purchases found from suppliers with {display} qualification"
                ));
            }
            let lines: Vec<String> = rows
                .iter()
                .take(100)
                .map(|o| {
                    let supplier = match o.supplier_name.as_deref() {
                        Some(name) => title_case(name),
                        None => MISSING.to_string(),
                    };
                    format!("- {supplier} ({})", or_na(&o.item_name))
                })
                .collect();
            Some(format!(
                "🏢 Purchases from suppliers with {display} qualification:\n{}",
                lines.join("\n"),
            ))
        },
    }
}

pub(crate) fn rule_supplier_fiscal_spend() -> Rule {
    rule! {
        name: "supplier spend in a fiscal year",
        patterns: [regex!(r"total spend by (.+?) in (?:the )?fiscal year (\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let year = ctx.group(2)?;
            let matching = |o: &Order| {
                field_contains(&o.supplier_name, supplier) && field_contains(&o.fiscal_year, year)
            };
            if ctx.table.count_where(matching) == 0 {
                return Some(format!(
                    "⚠️ No spending found for {} in FY{year}",
                    title_case(supplier),
                ));
            }
            let total = ctx.table.sum_total_where(matching);
            Some(format!(
                "💸 Total spend by {} in FY{year}: **{}**",
                title_case(supplier),
                format_currency(Some(total)),
            ))
        },
    }
}

/// purchase count for a supplier under one LPA agreement number
pub(crate) fn rule_supplier_lpa_count() -> Rule {
    rule! {
        name: "items from a supplier under an LPA number",
        patterns: [regex!(r"how many items? (?:were|was) purchased from (.+?) using lpa number ([a-z0-9\-]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let lpa = ctx.group(2)?;
            let count = ctx.table.count_where(|o| {
                field_contains(&o.supplier_name, supplier) && field_eq(&o.lpa_number, lpa)
            });
            Some(format!(
                "📦 Items purchased from {} under LPA {lpa}: **{count}**",
                title_case(supplier),
            ))
        },
    }
}

/// per-year order counts for one supplier ("in 2013 and 2014")
pub(crate) fn rule_supplier_orders_across_years() -> Rule {
    rule! {
        name: "supplier order counts across years",
        patterns: [regex!(r"total orders from (.+?) (?:in|during) (.+)")],
        required_phrases: ["total orders from", "and"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let years = years_in(ctx.group(2)?);
            if years.is_empty() {
                return Some("⚠️ Please specify valid year(s)".to_string());
            }
            let lines: Vec<String> = years
                .iter()
                .map(|&year| {
                    let count = ctx.table.count_where(|o| {
                        field_contains(&o.supplier_name, supplier) && o.year == year
                    });
                    format!("- {year}: {count} orders")
                })
                .collect();
            Some(format!("📦 Orders from {}:\n{}", title_case(supplier), lines.join("\n")))
        },
    }
}

pub(crate) fn rule_supplier_orders_in_year() -> Rule {
    rule! {
        name: "supplier order count in a year",
        patterns: [regex!(r"(?:total|how many) orders? (?:from|of|for) (.+?) (?:in|during) (\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let year: i32 = ctx.group(2)?.parse().ok()?;
            let count = ctx
                .table
                .count_where(|o| field_contains(&o.supplier_name, supplier) && o.year == year);
            Some(format!("📦 Orders from {} in {year}: **{count}**", title_case(supplier)))
        },
    }
}

pub(crate) fn rule_suppliers_in_zip() -> Rule {
    rule! {
        name: "suppliers in a ZIP code",
        patterns: [regex!(r"(?:list|show|all) suppliers? (?:from|in|with) zip(?: code)?\s*(\d{5})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let zip = ctx.group(1)?;
            let suppliers = ctx
                .table
                .distinct(|o| field_contains(&o.supplier_zip, zip), |o| o.supplier_name.as_deref());
            if suppliers.is_empty() {
                return Some(format!("⚠️ No suppliers found in ZIP code {zip}"));
            }
            let shown = suppliers.len().min(50);
            let lines: Vec<String> =
                suppliers.iter().take(50).map(|s| format!("- {}", title_case(s))).collect();
            Some(format!(
                "🏢 Suppliers from ZIP {zip}:\n\n{}{}",
                lines.join("\n"),
                showing(shown, suppliers.len(), "suppliers"),
            ))
        },
    }
}

pub(crate) fn rule_suppliers_with_qualification() -> Rule {
    rule! {
        name: "suppliers with a qualification",
        patterns: [regex!(r"suppliers? with ([\w\-]+) qualification")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let qualification = ctx.group(1)?;
            let display = qualification.to_uppercase();
            let suppliers = ctx.table.distinct(
                |o| field_contains(&o.supplier_qualifications, qualification),
                |o| o.supplier_name.as_deref(),
            );
            if suppliers.is_empty() {
                return Some(format!("⚠️ No suppliers found with {display} qualification"));
            }
            let shown = suppliers.len().min(50);
            let lines: Vec<String> =
                suppliers.iter().take(50).map(|s| format!("- {}", title_case(s))).collect();
            Some(format!(
                "🏢 Suppliers with {display} qualification:\n\n{}{}",
                lines.join("\n"),
                showing(shown, suppliers.len(), "suppliers"),
            ))
        },
    }
}

pub(crate) fn rule_supplier_list() -> Rule {
    rule! {
        name: "supplier listing",
        patterns: [regex!(r"(?:list|show|name|all|give me) (?:the|of|all)? ?suppliers?")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let suppliers = ctx.table.distinct(|_| true, |o| o.supplier_name.as_deref());
            let shown = suppliers.len().min(10);
            let lines: Vec<String> =
                suppliers.iter().take(10).map(|s| format!("- {}", title_case(s))).collect();
            Some(format!(
                "🏢 List of Suppliers:\n\n{}{}",
                lines.join("\n"),
                showing(shown, suppliers.len(), "suppliers"),
            ))
        },
    }
}

pub(crate) fn rule_supplier_total_orders() -> Rule {
    rule! {
        name: "total orders for a supplier",
        patterns: [regex!(r"total orders? (?:of|from|by|for) ([\w\s\-]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let count = ctx.table.count_where(|o| field_contains(&o.supplier_name, supplier));
            Some(format!("📦 Total orders from {}: **{count}**", title_case(supplier)))
        },
    }
}

pub(crate) fn rule_supplier_order_count() -> Rule {
    rule! {
        name: "order count a supplier made",
        patterns: [regex!(r"how many orders did ([\w\s&\-\.]+) (?:make|place|have|do)\??")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let count = ctx.table.count_where(|o| field_contains(&o.supplier_name, supplier));
            Some(format!("📦 {} made **{count}** orders.", title_case(supplier)))
        },
    }
}

/// total spend for a supplier; the display name is the most common stored
/// name among the matches
pub(crate) fn rule_supplier_spend() -> Rule {
    rule! {
        name: "supplier total spend",
        patterns: [regex!(r"total (?:spend|spending|expenditure|amount) by ([\w\s&\-\.]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let matching = |o: &Order| field_contains(&o.supplier_name, supplier);
            if ctx.table.count_where(matching) == 0 {
                return Some(format!("⚠️ No spending found for supplier '{supplier}'"));
            }
            let actual = ctx.table.mode(matching, |o| o.supplier_name.as_deref())?;
            let total = ctx.table.sum_total_where(matching);
            Some(format!("💸 Total spend by {actual}: **{}**", format_currency(Some(total))))
        },
    }
}

pub(crate) fn rule_supplier_spending_on() -> Rule {
    rule! {
        name: "total spending on a supplier",
        patterns: [regex!(r"total spending on ([\w\s&\-\.]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let matching = |o: &Order| field_contains(&o.supplier_name, supplier);
            if ctx.table.count_where(matching) == 0 {
                return Some(format!("⚠️ No spending found for supplier '{supplier}'"));
            }
            let actual = ctx.table.mode(matching, |o| o.supplier_name.as_deref())?;
            let total = ctx.table.sum_total_where(matching);
            Some(format!("💸 Total spending on {actual}: **{}**", format_currency(Some(total))))
        },
    }
}

pub(crate) fn rule_supplier_most_orders() -> Rule {
    rule! {
        name: "supplier with most orders",
        patterns: [],
        required_phrases: ["supplier"],
        optional_phrases: [
            "most orders",
            "most number of orders",
            "highest number of orders",
            "largest number of orders",
            "greatest number of orders",
            "maximum number of orders",
            "max number of orders",
            "biggest number of orders",
            "top number of orders",
        ],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let (supplier, count) = ctx
                .table
                .value_counts(|_| true, |o| o.supplier_name.as_deref())
                .into_iter()
                .next()?;
            Some(format!("🏢 Supplier with most orders: **{supplier}** ({count} orders)"))
        },
    }
}

pub(crate) fn rule_top_spending_suppliers() -> Rule {
    rule! {
        name: "top suppliers by total spending",
        patterns: [],
        required_phrases: ["spending by supplier"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let top = top_by_sum(
                ctx.table.group_sum_total(|_| true, |o| o.supplier_name.as_deref()),
                5,
            );
            let lines: Vec<String> = top
                .iter()
                .map(|(supplier, amount)| {
                    format!("- {supplier}: {}", format_currency(Some(*amount)))
                })
                .collect();
            Some(format!("🏢 Top 5 suppliers by total spending:\n\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_most_expensive_supplier() -> Rule {
    rule! {
        name: "most expensive supplier",
        patterns: [],
        required_phrases: ["supplier"],
        optional_phrases: [
            "most expensive",
            "highest spending",
            "most spending",
            "greatest spending",
            "largest spending",
        ],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let groups = ctx.table.group_sum_total(|_| true, |o| o.supplier_name.as_deref());
            let (supplier, amount) = max_by_sum(groups)?;
            Some(format!(
                "💸 Most expensive supplier: **{supplier}** ({})",
                format_currency(Some(amount)),
            ))
        },
    }
}

pub(crate) fn rule_supplier_year_orders() -> Rule {
    rule! {
        name: "orders from a supplier in a year",
        patterns: [regex!(r"orders? (?:from|by|with|placed with|made by) ([\w\s&\-\.]+) in (\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let year: i32 = ctx.group(2)?.parse().ok()?;
            let count = ctx
                .table
                .count_where(|o| field_contains(&o.supplier_name, supplier) && o.year == year);
            Some(format!("📦 Orders from {} in {year}: **{count}**", title_case(supplier)))
        },
    }
}

pub(crate) fn rule_orders_from_supplier() -> Rule {
    rule! {
        name: "orders from a supplier",
        patterns: [regex!(r"how many orders (?:from|by|with|placed with|made by) ([\w\s&\-\.]+)\??")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let supplier = ctx.group(1)?.trim();
            let count = ctx.table.count_where(|o| field_contains(&o.supplier_name, supplier));
            Some(format!("📦 Orders from {}: **{count}**", title_case(supplier)))
        },
    }
}

//! Date and calendar-period rules (counts and spending by year, month,
//! quarter and date range).

use chrono::{Datelike, NaiveDate};

use crate::engine::BucketMask;
use crate::format::format_currency;
use crate::rules::helpers::{capitalize, month_number, years_in};
use crate::table::{Order, Table, max_by_sum};
use crate::{MatchCtx, Rule};

/// orders between `<month> <year>` and `<month> <year>` (inclusive of the
/// whole end month)
pub(crate) fn rule_orders_between_months() -> Rule {
    rule! {
        name: "orders between two months",
        patterns: [regex!(r"orders? between (\w+)\s+(\d{4}) and (\w+)\s+(\d{4})")],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::MONTHISH).bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let start_month = month_number(ctx.group(1)?)?;
            let start_year: i32 = ctx.group(2)?.parse().ok()?;
            let end_month = month_number(ctx.group(3)?)?;
            let end_year: i32 = ctx.group(4)?.parse().ok()?;

            let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;
            let end = last_day_of_month(end_year, end_month)?;

            let count = ctx
                .table
                .count_where(|o| o.purchase_date >= start && o.purchase_date <= end);
            Some(format!(
                "📅 Orders between {} and {}: **{count}**",
                start.format("%b %Y"),
                end.format("%b %Y"),
            ))
        },
    }
}

/// orders on an exact date ("july 15, 2014")
pub(crate) fn rule_orders_on_date() -> Rule {
    rule! {
        name: "orders on an exact date",
        patterns: [regex!(r"(?:on|made on|placed on|received on)? ?(\w+)\s+(\d{1,2}),?\s+(\d{4})")],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::MONTHISH).bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            // The captured word may not be a month at all; decline and let
            // later rules have the question.
            let month = month_number(ctx.group(1)?)?;
            let day: u32 = ctx.group(2)?.parse().ok()?;
            let year: i32 = ctx.group(3)?.parse().ok()?;

            let count = ctx
                .table
                .count_where(|o| o.year == year && o.month == month && o.purchase_date.day() == day);
            Some(format!(
                "📅 Total orders on {} {day}, {year}: **{count}**",
                capitalize(ctx.group(1)?),
            ))
        },
    }
}

/// orders in `<month> <year>`
pub(crate) fn rule_orders_in_month() -> Rule {
    rule! {
        name: "orders in a month",
        patterns: [regex!(r"(?:in|for|from) (\w+) (\d{4})")],
        buckets: (BucketMask::HAS_DIGITS | BucketMask::MONTHISH).bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let month = month_number(ctx.group(1)?)?;
            let year: i32 = ctx.group(2)?.parse().ok()?;

            let count = ctx.table.count_where(|o| o.year == year && o.month == month);
            Some(format!(
                "📦 Total orders in {} {year}: **{count}**",
                capitalize(ctx.group(1)?),
            ))
        },
    }
}

/// per-year order counts when two or more years are mentioned
pub(crate) fn rule_orders_by_year() -> Rule {
    rule! {
        name: "order counts across years",
        patterns: [],
        required_phrases: ["order"],
        buckets: BucketMask::HAS_YEAR.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let years = years_in(ctx.question);
            if years.len() < 2 {
                return None;
            }
            let lines: Vec<String> = years
                .iter()
                .map(|&year| {
                    format!("📦 {year}: {} orders", ctx.table.count_where(|o| o.year == year))
                })
                .collect();
            Some(format!("📊 Total orders by year:\n\n{}", lines.join("\n")))
        },
    }
}

/// order count in a single year; out-of-window years count zero because such
/// rows were dropped at load
pub(crate) fn rule_orders_in_year() -> Rule {
    rule! {
        name: "order count in a year",
        patterns: [regex!(r"(?:how many|number of)? ?orders (?:were )?(?:placed|made|received)? ?(?:in|during|for)? ?(\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year: i32 = ctx.group(1)?.parse().ok()?;
            let count = ctx.table.count_where(|o| o.year == year);
            Some(format!("📦 Total orders in {year}: **{count}**"))
        },
    }
}

pub(crate) fn rule_top_quarter_in_year() -> Rule {
    rule! {
        name: "quarter with highest spending in a year",
        patterns: [regex!(r"quarter.*highest.*(?:in|for)? ?(\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year: i32 = ctx.group(1)?.parse().ok()?;
            if ctx.table.count_where(|o| o.year == year) == 0 {
                return Some(format!("⚠️ No data for year {year}."));
            }
            let spending = quarter_spending(ctx.table, |o| o.year == year);
            match max_by_sum(spending) {
                Some((quarter, amount)) => Some(format!(
                    "💰 Quarter with highest spending in {year}: **Q{quarter} ({})**",
                    format_currency(Some(amount)),
                )),
                None => Some(format!("⚠️ No spending data for year {year}.")),
            }
        },
    }
}

pub(crate) fn rule_total_spending_in_year() -> Rule {
    rule! {
        name: "total spending in a year",
        patterns: [regex!(r"(?:total|overall) spending in (\d{4})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let year: i32 = ctx.group(1)?.parse().ok()?;
            let total = ctx.table.sum_total_where(|o| o.year == year);
            Some(format!("💸 Total spending in {year}: **{}**", format_currency(Some(total))))
        },
    }
}

/// average monthly spending for one or more years (sum over a flat 12 months)
pub(crate) fn rule_average_monthly_spending() -> Rule {
    rule! {
        name: "average monthly spending per year",
        patterns: [regex!(r"average monthly spending(?: in| of)? ([\d,\sand]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let years = years_in(ctx.group(1)?);
            if ctx.table.count_where(|o| years.contains(&o.year)) == 0 {
                let listed = years.iter().map(i32::to_string).collect::<Vec<_>>().join(", ");
                return Some(format!("⚠️ No records found for year(s): {listed}"));
            }
            let lines: Vec<String> = years
                .iter()
                .map(|&year| {
                    let average = ctx.table.sum_total_where(|o| o.year == year) / 12.0;
                    format!("📊 {year}: **{}**", format_currency(Some(average)))
                })
                .collect();
            Some(format!("📈 Average Monthly Spending:\n\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_top_quarter() -> Rule {
    rule! {
        name: "quarter with highest spending",
        patterns: [],
        required_phrases: ["quarter with", "highest"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let (quarter, amount) = max_by_sum(quarter_spending(ctx.table, |_| true))?;
            Some(format!(
                "💰 Quarter with highest spending: **Q{quarter} ({})**",
                format_currency(Some(amount)),
            ))
        },
    }
}

/// Total price per quarter over matching rows; quarters with no rows get no
/// group, so ties resolve to the lowest quarter.
fn quarter_spending<P: Fn(&Order) -> bool + Copy>(table: &Table, pred: P) -> Vec<(String, f64)> {
    (1..=4u32)
        .filter(|&q| table.count_where(|o| pred(o) && o.quarter == q) > 0)
        .map(|q| (q.to_string(), table.sum_total_where(|o| pred(o) && o.quarter == q)))
        .collect()
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

//! Record lookups and location/classification filters: ZIP and location
//! listings, order-number details, classification codes and category counts.

use crate::engine::BucketMask;
use crate::format::{format_currency, format_order, or_na, quantity_display};
use crate::table::{Order, field_contains, field_eq};
use crate::{MatchCtx, Rule};

/// purchases delivered to a ZIP, searched in both the delivery location and
/// the supplier ZIP
pub(crate) fn rule_zip_purchases() -> Rule {
    rule! {
        name: "purchases delivered to a ZIP",
        patterns: [regex!(r"(?:zip code|zip|location)\s*(\d{5})")],
        optional_phrases: ["purchases delivered to zip", "purchases in zip", "orders delivered to"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let zip = ctx.group(1)?;
            let rows: Vec<&Order> = ctx
                .table
                .rows()
                .iter()
                .filter(|o| field_contains(&o.location, zip) || field_contains(&o.supplier_zip, zip))
                .collect();
            if rows.is_empty() {
                return Some(format!("⚠️ No purchases found for ZIP code {zip}"));
            }
            let lines: Vec<String> = rows
                .iter()
                .take(20)
                .map(|o| {
                    format!(
                        "- {} ({}, {})",
                        or_na(&o.item_name),
                        format_currency(o.total_price),
                        o.purchase_date.format("%Y-%m-%d"),
                    )
                })
                .collect();
            Some(format!("📍 Purchases for location {zip}:\n{}", lines.join("\n")))
        },
    }
}

pub(crate) fn rule_location_purchases() -> Rule {
    rule! {
        name: "purchases linked to a location",
        patterns: [regex!(r"location (\d+)")],
        required_phrases: ["purchases linked to location"],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let zip = ctx.group(1)?;
            let rows: Vec<&Order> =
                ctx.table.rows().iter().filter(|o| field_contains(&o.location, zip)).collect();
            if rows.is_empty() {
                return Some(format!("⚠️ No purchases found for location {zip}"));
            }
            let lines: Vec<String> = rows
                .iter()
                .take(10)
                .map(|o| format!("- {} ({})", or_na(&o.item_name), format_currency(o.total_price)))
                .collect();
            Some(format!("📍 Purchases for location {zip}:\n{}", lines.join("\n")))
        },
    }
}

/// quantity and unit price of one item on one purchase order
pub(crate) fn rule_po_item_quantity_price() -> Rule {
    rule! {
        name: "quantity and unit price on a purchase order",
        patterns: [],
        required_phrases: ["quantity and unit price for the item", "purchase order"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let item = regex!(r"item (.+?) in").captures(ctx.question)?.get(1)?.as_str().trim();
            let po = regex!(r"purchase order (.+?)$").captures(ctx.question)?.get(1)?.as_str().trim();
            let display = item.to_uppercase();

            let row = ctx.table.rows().iter().find(|o| {
                field_contains(&o.purchase_order_number, po) && field_contains(&o.item_name, item)
            });
            match row {
                Some(order) => Some(format!(
                    "📊 For item {display} in PO {po}:\n- Quantity: {}\n- Unit Price: {}",
                    quantity_display(order.quantity),
                    format_currency(order.unit_price),
                )),
                None => Some(format!("⚠️ No matching purchase found for item {display} in PO {po}")),
            }
        },
    }
}

pub(crate) fn rule_po_for_requisition() -> Rule {
    rule! {
        name: "purchase order number for a requisition",
        patterns: [regex!(r"purchase order number (?:for|of) (?:the )?requisition (\w+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let requisition = ctx.group(1)?;
            let display = requisition.to_uppercase();
            match ctx.table.rows().iter().find(|o| field_eq(&o.requisition_number, requisition)) {
                Some(order) => Some(format!(
                    "🔢 Purchase Order Number for Requisition {display}: **{}**",
                    or_na(&order.purchase_order_number),
                )),
                None => Some(format!("⚠️ No order found for requisition {display}")),
            }
        },
    }
}

/// full order details by requisition or PO number; exact match first, then
/// substring
pub(crate) fn rule_order_details() -> Rule {
    rule! {
        name: "order number lookup",
        patterns: [regex!(r"\b(?:requisition|req|purchase order|po)\b[\s\-]?(?:number|no|#)?[\s\-]*([a-z0-9\-\.]+)")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let number = ctx.group(1)?;
            let rows = ctx.table.rows();

            let order = rows
                .iter()
                .find(|o| field_eq(&o.requisition_number, number))
                .or_else(|| rows.iter().find(|o| field_eq(&o.purchase_order_number, number)))
                .or_else(|| {
                    rows.iter().find(|o| {
                        field_contains(&o.requisition_number, number)
                            || field_contains(&o.purchase_order_number, number)
                    })
                });
            match order {
                Some(order) => Some(format_order(order)),
                None => Some(format!("⚠️ No order found with number {}", number.to_uppercase())),
            }
        },
    }
}

pub(crate) fn rule_common_location() -> Rule {
    rule! {
        name: "most common delivery location",
        patterns: [],
        optional_phrases: ["most common delivery location", "location with most orders"],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let (location, count) =
                ctx.table.value_counts(|_| true, |o| o.location.as_deref()).into_iter().next()?;
            Some(format!("📍 Most common delivery location: **{location}** ({count} orders)"))
        },
    }
}

pub(crate) fn rule_supplier_zip_orders() -> Rule {
    rule! {
        name: "orders from suppliers in a ZIP",
        patterns: [regex!(r"orders? from suppliers? in zip (\d{5})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let zip = ctx.group(1)?;
            let count = ctx.table.count_where(|o| field_contains(&o.supplier_zip, zip));
            Some(format!("📦 Orders from suppliers in ZIP {zip}: **{count}**"))
        },
    }
}

pub(crate) fn rule_delivered_zip_orders() -> Rule {
    rule! {
        name: "orders delivered to a ZIP",
        patterns: [regex!(r"orders? delivered to (\d{5})")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let zip = ctx.group(1)?;
            let count = ctx.table.count_where(|o| field_contains(&o.location, zip));
            Some(format!("📦 Orders delivered to {zip}: **{count}**"))
        },
    }
}

pub(crate) fn rule_classification_code_orders() -> Rule {
    rule! {
        name: "orders with a classification code",
        patterns: [regex!(r"classification code (\d+)")],
        buckets: BucketMask::HAS_DIGITS.bits(),
        answer: |ctx: &MatchCtx| -> Option<String> {
            let code = ctx.group(1)?;
            let count = ctx.table.count_where(|o| field_contains(&o.classification_codes, code));
            Some(format!("📦 Orders with classification code {code}: **{count}**"))
        },
    }
}

/// orders whose commodity/class/family/segment title mentions a keyword; a
/// row matching several titles counts once
pub(crate) fn rule_category_orders() -> Rule {
    rule! {
        name: "orders under a category",
        patterns: [regex!(r"(?:orders|purchases) (?:under|in|from|for) (.+?) (?:category|item|group)?\??$")],
        answer: |ctx: &MatchCtx| -> Option<String> {
            let keyword = ctx.group(1)?.trim();
            let count = ctx.table.count_where(|o| {
                field_contains(&o.commodity_title, keyword)
                    || field_contains(&o.class_title, keyword)
                    || field_contains(&o.family_title, keyword)
                    || field_contains(&o.segment_title, keyword)
            });
            if count > 0 {
                Some(format!("📦 Total orders under '{keyword}' category: **{count}**"))
            } else {
                Some(format!("❌ No orders found under the category '{keyword}'."))
            }
        },
    }
}

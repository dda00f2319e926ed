//! The question-rule inventory.
//!
//! Rules live in focused submodules grouped by intent family; [`all`] splices
//! them into the single hand-ordered list the router walks. The order is
//! load-bearing: specific intents must come before the general intents whose
//! patterns would also match ("top N suppliers by total spend in 2014" before
//! "order count in a year"), and the catch-all "items" ranking is last
//! because it matches almost anything that mentions items.
//!
//! When adding a rule, place it by specificity, not by module: entries from
//! different modules interleave freely below.

#[path = "rules/helpers.rs"]
pub(crate) mod helpers;
#[path = "rules/items.rs"]
mod items;
#[path = "rules/lookup.rs"]
mod lookup;
#[path = "rules/procurement.rs"]
mod procurement;
#[path = "rules/suppliers.rs"]
mod suppliers;
#[path = "rules/time.rs"]
mod time;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;

use crate::Rule;

/// The full rule list in evaluation order.
pub(crate) fn all() -> Vec<Rule> {
    vec![
        // Narrow, fully-phrased intents first.
        lookup::rule_zip_purchases(),
        procurement::rule_acquisition_method_purchases(),
        suppliers::rule_top_suppliers(),
        suppliers::rule_supplier_code_spend(),
        procurement::rule_top_acquisition_type(),
        items::rule_frequent_items_fiscal(),
        items::rule_unspsc_lookup(),
        procurement::rule_sub_acquisition_transactions(),
        items::rule_item_classification(),
        items::rule_item_code_quantity(),
        procurement::rule_department_fiscal_spend(),
        lookup::rule_location_purchases(),
        procurement::rule_acquisition_type_items(),
        suppliers::rule_supplier_qualification_purchases(),
        lookup::rule_po_item_quantity_price(),
        procurement::rule_acquisition_method_count(),
        suppliers::rule_supplier_fiscal_spend(),
        procurement::rule_calcard_fiscal_spend(),
        suppliers::rule_supplier_lpa_count(),
        procurement::rule_acquisition_methods_in_year(),
        lookup::rule_po_for_requisition(),
        // Entity + year combinations before their year-less variants.
        suppliers::rule_supplier_orders_across_years(),
        items::rule_item_quantity_in_year(),
        suppliers::rule_supplier_orders_in_year(),
        items::rule_item_spend_with_example(),
        procurement::rule_calcard_year_spend(),
        lookup::rule_order_details(),
        items::rule_most_expensive_item(),
        time::rule_orders_between_months(),
        suppliers::rule_suppliers_in_zip(),
        suppliers::rule_suppliers_with_qualification(),
        lookup::rule_common_location(),
        items::rule_item_spend_in_year(),
        suppliers::rule_supplier_list(),
        suppliers::rule_supplier_total_orders(),
        // Date rules: exact date, then month, then year spans, then year.
        time::rule_orders_on_date(),
        time::rule_orders_in_month(),
        time::rule_orders_by_year(),
        time::rule_orders_in_year(),
        time::rule_top_quarter_in_year(),
        lookup::rule_supplier_zip_orders(),
        lookup::rule_delivered_zip_orders(),
        lookup::rule_classification_code_orders(),
        lookup::rule_category_orders(),
        suppliers::rule_supplier_order_count(),
        suppliers::rule_supplier_spend(),
        procurement::rule_acquisition_keyword_orders(),
        time::rule_total_spending_in_year(),
        time::rule_average_monthly_spending(),
        time::rule_top_quarter(),
        suppliers::rule_supplier_spending_on(),
        // Broad rankings and loose nets last.
        items::rule_most_frequent_items(),
        suppliers::rule_supplier_most_orders(),
        suppliers::rule_top_spending_suppliers(),
        items::rule_most_common_class(),
        items::rule_top_segments(),
        items::rule_items_bought_most(),
        items::rule_item_spend_lookup(),
        items::rule_segment_orders(),
        suppliers::rule_most_expensive_supplier(),
        suppliers::rule_supplier_year_orders(),
        suppliers::rule_orders_from_supplier(),
        items::rule_top_items(),
    ]
}

//! The in-memory order table.
//!
//! `Table` is built once by the loader and never mutated afterwards; every
//! rule handler reads a filtered/grouped view of it. Aggregation helpers keep
//! two invariants the handlers rely on:
//!
//! - missing numeric fields are skipped, never coerced to zero;
//! - grouped results preserve first-encounter order, so descending sorts
//!   break ties by the order rows were loaded.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

/// Normalized CalCard flag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalCard {
    Yes,
    No,
    #[default]
    Other,
}

impl CalCard {
    /// Normalize a raw flag value (trimmed, case-uniform) to the token set.
    pub fn parse(raw: &str) -> CalCard {
        match raw.trim().to_ascii_uppercase().as_str() {
            "YES" | "Y" => CalCard::Yes,
            "NO" | "N" => CalCard::No,
            _ => CalCard::Other,
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, CalCard::Yes)
    }
}

/// One purchase-order row after loading.
///
/// Text fields keep their source casing except `supplier_name` (canonical
/// lower case, for grouping) and `supplier_qualifications` (upper case).
/// Numeric fields are `None` when the source value was absent or unparseable.
#[derive(Debug, Clone)]
pub struct Order {
    pub requisition_number: Option<String>,
    pub purchase_order_number: Option<String>,
    pub supplier_code: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_qualifications: Option<String>,
    pub supplier_zip: Option<String>,
    pub calcard: CalCard,
    pub lpa_number: Option<String>,
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub purchase_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub fiscal_year: Option<String>,
    pub acquisition_type: Option<String>,
    pub acquisition_method: Option<String>,
    pub sub_acquisition_method: Option<String>,
    pub department_name: Option<String>,
    pub location: Option<String>,
    pub classification_codes: Option<String>,
    pub normalized_unspsc: Option<String>,
    pub commodity_title: Option<String>,
    pub class_title: Option<String>,
    pub family_title: Option<String>,
    pub segment_title: Option<String>,
}

impl Order {
    /// An empty order on `purchase_date`, with year/month/quarter derived
    /// from it. The derived fields have no independent source of truth.
    pub fn new(purchase_date: NaiveDate) -> Order {
        let month = purchase_date.month();
        Order {
            requisition_number: None,
            purchase_order_number: None,
            supplier_code: None,
            supplier_name: None,
            supplier_qualifications: None,
            supplier_zip: None,
            calcard: CalCard::Other,
            lpa_number: None,
            item_name: None,
            item_description: None,
            quantity: None,
            unit_price: None,
            total_price: None,
            purchase_date,
            year: purchase_date.year(),
            month,
            quarter: (month - 1) / 3 + 1,
            fiscal_year: None,
            acquisition_type: None,
            acquisition_method: None,
            sub_acquisition_method: None,
            department_name: None,
            location: None,
            classification_codes: None,
            normalized_unspsc: None,
            commodity_title: None,
            class_title: None,
            family_title: None,
            segment_title: None,
        }
    }
}

/// The immutable order table.
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Order>,
}

impl Table {
    pub fn from_rows(rows: Vec<Order>) -> Table {
        Table { rows }
    }

    pub fn empty() -> Table {
        Table { rows: Vec::new() }
    }

    pub fn rows(&self) -> &[Order] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// An empty table is the canonical "data unavailable" signal, not
    /// "zero matching rows".
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count_where<P: Fn(&Order) -> bool>(&self, pred: P) -> usize {
        self.rows.iter().filter(|o| pred(o)).count()
    }

    /// Sum of total price over matching rows; rows with a missing total are
    /// skipped. An empty filter sums to zero.
    pub fn sum_total_where<P: Fn(&Order) -> bool>(&self, pred: P) -> f64 {
        self.rows.iter().filter(|o| pred(o)).filter_map(|o| o.total_price).sum()
    }

    /// Sum of quantity over matching rows; missing quantities are skipped.
    pub fn sum_quantity_where<P: Fn(&Order) -> bool>(&self, pred: P) -> f64 {
        self.rows.iter().filter(|o| pred(o)).filter_map(|o| o.quantity).sum()
    }

    /// Group matching rows by `key` and sum total price per group.
    ///
    /// Groups appear in first-encounter order. Rows with a missing key are
    /// skipped entirely; rows with a missing total still create their group
    /// but contribute nothing to its sum.
    pub fn group_sum_total<P, K>(&self, pred: P, key: K) -> Vec<(String, f64)>
    where
        P: Fn(&Order) -> bool,
        K: Fn(&Order) -> Option<&str>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, f64)> = Vec::new();
        for row in self.rows.iter().filter(|o| pred(o)) {
            let Some(k) = key(row) else { continue };
            let slot = match index.get(k) {
                Some(&i) => i,
                None => {
                    index.insert(k.to_string(), groups.len());
                    groups.push((k.to_string(), 0.0));
                    groups.len() - 1
                }
            };
            if let Some(total) = row.total_price {
                groups[slot].1 += total;
            }
        }
        groups
    }

    /// Count matching rows per `key`, sorted by count descending. The sort is
    /// stable, so ties keep first-encounter order.
    pub fn value_counts<P, K>(&self, pred: P, key: K) -> Vec<(String, usize)>
    where
        P: Fn(&Order) -> bool,
        K: Fn(&Order) -> Option<&str>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();
        for row in self.rows.iter().filter(|o| pred(o)) {
            let Some(k) = key(row) else { continue };
            let slot = match index.get(k) {
                Some(&i) => i,
                None => {
                    index.insert(k.to_string(), counts.len());
                    counts.push((k.to_string(), 0));
                    counts.len() - 1
                }
            };
            counts[slot].1 += 1;
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Most common `key` value among matching rows.
    pub fn mode<P, K>(&self, pred: P, key: K) -> Option<String>
    where
        P: Fn(&Order) -> bool,
        K: Fn(&Order) -> Option<&str>,
    {
        self.value_counts(pred, key).into_iter().next().map(|(k, _)| k)
    }

    /// The matching row with the highest total price; `None` when no matching
    /// row has a price. Ties keep the first-encountered row.
    pub fn max_total_row<P: Fn(&Order) -> bool>(&self, pred: P) -> Option<&Order> {
        let mut best: Option<(&Order, f64)> = None;
        for row in self.rows.iter().filter(|o| pred(o)) {
            let Some(total) = row.total_price else { continue };
            if best.map_or(true, |(_, b)| total > b) {
                best = Some((row, total));
            }
        }
        best.map(|(row, _)| row)
    }

    /// Unique `key` values over matching rows, in first-encounter order.
    pub fn distinct<P, K>(&self, pred: P, key: K) -> Vec<String>
    where
        P: Fn(&Order) -> bool,
        K: Fn(&Order) -> Option<&str>,
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out: Vec<String> = Vec::new();
        for row in self.rows.iter().filter(|o| pred(o)) {
            let Some(k) = key(row) else { continue };
            if seen.insert(k) {
                out.push(k.to_string());
            }
        }
        out
    }
}

// --- Matching helpers --------------------------------------------------------

/// Substring match: case-insensitive, unanchored. This is the system's only
/// fuzzy-matching mechanism; entity lookups must not get any smarter than
/// this.
pub(crate) fn field_contains(field: &Option<String>, needle: &str) -> bool {
    field.as_deref().is_some_and(|v| v.to_lowercase().contains(needle))
}

/// Exact match after trimming, case-insensitive.
pub(crate) fn field_eq(field: &Option<String>, value: &str) -> bool {
    field.as_deref().is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
}

/// Sort groups by summed value descending (stable: ties keep first-encounter
/// order) and keep the top `n`.
pub(crate) fn top_by_sum(mut groups: Vec<(String, f64)>, n: usize) -> Vec<(String, f64)> {
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    groups.truncate(n);
    groups
}

/// The group with the largest sum; ties keep the first-encountered group.
pub(crate) fn max_by_sum(groups: Vec<(String, f64)>) -> Option<(String, f64)> {
    let mut best: Option<(String, f64)> = None;
    for (k, v) in groups {
        if best.as_ref().map_or(true, |(_, b)| v > *b) {
            best = Some((k, v));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn priced(supplier: &str, total: Option<f64>) -> Order {
        let mut order = Order::new(day(2014, 3, 1));
        order.supplier_name = Some(supplier.to_string());
        order.total_price = total;
        order
    }

    #[test]
    fn derived_fields_follow_purchase_date() {
        let order = Order::new(day(2013, 11, 30));
        assert_eq!(order.year, 2013);
        assert_eq!(order.month, 11);
        assert_eq!(order.quarter, 4);
    }

    #[test]
    fn missing_totals_are_skipped_not_zeroed() {
        let table = Table::from_rows(vec![
            priced("a", Some(10.0)),
            priced("a", None),
            priced("b", Some(5.0)),
        ]);
        assert_eq!(table.sum_total_where(|_| true), 15.0);

        // The row with a missing total still creates its group.
        let groups = table.group_sum_total(|_| true, |o| o.supplier_name.as_deref());
        assert_eq!(groups, vec![("a".to_string(), 10.0), ("b".to_string(), 5.0)]);
    }

    #[test]
    fn empty_filter_sums_to_zero() {
        let table = Table::from_rows(vec![priced("a", Some(10.0))]);
        assert_eq!(table.sum_total_where(|o| o.year == 1999), 0.0);
    }

    #[test]
    fn top_by_sum_breaks_ties_by_first_encounter() {
        let groups =
            vec![("x".to_string(), 5.0), ("y".to_string(), 9.0), ("z".to_string(), 9.0)];
        let top = top_by_sum(groups, 2);
        assert_eq!(top[0].0, "y");
        assert_eq!(top[1].0, "z");
    }

    #[test]
    fn max_by_sum_keeps_first_on_tie() {
        let groups = vec![("x".to_string(), 9.0), ("y".to_string(), 9.0)];
        assert_eq!(max_by_sum(groups).unwrap().0, "x");
    }

    #[test]
    fn value_counts_sorts_descending_stable() {
        let table = Table::from_rows(vec![
            priced("a", None),
            priced("b", None),
            priced("b", None),
            priced("c", None),
        ]);
        let counts = table.value_counts(|_| true, |o| o.supplier_name.as_deref());
        assert_eq!(counts[0], ("b".to_string(), 2));
        // a and c tie at 1; a was encountered first.
        assert_eq!(counts[1].0, "a");
        assert_eq!(counts[2].0, "c");
    }

    #[test]
    fn field_contains_is_case_insensitive_and_unanchored() {
        let field = Some("Pitney Bowes Inc".to_string());
        assert!(field_contains(&field, "bowes"));
        assert!(field_contains(&field, "pitney bowes"));
        assert!(!field_contains(&field, "xerox"));
        assert!(!field_contains(&None, "bowes"));
    }

    #[test]
    fn calcard_normalizes_to_token_set() {
        assert_eq!(CalCard::parse(" yes "), CalCard::Yes);
        assert_eq!(CalCard::parse("NO"), CalCard::No);
        assert_eq!(CalCard::parse("maybe"), CalCard::Other);
        assert_eq!(CalCard::parse(""), CalCard::Other);
    }
}

//! Dataset loading and caching.
//!
//! [`Dataset`] turns the store's raw records into the typed [`Table`] exactly
//! once per process and hands out shared references afterwards. Failure is
//! graceful at two granularities: a broken store degrades the whole load to
//! an empty table, and a malformed field degrades just that field to missing.

use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::format::parse_amount;
use crate::store::{RawRecord, StaticStore, Store};
use crate::table::{CalCard, Order, Table};

/// Rows outside this window are dropped at load time, so year filters outside
/// it always count zero.
const VALID_YEARS: RangeInclusive<i32> = 2012..=2015;

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Store column names.
mod col {
    pub const REQUISITION_NUMBER: &str = "Requisition Number";
    pub const PURCHASE_ORDER_NUMBER: &str = "Purchase Order Number";
    pub const SUPPLIER_CODE: &str = "Supplier Code";
    pub const SUPPLIER_NAME: &str = "Supplier Name";
    pub const SUPPLIER_QUALIFICATIONS: &str = "Supplier Qualifications";
    pub const SUPPLIER_ZIP: &str = "Supplier Zip Code";
    pub const CALCARD: &str = "CalCard";
    pub const LPA_NUMBER: &str = "LPA Number";
    pub const ITEM_NAME: &str = "Item Name";
    pub const ITEM_DESCRIPTION: &str = "Item Description";
    pub const QUANTITY: &str = "Quantity";
    pub const UNIT_PRICE: &str = "Unit Price";
    pub const TOTAL_PRICE: &str = "Total Price";
    pub const PURCHASE_DATE: &str = "Purchase Date";
    pub const FISCAL_YEAR: &str = "Fiscal Year";
    pub const ACQUISITION_TYPE: &str = "Acquisition Type";
    pub const ACQUISITION_METHOD: &str = "Acquisition Method";
    pub const SUB_ACQUISITION_METHOD: &str = "Sub-Acquisition Method";
    pub const DEPARTMENT_NAME: &str = "Department Name";
    pub const LOCATION: &str = "Location";
    pub const CLASSIFICATION_CODES: &str = "Classification Codes";
    pub const NORMALIZED_UNSPSC: &str = "Normalized UNSPSC";
    pub const COMMODITY_TITLE: &str = "Commodity Title";
    pub const CLASS_TITLE: &str = "Class Title";
    pub const FAMILY_TITLE: &str = "Family Title";
    pub const SEGMENT_TITLE: &str = "Segment Title";
}

/// The injectable, read-only data-access object.
///
/// Created once at process start, handed to the [`Assistant`](crate::Assistant)
/// at construction. The first `load` queries the store; later calls return the
/// cached table. `reload` re-queries, which is how tests and the CLI refresh
/// after an import.
pub struct Dataset {
    store: Box<dyn Store>,
    cache: RwLock<Option<Arc<Table>>>,
}

impl Dataset {
    pub fn new(store: Box<dyn Store>) -> Dataset {
        Dataset { store, cache: RwLock::new(None) }
    }

    /// A dataset over a pre-built table; the store is never queried.
    pub fn fixed(table: Table) -> Dataset {
        Dataset {
            store: Box::new(StaticStore::new(Vec::new())),
            cache: RwLock::new(Some(Arc::new(table))),
        }
    }

    /// The cached table, loading it on first use. Initialization happens at
    /// most once even with concurrent callers: the write lock is re-checked
    /// after acquisition.
    pub fn load(&self) -> Arc<Table> {
        if let Some(table) = read_lock(&self.cache).as_ref() {
            return Arc::clone(table);
        }
        let mut guard = write_lock(&self.cache);
        if let Some(table) = guard.as_ref() {
            return Arc::clone(table);
        }
        let table = Arc::new(self.fetch_table());
        *guard = Some(Arc::clone(&table));
        table
    }

    /// Drop the cache and re-query the store.
    pub fn reload(&self) -> Arc<Table> {
        let table = Arc::new(self.fetch_table());
        *write_lock(&self.cache) = Some(Arc::clone(&table));
        table
    }

    fn fetch_table(&self) -> Table {
        match self.store.fetch_all() {
            Ok(records) => {
                let mut rows = Vec::with_capacity(records.len());
                let mut dropped = 0usize;
                for record in &records {
                    match parse_record(record) {
                        Some(order) => rows.push(order),
                        None => dropped += 1,
                    }
                }
                debug!(fetched = records.len(), kept = rows.len(), dropped, "loaded order table");
                Table::from_rows(rows)
            }
            Err(err) => {
                warn!(%err, "store unavailable; continuing with an empty table");
                Table::empty()
            }
        }
    }
}

fn read_lock(
    cache: &RwLock<Option<Arc<Table>>>,
) -> std::sync::RwLockReadGuard<'_, Option<Arc<Table>>> {
    cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock(
    cache: &RwLock<Option<Arc<Table>>>,
) -> std::sync::RwLockWriteGuard<'_, Option<Arc<Table>>> {
    cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Type one raw record. Returns `None` only when the purchase date is missing,
/// unparseable or outside the supported window; any other malformed field
/// degrades to missing.
fn parse_record(raw: &RawRecord) -> Option<Order> {
    let purchase_date =
        NaiveDate::parse_from_str(raw.get(col::PURCHASE_DATE)?.trim(), DATE_FORMAT).ok()?;
    if !VALID_YEARS.contains(&purchase_date.year()) {
        return None;
    }

    let mut order = Order::new(purchase_date);
    order.requisition_number = text(raw, col::REQUISITION_NUMBER);
    order.purchase_order_number = text(raw, col::PURCHASE_ORDER_NUMBER);
    order.supplier_code = text(raw, col::SUPPLIER_CODE);
    // Canonical lower case for grouping; display casing is recovered by the
    // formatter.
    order.supplier_name = text(raw, col::SUPPLIER_NAME).map(|s| s.to_lowercase());
    order.supplier_qualifications =
        text(raw, col::SUPPLIER_QUALIFICATIONS).map(|s| s.to_uppercase());
    order.supplier_zip = text(raw, col::SUPPLIER_ZIP);
    order.calcard = raw.get(col::CALCARD).map(|s| CalCard::parse(s)).unwrap_or_default();
    order.lpa_number = text(raw, col::LPA_NUMBER);
    order.item_name = text(raw, col::ITEM_NAME);
    order.item_description = text(raw, col::ITEM_DESCRIPTION);
    order.quantity = number(raw, col::QUANTITY);
    order.unit_price = number(raw, col::UNIT_PRICE);
    order.total_price = number(raw, col::TOTAL_PRICE);
    order.fiscal_year = text(raw, col::FISCAL_YEAR);
    order.acquisition_type = text(raw, col::ACQUISITION_TYPE);
    order.acquisition_method = text(raw, col::ACQUISITION_METHOD);
    order.sub_acquisition_method = text(raw, col::SUB_ACQUISITION_METHOD);
    order.department_name = text(raw, col::DEPARTMENT_NAME);
    order.location = text(raw, col::LOCATION);
    order.classification_codes = text(raw, col::CLASSIFICATION_CODES);
    order.normalized_unspsc = text(raw, col::NORMALIZED_UNSPSC);
    order.commodity_title = text(raw, col::COMMODITY_TITLE);
    order.class_title = text(raw, col::CLASS_TITLE);
    order.family_title = text(raw, col::FAMILY_TITLE);
    order.segment_title = text(raw, col::SEGMENT_TITLE);
    Some(order)
}

fn text(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

fn number(raw: &RawRecord, key: &str) -> Option<f64> {
    raw.get(key).and_then(|s| parse_amount(s))
}

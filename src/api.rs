use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::engine::Router;
use crate::loader::Dataset;
use crate::store::Store;

/// Options that affect routing behavior.
///
/// Passed explicitly at construction; there is no process-global debug state.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Emit per-rule evaluation traces via `tracing` at debug level.
    pub trace_rules: bool,
}

/// One answered question.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    /// The question as asked.
    pub question: String,
    /// The answer text. Every failure mode resolves to text here; callers
    /// never see an error value.
    pub text: String,
    /// Total time spent routing.
    pub elapsed: Duration,
    pub details: AnswerDetails,
}

/// Routing diagnostics attached to an [`AnswerResult`].
#[derive(Debug, Clone)]
pub struct AnswerDetails {
    /// Name of the rule that answered, or `None` for the fallback and
    /// data-unavailable answers.
    pub matched_rule: Option<String>,
    /// Rules whose gates and pattern matched (including ones that declined).
    pub rules_evaluated: usize,
    /// Names of rules whose gates passed for this question.
    pub active_rules: Vec<String>,
}

/// The assistant: an injectable read-only dataset plus the rule list.
///
/// # Example
/// ```no_run
/// use ordsmed::{Assistant, SqliteStore};
///
/// let assistant = Assistant::new(Box::new(SqliteStore::open("orders.db")));
/// println!("{}", assistant.answer("how many orders were placed in 2014?"));
/// ```
pub struct Assistant {
    dataset: Dataset,
    router: Router,
    options: Options,
}

impl Assistant {
    pub fn new(store: Box<dyn Store>) -> Assistant {
        Assistant::with_options(store, Options::default())
    }

    pub fn with_options(store: Box<dyn Store>, options: Options) -> Assistant {
        Assistant::from_dataset(Dataset::new(store), options)
    }

    /// Build over an existing dataset; used with [`Dataset::fixed`] for
    /// fixtures.
    pub fn from_dataset(dataset: Dataset, options: Options) -> Assistant {
        Assistant { dataset, router: Router::new(crate::rules::all()), options }
    }

    /// Answer a single question.
    ///
    /// This is the sole entry point the chat surface calls per user turn. It
    /// never panics: handler faults are caught at this boundary and surfaced
    /// as an error string.
    pub fn answer(&self, question: &str) -> String {
        self.answer_verbose(question).text
    }

    /// Answer a question and return routing diagnostics alongside the text.
    pub fn answer_verbose(&self, question: &str) -> AnswerResult {
        let table = self.dataset.load();
        let routed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.router.route(question, &table, &self.options)
        }));
        match routed {
            Ok(outcome) => AnswerResult {
                question: question.to_string(),
                text: outcome.answer,
                elapsed: outcome.elapsed,
                details: AnswerDetails {
                    matched_rule: outcome.matched_rule.map(str::to_string),
                    rules_evaluated: outcome.rules_evaluated,
                    active_rules: self.active_rules(question),
                },
            },
            Err(payload) => AnswerResult {
                question: question.to_string(),
                text: format!("❌ Error: {}", panic_message(payload.as_ref())),
                elapsed: Duration::ZERO,
                details: AnswerDetails {
                    matched_rule: None,
                    rules_evaluated: 0,
                    active_rules: Vec::new(),
                },
            },
        }
    }

    /// Drop the cached table and re-query the store (e.g. after an import).
    pub fn reload(&self) {
        self.dataset.reload();
    }

    /// Names of rules whose gates pass for `question`. Diagnostics only.
    pub fn active_rules(&self, question: &str) -> Vec<String> {
        self.router.active_rule_names(question).into_iter().map(str::to_string).collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal handler failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DATA_UNAVAILABLE;
    use crate::table::{Order, Table};
    use chrono::NaiveDate;

    fn order(year: i32, month: u32, day: u32, supplier: &str, item: &str, total: f64) -> Order {
        let mut order = Order::new(NaiveDate::from_ymd_opt(year, month, day).unwrap());
        order.supplier_name = Some(supplier.to_string());
        order.item_name = Some(item.to_string());
        order.total_price = Some(total);
        order
    }

    fn assistant() -> Assistant {
        let table = Table::from_rows(vec![
            order(2014, 3, 10, "acme", "Paper", 100.0),
            order(2014, 6, 2, "acme", "Pens", 50.0),
            order(2013, 9, 21, "globex", "Paper", 200.0),
        ]);
        Assistant::from_dataset(Dataset::fixed(table), Options::default())
    }

    #[test]
    fn counts_orders_in_a_year() {
        assert_eq!(assistant().answer("How many orders were placed in 2014?"), "📦 Total orders in 2014: **2**");
    }

    #[test]
    fn out_of_window_years_count_zero() {
        assert_eq!(assistant().answer("how many orders were placed in 2011?"), "📦 Total orders in 2011: **0**");
    }

    #[test]
    fn sums_item_spending_in_a_year() {
        let text = assistant().answer("total spending on paper in 2014");
        assert_eq!(text, "💸 Total spending on Paper in 2014: **$100.00**");
    }

    #[test]
    fn ranks_suppliers_by_spend_across_all_years() {
        // Globex sums to 200 over all years, Acme to 150.
        let text = assistant().answer("top 1 suppliers by total spend");
        assert_eq!(text, "🏆 Top 1 suppliers overall:\n1. Globex: $200.00");
    }

    #[test]
    fn unrecognized_questions_get_the_fallback() {
        let text = assistant().answer("what is the weather today?");
        assert!(text.starts_with("❌ I didn't understand your question. Try one of these:"));
        assert_eq!(text.lines().filter(|l| l.starts_with("- ")).count(), 3);
    }

    #[test]
    fn empty_dataset_always_reports_data_unavailable() {
        let empty = Assistant::from_dataset(Dataset::fixed(Table::empty()), Options::default());
        for question in [
            "how many orders were placed in 2014?",
            "top 3 suppliers by total spend",
            "what is the weather today?",
        ] {
            assert_eq!(empty.answer(question), DATA_UNAVAILABLE);
        }
    }

    #[test]
    fn verbose_answers_carry_routing_details() {
        let result = assistant().answer_verbose("How many orders were placed in 2014?");
        assert_eq!(result.details.matched_rule.as_deref(), Some("order count in a year"));
        assert!(result.details.rules_evaluated >= 1);
        assert!(
            result.details.active_rules.iter().any(|name| name == "order count in a year"),
        );
    }

    #[test]
    fn substring_matching_ignores_question_case() {
        let a = assistant();
        assert_eq!(
            a.answer("how many orders from ACME in 2014"),
            a.answer("how many orders from acme in 2014"),
        );
    }
}

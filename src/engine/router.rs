//! The routing interpreter loop.
//!
//! `Router::route` walks the rule list in declaration order and returns the
//! first answer a handler produces. Three gate checks run before a rule's
//! patterns are tried, cheapest first:
//!
//! 1. buckets: the question must have every bucket the rule demands;
//! 2. required phrases: all must be contained in the question (AND);
//! 3. optional phrases: at least one must be contained, if any are declared
//!    (OR).
//!
//! A rule whose gates and pattern both match may still decline by returning
//! `None` (e.g. a captured word fails month validation); evaluation then
//! continues with later rules. Whether a matched-but-empty result declines or
//! answers with a "no results" message is decided per rule, not globally.

use std::time::{Duration, Instant};

use tracing::debug;

use super::trigger::{BucketMask, TriggerInfo};
use crate::table::Table;
use crate::{MatchCtx, Options, Rule};

/// The canonical "data unavailable" answer: an empty table means the load
/// degraded, not that zero rows matched.
pub(crate) const DATA_UNAVAILABLE: &str =
    "⚠️ Could not load data. Please check database connection.";

const FALLBACK_SUGGESTIONS: &[&str] = &[
    "Try asking about orders in a specific year or quarter",
    "Ask about spending by supplier or department",
    "Query about most frequently purchased items",
    "Ask 'Which supplier had the most orders?'",
    "Try 'What was the total spending in 2014?'",
];

/// Outcome of routing one question.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub answer: String,
    pub matched_rule: Option<&'static str>,
    /// Rules whose gates and pattern matched (including ones that declined).
    pub rules_evaluated: usize,
    pub elapsed: Duration,
}

pub struct Router {
    rules: Vec<Rule>,
}

impl Router {
    pub fn new(rules: Vec<Rule>) -> Router {
        Router { rules }
    }

    /// Route `question` against `table`. Total: every path returns text.
    pub fn route(&self, question: &str, table: &Table, options: &Options) -> RouteOutcome {
        let started = Instant::now();
        let normalized = normalize(question);

        if table.is_empty() {
            return RouteOutcome {
                answer: DATA_UNAVAILABLE.to_string(),
                matched_rule: None,
                rules_evaluated: 0,
                elapsed: started.elapsed(),
            };
        }

        let trigger = TriggerInfo::scan(&normalized);
        let mut evaluated = 0usize;

        for rule in &self.rules {
            if !gates_pass(rule, &normalized, &trigger) {
                continue;
            }
            let Some(groups) = capture(rule, &normalized) else { continue };
            evaluated += 1;

            let ctx = MatchCtx { question: &normalized, groups, table };
            match (rule.handler)(&ctx) {
                Some(answer) => {
                    if options.trace_rules {
                        debug!(rule = rule.name, "rule answered");
                    }
                    return RouteOutcome {
                        answer,
                        matched_rule: Some(rule.name),
                        rules_evaluated: evaluated,
                        elapsed: started.elapsed(),
                    };
                }
                None => {
                    if options.trace_rules {
                        debug!(rule = rule.name, "rule matched but declined; falling through");
                    }
                }
            }
        }

        RouteOutcome {
            answer: fallback(),
            matched_rule: None,
            rules_evaluated: evaluated,
            elapsed: started.elapsed(),
        }
    }

    /// Names of rules whose gates pass for `question`. Diagnostics only.
    pub fn active_rule_names(&self, question: &str) -> Vec<&'static str> {
        let normalized = normalize(question);
        let trigger = TriggerInfo::scan(&normalized);
        self.rules
            .iter()
            .filter(|rule| gates_pass(rule, &normalized, &trigger))
            .map(|rule| rule.name)
            .collect()
    }
}

fn normalize(question: &str) -> String {
    question.trim().to_lowercase()
}

fn gates_pass(rule: &Rule, question: &str, trigger: &TriggerInfo) -> bool {
    let required = BucketMask::from_bits_truncate(rule.buckets);
    if !trigger.buckets.contains(required) {
        return false;
    }
    if !rule.required_phrases.iter().all(|phrase| question.contains(phrase)) {
        return false;
    }
    if !rule.optional_phrases.is_empty()
        && !rule.optional_phrases.iter().any(|phrase| question.contains(phrase))
    {
        return false;
    }
    true
}

/// Try the rule's alternative patterns in order; the first match supplies the
/// capture groups. Groups that did not participate become empty strings.
fn capture(rule: &Rule, question: &str) -> Option<Vec<String>> {
    if rule.patterns.is_empty() {
        return Some(Vec::new());
    }
    for pattern in &rule.patterns {
        if let Some(caps) = pattern.captures(question) {
            return Some(
                caps.iter()
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect(),
            );
        }
    }
    None
}

fn fallback() -> String {
    format!(
        "❌ I didn't understand your question. Try one of these:\n\n- {}",
        FALLBACK_SUGGESTIONS[..3].join("\n- ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Order;
    use chrono::NaiveDate;

    fn rule_named(name: &'static str, answer: Option<&'static str>) -> Rule {
        rule! {
            name: name,
            patterns: [],
            answer: |_ctx: &MatchCtx| -> Option<String> { answer.map(str::to_string) },
        }
    }

    fn one_row_table() -> Table {
        Table::from_rows(vec![Order::new(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap())])
    }

    #[test]
    fn empty_table_short_circuits_before_any_rule() {
        let router = Router::new(vec![rule_named("always", Some("hit"))]);
        let outcome = router.route("anything", &Table::empty(), &Options::default());
        assert_eq!(outcome.answer, DATA_UNAVAILABLE);
        assert_eq!(outcome.matched_rule, None);
        assert_eq!(outcome.rules_evaluated, 0);
    }

    #[test]
    fn first_answering_rule_wins() {
        let router = Router::new(vec![
            rule_named("declines", None),
            rule_named("answers", Some("first")),
            rule_named("shadowed", Some("second")),
        ]);
        let outcome = router.route("q", &one_row_table(), &Options::default());
        assert_eq!(outcome.answer, "first");
        assert_eq!(outcome.matched_rule, Some("answers"));
        assert_eq!(outcome.rules_evaluated, 2);
    }

    #[test]
    fn phrase_gates_are_and_over_required_or_over_optional() {
        let gated = rule! {
            name: "gated",
            patterns: [],
            required_phrases: ["orders", "supplier"],
            optional_phrases: ["most", "highest"],
            answer: |_ctx: &MatchCtx| -> Option<String> { Some("gated".to_string()) },
        };
        let router = Router::new(vec![gated]);
        let table = one_row_table();

        let hit = router.route("which supplier had the most orders", &table, &Options::default());
        assert_eq!(hit.answer, "gated");

        // Missing a required phrase.
        let miss = router.route("which vendor had the most orders", &table, &Options::default());
        assert_eq!(miss.matched_rule, None);

        // No optional phrase present.
        let miss = router.route("orders by supplier", &table, &Options::default());
        assert_eq!(miss.matched_rule, None);
    }

    #[test]
    fn bucket_gates_skip_rules_without_running_patterns() {
        let bucketed = rule! {
            name: "needs digits",
            patterns: [regex!(r"(\d+)")],
            buckets: BucketMask::HAS_DIGITS.bits(),
            answer: |ctx: &MatchCtx| -> Option<String> { ctx.group(1).map(str::to_string) },
        };
        let router = Router::new(vec![bucketed]);
        let table = one_row_table();

        assert_eq!(router.route("give me 42", &table, &Options::default()).answer, "42");
        assert!(router.active_rule_names("no numbers here").is_empty());
    }

    #[test]
    fn unmatched_questions_fall_back_to_suggestions() {
        let router = Router::new(vec![rule_named("declines", None)]);
        let outcome = router.route("what is the weather today?", &one_row_table(), &Options::default());
        assert!(outcome.answer.starts_with("❌ I didn't understand your question."));
        assert_eq!(outcome.matched_rule, None);
    }

    #[test]
    fn capture_falls_through_to_alternate_patterns() {
        let alternates = rule! {
            name: "alternates",
            patterns: [regex!(r"alpha (\w+)"), regex!(r"beta (\w+)")],
            answer: |ctx: &MatchCtx| -> Option<String> { ctx.group(1).map(str::to_string) },
        };
        let router = Router::new(vec![alternates]);
        let outcome = router.route("beta two", &one_row_table(), &Options::default());
        assert_eq!(outcome.answer, "two");
    }
}

extern crate self as ordsmed;

use regex::Regex;

#[macro_use]
mod macros;
mod api;
mod engine;
mod format;
mod loader;
mod rules;
mod store;
mod table;

pub use api::{AnswerDetails, AnswerResult, Assistant, Options};
pub use format::{format_currency, parse_amount, title_case};
pub use loader::Dataset;
pub use store::{RawRecord, SqliteStore, StaticStore, Store, StoreError};
pub use table::{CalCard, Order, Table};

// --- Internal types ---------------------------------------------------------

/// Context handed to a rule handler once the rule's gates and one of its
/// patterns have matched.
pub(crate) struct MatchCtx<'a> {
    /// The normalized (trimmed, lowercased) question text.
    pub question: &'a str,
    /// Capture groups from the first pattern that matched; index 0 is the
    /// whole match. Groups that did not participate are empty strings. Empty
    /// for phrase-only rules.
    pub groups: Vec<String>,
    /// The cached order table the handler aggregates over. Never empty: the
    /// router answers "data unavailable" before any rule runs.
    pub table: &'a Table,
}

impl MatchCtx<'_> {
    /// Capture group `idx`, or `None` when the group did not participate.
    pub fn group(&self, idx: usize) -> Option<&str> {
        self.groups.get(idx).map(String::as_str).filter(|s| !s.is_empty())
    }
}

pub(crate) type Handler = Box<dyn Fn(&MatchCtx) -> Option<String> + Send + Sync>;

/// A routing rule: activation gates, alternative capture patterns and an
/// answer handler.
///
/// Rules are evaluated in the order `rules::all()` lists them; the first
/// handler to produce an answer wins. A handler may return `None` to fall
/// through to later rules (e.g. when a captured word turns out not to be a
/// month name).
pub(crate) struct Rule {
    pub name: &'static str,
    /// Alternative capture patterns, tried in order against the normalized
    /// question; the first that matches supplies the handler's groups. An
    /// empty list means the rule is gated by phrases alone.
    pub patterns: Vec<&'static Regex>,
    /// Required phrases - ALL must appear in the question (AND logic).
    pub required_phrases: &'static [&'static str],
    /// Optional phrases - ANY one must appear in the question (OR logic).
    pub optional_phrases: &'static [&'static str],
    /// Bucket mask - rule is skipped unless the question has these buckets.
    pub buckets: u32,
    /// Computes the answer over the cached table.
    pub handler: Handler,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("required_phrases", &self.required_phrases)
            .field("optional_phrases", &self.optional_phrases)
            .field("buckets", &self.buckets)
            .field("handler", &"<function>")
            .finish()
    }
}

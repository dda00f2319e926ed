use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Full month names to month numbers. Abbreviations are deliberately absent:
/// rules that capture a month word validate it against this table and fall
/// through when it is not a month.
pub(crate) static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
    ])
});

pub(crate) fn month_number(name: &str) -> Option<u32> {
    MONTHS.get(name).copied()
}

/// Uppercase the first letter ("july" -> "July").
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The first `in <year>` occurrence, for rules where the year is an optional
/// refinement ("top 5 suppliers by total spend in 2014").
pub(crate) fn year_after_in(question: &str) -> Option<i32> {
    regex!(r"in (\d{4})").captures(question)?.get(1)?.as_str().parse().ok()
}

/// Every 4-digit year of this century mentioned in `text`, in order of
/// appearance (duplicates kept).
pub(crate) fn years_in(text: &str) -> Vec<i32> {
    regex!(r"\b(20\d{2})\b")
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// The question text after the first occurrence of `phrase`, trimmed.
pub(crate) fn after_phrase<'a>(question: &'a str, phrase: &str) -> Option<&'a str> {
    question.split_once(phrase).map(|(_, rest)| rest.trim()).filter(|rest| !rest.is_empty())
}

/// Strip a possessive or plural suffix from an item query ("pens" -> "pen").
pub(crate) fn strip_plural(query: &str) -> String {
    let q = query.trim();
    let q = q.strip_suffix("'s").unwrap_or(q);
    let q = q.strip_suffix('s').unwrap_or(q);
    q.trim().to_string()
}

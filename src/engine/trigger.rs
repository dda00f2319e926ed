//! Trigger scanning (question pre-classification).
//!
//! One pass over the normalized question produces coarse buckets that let the
//! router skip rules which cannot possibly match (a rule whose pattern
//! demands a 4-digit number never runs against a digit-free question).
//!
//! This is a heuristic gate, not a matcher: false positives are fine because
//! the rule's own pattern still has to match. A bucket must only ever be
//! attached to a rule whose pattern makes it a necessary condition, otherwise
//! gating would change routing semantics.

bitflags::bitflags! {
    /// Coarse buckets for fast question classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BucketMask: u32 {
        const HAS_DIGITS = 1 << 0;
        const HAS_YEAR   = 1 << 1;
        const MONTHISH   = 1 << 2;
    }
}

/// Question characteristics detected by the scan.
#[derive(Debug, Clone)]
pub struct TriggerInfo {
    pub buckets: BucketMask,
}

impl TriggerInfo {
    /// Scan the (already lowercased) question for coarse buckets.
    pub fn scan(question: &str) -> TriggerInfo {
        let mut buckets = BucketMask::empty();

        if question.bytes().any(|b| b.is_ascii_digit()) {
            buckets |= BucketMask::HAS_DIGITS;
            if regex!(r"\b20\d{2}\b").is_match(question) {
                buckets |= BucketMask::HAS_YEAR;
            }
        }

        // Full month names only: the date rules validate captured words
        // against the same table, so abbreviations would never be accepted
        // downstream anyway.
        const MONTHS: &[&str] = &[
            "january",
            "february",
            "march",
            "april",
            "may",
            "june",
            "july",
            "august",
            "september",
            "october",
            "november",
            "december",
        ];
        for month in MONTHS {
            if question
                .split_whitespace()
                .any(|w| w.trim_matches(|c: char| !c.is_alphabetic()) == *month)
            {
                buckets |= BucketMask::MONTHISH;
                break;
            }
        }

        TriggerInfo { buckets }
    }
}

//! Question routing engine.
//!
//! Answering a question is a short, deterministic pipeline:
//!
//! ```text
//! rules::all()  ──────────────┐
//!                             │
//! question ── normalize ──────┼─ TriggerInfo::scan   (trigger.rs)
//!            (lowercase)      │    buckets: digits / year / month
//!                             v
//!                   Router::route             (router.rs)
//!                     - walk rules in declaration order
//!                     - gate: buckets + required/optional phrases
//!                     - match: alternative capture patterns
//!                     - run handler; None falls through
//!                             │
//!                             v
//!                     answer text (first win, or the fallback)
//! ```
//!
//! The rule order is load-bearing: specific intents ("top N suppliers by
//! total spend in YEAR") are declared before the general ones that would
//! otherwise shadow them ("how many orders in YEAR"). The router never
//! reorders; it only skips rules whose gates fail.
//!
//! ## Responsibilities by module
//!
//! - `trigger.rs`: one cheap scan of the question producing coarse buckets
//!   used to discard rules that cannot match.
//! - `router.rs`: the interpreter loop plus the data-unavailable and
//!   fallback answers.
//!
//! ## Adding new rules
//!
//! New rules go under `src/rules/**` and are spliced into `rules::all()` at
//! the position their specificity demands. If a rule needs a new coarse
//! trigger, add a `BucketMask` bit and teach `TriggerInfo::scan` to set it.

#[path = "engine/router.rs"]
mod router;
#[path = "engine/trigger.rs"]
mod trigger;

#[allow(unused_imports)]
pub(crate) use router::{DATA_UNAVAILABLE, RouteOutcome, Router};
#[allow(unused_imports)]
pub(crate) use trigger::{BucketMask, TriggerInfo};

//! Leave workflow core: day-count calculator, policy rules, balance ledger,
//! application state machine and the access scope resolver.

use chrono::{Datelike, Utc};

pub mod category;
pub mod ledger;
pub mod rules;
pub mod scope;
pub mod workflow;

/// Balances are attributed to the calendar year an operation happens in;
/// carry-over across years is out of scope.
pub fn current_year() -> i16 {
    Utc::now().year() as i16
}

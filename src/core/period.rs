//! Budget period arithmetic - pure coverage-window calculations.
//!
//! `derive_end_date` runs exactly once, at budget creation. Updates never
//! recompute the end date, even when the period changes; that asymmetry is a
//! deliberate contract of the budget lifecycle.

use crate::entities::{BudgetPeriod, budget};
use chrono::{Days, Months, NaiveDate};

/// Derives a budget's end date from its period kind and start date.
///
/// Fixed periods advance the start date by the unit, following calendar
/// month-length rules (Jan 31 + 1 month is the last day of February). For
/// [`BudgetPeriod::Custom`] the supplied end date is passed through unchanged.
///
/// Returns `None` only for CUSTOM without a supplied date, or when the
/// advanced date would fall outside chrono's representable range. Callers
/// decide how to report that.
pub fn derive_end_date(
    period: BudgetPeriod,
    start_date: NaiveDate,
    supplied_end_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    match period {
        BudgetPeriod::Weekly => start_date.checked_add_days(Days::new(7)),
        BudgetPeriod::Monthly => start_date.checked_add_months(Months::new(1)),
        BudgetPeriod::Quarterly => start_date.checked_add_months(Months::new(3)),
        BudgetPeriod::Yearly => start_date.checked_add_months(Months::new(12)),
        BudgetPeriod::Custom => supplied_end_date,
    }
}

/// Whether a budget is currently in force on the given day.
///
/// True iff the active flag is set and `today` lies within the coverage
/// window, inclusive on both ends.
pub fn is_currently_active(budget: &budget::Model, today: NaiveDate) -> bool {
    budget.is_active && budget.start_date <= today && today <= budget.end_date
}

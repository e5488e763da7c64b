//! Budget usage accounting - spent, remaining, and percent-used figures.
//!
//! Usage is derived state: the sum of the owner's transactions in the
//! budget's category and coverage window, measured against the allowance.
//! Both queries are read-only and return the same answer until the
//! underlying transactions or budgets change.

use crate::{
    core::transaction::sum_amount_in_window,
    entities::budget,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::prelude::*;
use serde::Serialize;

/// Usage figures for one budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    /// The budget being measured
    pub budget: budget::Model,
    /// Name of the budget's category
    pub category_name: String,
    /// Sum of in-window transaction amounts for the budget's category
    pub spent: Decimal,
    /// Allowance minus spent; negative when overspent, never clamped
    pub remaining: Decimal,
    /// `spent / amount * 100`, rounded half-up to two decimal places
    pub percent_used: Decimal,
}

async fn usage_for_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    budget: budget::Model,
) -> Result<BudgetUsage> {
    // amount > 0 is enforced at creation; a zero here is corrupt data and
    // must not reach the division below
    if budget.amount <= Decimal::ZERO {
        return Err(Error::InvalidRequest {
            message: format!("budget {} has a non-positive amount", budget.id),
        });
    }

    let category = crate::core::category::get_category(db, owner_id, budget.category_id)
        .await?
        .ok_or(Error::CategoryNotFound {
            id: budget.category_id,
        })?;

    let spent = sum_amount_in_window(
        db,
        owner_id,
        budget.category_id,
        budget.start_date,
        budget.end_date,
    )
    .await?;

    let remaining = budget.amount - spent;
    let percent_used = (spent * Decimal::ONE_HUNDRED / budget.amount)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(BudgetUsage {
        budget,
        category_name: category.name,
        spent,
        remaining,
        percent_used,
    })
}

/// Computes usage figures for one of the owner's budgets.
pub async fn usage_for(
    db: &DatabaseConnection,
    owner_id: i64,
    budget_id: i64,
) -> Result<BudgetUsage> {
    let budget = crate::core::budget::get_budget(db, owner_id, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    usage_for_budget(db, owner_id, budget).await
}

/// Computes usage figures for every budget the owner holds, each budget
/// measured independently.
pub async fn usage_for_all(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<BudgetUsage>> {
    let budgets = crate::core::budget::list_budgets(db, owner_id).await?;

    let mut usages = Vec::with_capacity(budgets.len());
    for budget in budgets {
        usages.push(usage_for_budget(db, owner_id, budget).await?);
    }
    Ok(usages)
}

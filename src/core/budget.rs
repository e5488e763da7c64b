//! Budget lifecycle commands and queries.
//!
//! Create derives the coverage window once (see [`crate::core::period`]);
//! update never re-derives it, even when the period changes. Activate and
//! deactivate are idempotent: when the flag already matches the requested
//! state the store is not written at all, and the unchanged row is returned.
//! At most one active budget may cover a given category and window at a time.

use crate::{
    core::period,
    entities::{Budget, BudgetPeriod, budget},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Partial update for a budget. `None` fields are left untouched. The end
/// date changes only when supplied explicitly; it is never recomputed from
/// the period here.
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    /// Reassign to this category (re-validated against the owner)
    pub category_id: Option<i64>,
    /// New allowance, validated like at creation
    pub amount: Option<Decimal>,
    /// New period kind (does not touch the window)
    pub period: Option<BudgetPeriod>,
    /// New window start
    pub start_date: Option<NaiveDate>,
    /// New window end
    pub end_date: Option<NaiveDate>,
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidRequest {
            message: format!("budget amount must be positive, got {amount}"),
        });
    }
    if amount != amount.round_dp(2) {
        return Err(Error::InvalidRequest {
            message: format!(
                "budget amount cannot have more than two decimal places, got {amount}"
            ),
        });
    }
    Ok(())
}

/// Finds a budget by `(id, owner)`, returning `None` on a miss or when the
/// row belongs to a different owner.
pub async fn get_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    budget_id: i64,
) -> Result<Option<budget::Model>> {
    Budget::find_by_id(budget_id)
        .filter(budget::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all of the owner's budgets, most recent window first.
pub async fn list_budgets(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<budget::Model>> {
    Budget::find()
        .filter(budget::Column::UserId.eq(owner_id))
        .order_by_desc(budget::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's budgets whose active flag is set.
pub async fn list_active_budgets(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<budget::Model>> {
    Budget::find()
        .filter(budget::Column::UserId.eq(owner_id))
        .filter(budget::Column::IsActive.eq(true))
        .order_by_desc(budget::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's budgets for one category.
pub async fn list_budgets_by_category(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
) -> Result<Vec<budget::Model>> {
    Budget::find()
        .filter(budget::Column::UserId.eq(owner_id))
        .filter(budget::Column::CategoryId.eq(category_id))
        .order_by_desc(budget::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rejects the requested window when another active budget for the same
/// category intersects it. `exclude_budget_id` skips the budget being
/// modified so it never conflicts with itself.
async fn ensure_no_overlap(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude_budget_id: Option<i64>,
) -> Result<()> {
    let mut query = Budget::find()
        .filter(budget::Column::UserId.eq(owner_id))
        .filter(budget::Column::CategoryId.eq(category_id))
        .filter(budget::Column::IsActive.eq(true))
        .filter(budget::Column::StartDate.lte(end_date))
        .filter(budget::Column::EndDate.gte(start_date));
    if let Some(id) = exclude_budget_id {
        query = query.filter(budget::Column::Id.ne(id));
    }

    if let Some(existing) = query.one(db).await? {
        return Err(Error::OverlappingBudget {
            message: format!(
                "an active budget already covers this category from {} to {}",
                existing.start_date, existing.end_date
            ),
        });
    }
    Ok(())
}

/// Creates a budget for the owner.
///
/// The category is looked up scoped to the owner. For fixed periods the end
/// date is derived from the start date; for CUSTOM it must be supplied. The
/// new budget starts out active.
pub async fn create_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    amount: Decimal,
    budget_period: BudgetPeriod,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<budget::Model> {
    validate_amount(amount)?;

    crate::core::category::get_category(db, owner_id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let end_date = period::derive_end_date(budget_period, start_date, end_date).ok_or_else(
        || Error::InvalidRequest {
            message: "an end date is required for a custom-period budget".to_string(),
        },
    )?;

    if end_date < start_date {
        return Err(Error::InvalidRequest {
            message: format!("end date {end_date} is before start date {start_date}"),
        });
    }

    ensure_no_overlap(db, owner_id, category_id, start_date, end_date, None).await?;

    let now = chrono::Utc::now();
    let model = budget::ActiveModel {
        user_id: Set(owner_id),
        category_id: Set(category_id),
        amount: Set(amount),
        start_date: Set(start_date),
        end_date: Set(end_date),
        period: Set(budget_period),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(owner_id, budget = created.id, category = category_id, "created budget");
    Ok(created)
}

/// Applies a partial update to one of the owner's budgets.
///
/// A supplied category is re-validated against the owner. Changing the period
/// does not recompute the end date; the window only moves when start or end
/// dates are supplied explicitly, and the resulting window must still be
/// well-formed and overlap-free while the budget is active.
pub async fn update_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    budget_id: i64,
    changes: BudgetUpdate,
) -> Result<budget::Model> {
    let budget = get_budget(db, owner_id, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    if let Some(category_id) = changes.category_id {
        crate::core::category::get_category(db, owner_id, category_id)
            .await?
            .ok_or(Error::CategoryNotFound { id: category_id })?;
    }

    if let Some(amount) = changes.amount {
        validate_amount(amount)?;
    }

    let effective_category = changes.category_id.unwrap_or(budget.category_id);
    let effective_start = changes.start_date.unwrap_or(budget.start_date);
    let effective_end = changes.end_date.unwrap_or(budget.end_date);

    if effective_end < effective_start {
        return Err(Error::InvalidRequest {
            message: format!(
                "end date {effective_end} is before start date {effective_start}"
            ),
        });
    }

    if budget.is_active {
        ensure_no_overlap(
            db,
            owner_id,
            effective_category,
            effective_start,
            effective_end,
            Some(budget.id),
        )
        .await?;
    }

    let mut model: budget::ActiveModel = budget.into();
    if let Some(category_id) = changes.category_id {
        model.category_id = Set(category_id);
    }
    if let Some(amount) = changes.amount {
        model.amount = Set(amount);
    }
    if let Some(budget_period) = changes.period {
        model.period = Set(budget_period);
    }
    if let Some(start_date) = changes.start_date {
        model.start_date = Set(start_date);
    }
    if let Some(end_date) = changes.end_date {
        model.end_date = Set(end_date);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes one of the owner's budgets.
pub async fn delete_budget(db: &DatabaseConnection, owner_id: i64, budget_id: i64) -> Result<()> {
    let budget = get_budget(db, owner_id, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    budget.delete(db).await?;
    Ok(())
}

/// Sets a budget's active flag.
///
/// When the flag already matches, the row is returned as-is and the store is
/// not written; that no-op is part of the contract, not an optimization.
/// Activation re-checks the overlap rule because the budget rejoins the pool
/// of active windows.
async fn set_active(
    db: &DatabaseConnection,
    owner_id: i64,
    budget_id: i64,
    active: bool,
) -> Result<budget::Model> {
    let budget = get_budget(db, owner_id, budget_id)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })?;

    if budget.is_active == active {
        return Ok(budget);
    }

    if active {
        ensure_no_overlap(
            db,
            owner_id,
            budget.category_id,
            budget.start_date,
            budget.end_date,
            Some(budget.id),
        )
        .await?;
    }

    let mut model: budget::ActiveModel = budget.into();
    model.is_active = Set(active);
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Activates one of the owner's budgets. Idempotent; see [`set_active`].
pub async fn activate_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    budget_id: i64,
) -> Result<budget::Model> {
    set_active(db, owner_id, budget_id, true).await
}

/// Deactivates one of the owner's budgets. Idempotent; see [`set_active`].
pub async fn deactivate_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    budget_id: i64,
) -> Result<budget::Model> {
    set_active(db, owner_id, budget_id, false).await
}

//! Transaction business logic - scoped CRUD and range queries.
//!
//! Amounts are strictly positive decimals with at most two fractional digits.
//! Descriptions are trimmed on the way in; a blank description collapses to
//! `None`. Range queries are inclusive on both ends.

use crate::{
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

const DESCRIPTION_MAX_LENGTH: usize = 255;
const DEFAULT_RECENT_LIMIT: u64 = 10;
const MAX_RECENT_LIMIT: u64 = 100;

/// Partial update for a transaction. `None` fields are left untouched;
/// `Some(blank)` for the description clears it.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    /// Reassign to this category (re-validated against the owner)
    pub category_id: Option<i64>,
    /// New amount, validated like at creation
    pub amount: Option<Decimal>,
    /// New description; blank clears the field
    pub description: Option<String>,
    /// New calendar date
    pub transaction_date: Option<NaiveDate>,
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidRequest {
            message: format!("amount must be positive, got {amount}"),
        });
    }
    if amount != amount.round_dp(2) {
        return Err(Error::InvalidRequest {
            message: format!("amount cannot have more than two decimal places, got {amount}"),
        });
    }
    Ok(())
}

fn normalize_description(description: Option<String>) -> Result<Option<String>> {
    match description {
        None => Ok(None),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.len() > DESCRIPTION_MAX_LENGTH {
                return Err(Error::InvalidRequest {
                    message: format!(
                        "description cannot exceed {DESCRIPTION_MAX_LENGTH} characters"
                    ),
                });
            }
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

/// Creates a new ledger entry for the owner.
///
/// The category must exist and belong to the same owner; the amount and
/// description are validated as described in the module docs.
pub async fn create_transaction(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    amount: Decimal,
    description: Option<String>,
    transaction_date: NaiveDate,
) -> Result<transaction::Model> {
    validate_amount(amount)?;
    let description = normalize_description(description)?;

    crate::core::category::get_category(db, owner_id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let now = chrono::Utc::now();
    let model = transaction::ActiveModel {
        user_id: Set(owner_id),
        category_id: Set(category_id),
        amount: Set(amount),
        description: Set(description),
        transaction_date: Set(transaction_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds a transaction by `(id, owner)`, returning `None` on a miss or when
/// the row belongs to a different owner.
pub async fn get_transaction(
    db: &DatabaseConnection,
    owner_id: i64,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all of the owner's transactions, newest date first.
pub async fn list_transactions(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .order_by_desc(transaction::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's newest transactions, at most `limit` of them.
///
/// A missing limit defaults to 10; the limit is clamped to `[1, 100]`.
pub async fn list_recent_transactions(
    db: &DatabaseConnection,
    owner_id: i64,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    let limit = limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);

    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's transactions booked under one category.
pub async fn list_transactions_by_category(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .filter(transaction::Column::CategoryId.eq(category_id))
        .order_by_desc(transaction::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's transactions dated within `[start, end]` inclusive.
pub async fn list_transactions_in_date_range(
    db: &DatabaseConnection,
    owner_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .filter(transaction::Column::TransactionDate.between(start_date, end_date))
        .order_by_desc(transaction::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's transactions with amounts within `[min, max]`
/// inclusive.
pub async fn list_transactions_by_amount_range(
    db: &DatabaseConnection,
    owner_id: i64,
    min_amount: Decimal,
    max_amount: Decimal,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .filter(transaction::Column::Amount.between(min_amount, max_amount))
        .order_by_desc(transaction::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Case-insensitive substring search over the owner's transaction
/// descriptions.
pub async fn search_transactions_by_description(
    db: &DatabaseConnection,
    owner_id: i64,
    term: &str,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .filter(transaction::Column::Description.contains(term))
        .order_by_desc(transaction::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the owner's transaction amounts for one category within a date
/// window, inclusive on both ends. Returns zero when nothing matches.
///
/// This is the aggregation primitive behind budget usage.
pub async fn sum_amount_in_window(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Decimal> {
    let rows = Transaction::find()
        .filter(transaction::Column::UserId.eq(owner_id))
        .filter(transaction::Column::CategoryId.eq(category_id))
        .filter(transaction::Column::TransactionDate.between(start_date, end_date))
        .all(db)
        .await?;

    Ok(rows.iter().map(|t| t.amount).sum())
}

/// Applies a partial update to one of the owner's transactions.
///
/// A supplied category is re-validated against the owner before reassignment,
/// the same scoped lookup as everywhere else.
pub async fn update_transaction(
    db: &DatabaseConnection,
    owner_id: i64,
    transaction_id: i64,
    changes: TransactionUpdate,
) -> Result<transaction::Model> {
    let existing = get_transaction(db, owner_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    if let Some(category_id) = changes.category_id {
        crate::core::category::get_category(db, owner_id, category_id)
            .await?
            .ok_or(Error::CategoryNotFound { id: category_id })?;
    }

    let mut model: transaction::ActiveModel = existing.into();

    if let Some(category_id) = changes.category_id {
        model.category_id = Set(category_id);
    }
    if let Some(amount) = changes.amount {
        validate_amount(amount)?;
        model.amount = Set(amount);
    }
    if changes.description.is_some() {
        model.description = Set(normalize_description(changes.description)?);
    }
    if let Some(transaction_date) = changes.transaction_date {
        model.transaction_date = Set(transaction_date);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes one of the owner's transactions.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    owner_id: i64,
    transaction_id: i64,
) -> Result<()> {
    let transaction = get_transaction(db, owner_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    transaction.delete(db).await?;
    Ok(())
}

/// Duplicates one of the owner's transactions as a new row.
///
/// Category, amount, description, and date are copied verbatim; only the id
/// and row timestamps differ.
pub async fn duplicate_transaction(
    db: &DatabaseConnection,
    owner_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model> {
    let original = get_transaction(db, owner_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let now = chrono::Utc::now();
    let copy = transaction::ActiveModel {
        user_id: Set(original.user_id),
        category_id: Set(original.category_id),
        amount: Set(original.amount),
        description: Set(original.description),
        transaction_date: Set(original.transaction_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    copy.insert(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        let zero =
            create_transaction(&db, owner, category.id, dec!(0.00), None, date(2025, 10, 1)).await;
        assert!(matches!(zero.unwrap_err(), Error::InvalidRequest { .. }));

        let negative =
            create_transaction(&db, owner, category.id, dec!(-5.00), None, date(2025, 10, 1)).await;
        assert!(matches!(negative.unwrap_err(), Error::InvalidRequest { .. }));

        let three_places =
            create_transaction(&db, owner, category.id, dec!(1.005), None, date(2025, 10, 1)).await;
        assert!(matches!(
            three_places.unwrap_err(),
            Error::InvalidRequest { .. }
        ));

        let long_description = create_transaction(
            &db,
            owner,
            category.id,
            dec!(5.00),
            Some("x".repeat(256)),
            date(2025, 10, 1),
        )
        .await;
        assert!(matches!(
            long_description.unwrap_err(),
            Error::InvalidRequest { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_unknown_category() -> Result<()> {
        let (db, owner) = setup_with_user().await?;

        let result = create_transaction(&db, owner, 999, dec!(5.00), None, date(2025, 10, 1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_other_owners_category() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let bobs = create_test_category(&db, bob.id, "Groceries").await?;

        let result =
            create_transaction(&db, alice.id, bobs.id, dec!(5.00), None, date(2025, 10, 1)).await;
        assert!(matches!(result.unwrap_err(), Error::CategoryNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_normalizes_description() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        let trimmed = create_transaction(
            &db,
            owner,
            category.id,
            dec!(5.00),
            Some("  weekly shop  ".to_string()),
            date(2025, 10, 1),
        )
        .await?;
        assert_eq!(trimmed.description.as_deref(), Some("weekly shop"));

        let blank = create_transaction(
            &db,
            owner,
            category.id,
            dec!(5.00),
            Some("   ".to_string()),
            date(2025, 10, 1),
        )
        .await?;
        assert_eq!(blank.description, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_transaction_cross_tenant_is_miss() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let category = create_test_category(&db, alice.id, "Groceries").await?;
        let tx =
            create_test_transaction(&db, alice.id, category.id, dec!(5.00), date(2025, 10, 1))
                .await?;

        assert!(get_transaction(&db, alice.id, tx.id).await?.is_some());
        assert!(get_transaction(&db, bob.id, tx.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_ordered_newest_first() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        let older =
            create_test_transaction(&db, owner, category.id, dec!(5.00), date(2025, 10, 1)).await?;
        let newer =
            create_test_transaction(&db, owner, category.id, dec!(6.00), date(2025, 10, 9)).await?;

        let all = list_transactions(&db, owner).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_recent_transactions_caps_and_orders() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        create_test_transaction(&db, owner, category.id, dec!(1.00), date(2025, 10, 1)).await?;
        let mid =
            create_test_transaction(&db, owner, category.id, dec!(2.00), date(2025, 10, 5)).await?;
        let newest =
            create_test_transaction(&db, owner, category.id, dec!(3.00), date(2025, 10, 9)).await?;

        let recent = list_recent_transactions(&db, owner, Some(2)).await?;
        let ids: Vec<i64> = recent.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![newest.id, mid.id]);

        // Default and over-max limits still return everything when fewer
        // rows exist
        assert_eq!(list_recent_transactions(&db, owner, None).await?.len(), 3);
        assert_eq!(
            list_recent_transactions(&db, owner, Some(5000)).await?.len(),
            3
        );
        // A zero limit is clamped up rather than returning nothing
        assert_eq!(
            list_recent_transactions(&db, owner, Some(0)).await?.len(),
            1
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_in_date_range_inclusive() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        create_test_transaction(&db, owner, category.id, dec!(1.00), date(2025, 9, 30)).await?;
        let on_start =
            create_test_transaction(&db, owner, category.id, dec!(2.00), date(2025, 10, 1)).await?;
        let on_end =
            create_test_transaction(&db, owner, category.id, dec!(3.00), date(2025, 10, 31))
                .await?;
        create_test_transaction(&db, owner, category.id, dec!(4.00), date(2025, 11, 1)).await?;

        let in_range =
            list_transactions_in_date_range(&db, owner, date(2025, 10, 1), date(2025, 10, 31))
                .await?;
        let ids: Vec<i64> = in_range.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![on_end.id, on_start.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_by_amount_range() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        create_test_transaction(&db, owner, category.id, dec!(9.99), date(2025, 10, 1)).await?;
        let mid =
            create_test_transaction(&db, owner, category.id, dec!(50.00), date(2025, 10, 2)).await?;
        create_test_transaction(&db, owner, category.id, dec!(100.01), date(2025, 10, 3)).await?;

        let in_range =
            list_transactions_by_amount_range(&db, owner, dec!(10.00), dec!(100.00)).await?;
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].id, mid.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_search_transactions_by_description() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;

        create_transaction(
            &db,
            owner,
            category.id,
            dec!(12.00),
            Some("Coffee beans".to_string()),
            date(2025, 10, 1),
        )
        .await?;
        create_transaction(
            &db,
            owner,
            category.id,
            dec!(30.00),
            Some("Dinner out".to_string()),
            date(2025, 10, 2),
        )
        .await?;

        let hits = search_transactions_by_description(&db, owner, "coffee").await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description.as_deref(), Some("Coffee beans"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_partial() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;
        let tx =
            create_test_transaction(&db, owner, category.id, dec!(5.00), date(2025, 10, 1)).await?;

        let updated = update_transaction(
            &db,
            owner,
            tx.id,
            TransactionUpdate {
                amount: Some(dec!(7.25)),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.amount, dec!(7.25));
        assert_eq!(updated.category_id, category.id);
        assert_eq!(updated.transaction_date, tx.transaction_date);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_blank_description_clears() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;
        let tx = create_transaction(
            &db,
            owner,
            category.id,
            dec!(5.00),
            Some("weekly shop".to_string()),
            date(2025, 10, 1),
        )
        .await?;

        let updated = update_transaction(
            &db,
            owner,
            tx.id,
            TransactionUpdate {
                description: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.description, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction_rejects_other_owners_category() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let category = create_test_category(&db, alice.id, "Groceries").await?;
        let bobs = create_test_category(&db, bob.id, "Groceries").await?;
        let tx =
            create_test_transaction(&db, alice.id, category.id, dec!(5.00), date(2025, 10, 1))
                .await?;

        let result = update_transaction(
            &db,
            alice.id,
            tx.id,
            TransactionUpdate {
                category_id: Some(bobs.id),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::CategoryNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;
        let tx =
            create_test_transaction(&db, owner, category.id, dec!(5.00), date(2025, 10, 1)).await?;

        delete_transaction(&db, owner, tx.id).await?;
        assert!(get_transaction(&db, owner, tx.id).await?.is_none());

        let again = delete_transaction(&db, owner, tx.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::TransactionNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_transaction() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;
        let original = create_transaction(
            &db,
            owner,
            category.id,
            dec!(5.00),
            Some("weekly shop".to_string()),
            date(2025, 10, 1),
        )
        .await?;

        let copy = duplicate_transaction(&db, owner, original.id).await?;
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.amount, original.amount);
        assert_eq!(copy.description, original.description);
        assert_eq!(copy.transaction_date, original.transaction_date);
        assert_eq!(list_transactions(&db, owner).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_sum_amount_in_window() -> Result<()> {
        let (db, owner, category) = setup_with_category().await?;
        let other = create_test_category(&db, owner, "Travel").await?;

        create_test_transaction(&db, owner, category.id, dec!(150.00), date(2025, 10, 5)).await?;
        create_test_transaction(&db, owner, category.id, dec!(100.00), date(2025, 10, 15)).await?;
        // Outside the window
        create_test_transaction(&db, owner, category.id, dec!(99.00), date(2025, 9, 25)).await?;
        // Different category
        create_test_transaction(&db, owner, other.id, dec!(42.00), date(2025, 10, 10)).await?;

        let sum =
            sum_amount_in_window(&db, owner, category.id, date(2025, 10, 1), date(2025, 10, 31))
                .await?;
        assert_eq!(sum, dec!(250.00));

        let empty =
            sum_amount_in_window(&db, owner, category.id, date(2026, 1, 1), date(2026, 1, 31))
                .await?;
        assert_eq!(empty, Decimal::ZERO);

        Ok(())
    }
}

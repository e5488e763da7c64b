//! Shared test utilities.
//!
//! Common helpers for setting up an in-memory database and creating test
//! entities with sensible defaults.

use crate::{
    core::{budget, category, transaction},
    entities::{BudgetPeriod, CategoryKind, budget as budget_entity, category as category_entity,
        transaction as transaction_entity, user},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for building calendar dates in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a test user. Registration is out of scope for the crate, so this
/// inserts the row directly; the credential is an opaque placeholder.
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("test-hash".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a test expense category with a default color.
pub async fn create_test_category(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<category_entity::Model> {
    category::create_category(
        db,
        owner_id,
        name.to_string(),
        CategoryKind::Expense,
        "#FF6B6B".to_string(),
    )
    .await
}

/// Creates a test category with an explicit polarity.
pub async fn create_custom_category(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
    kind: CategoryKind,
) -> Result<category_entity::Model> {
    category::create_category(db, owner_id, name.to_string(), kind, "#4ECDC4".to_string()).await
}

/// Creates a test transaction with no description.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    amount: Decimal,
    transaction_date: NaiveDate,
) -> Result<transaction_entity::Model> {
    transaction::create_transaction(db, owner_id, category_id, amount, None, transaction_date).await
}

/// Creates a monthly test budget starting on the given date; the end date is
/// derived by the create command.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    amount: Decimal,
    start_date: NaiveDate,
) -> Result<budget_entity::Model> {
    budget::create_budget(
        db,
        owner_id,
        category_id,
        amount,
        BudgetPeriod::Monthly,
        start_date,
        None,
    )
    .await
}

/// Sets up a database with one user. Returns (db, owner id).
pub async fn setup_with_user() -> Result<(DatabaseConnection, i64)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test_user").await?;
    Ok((db, user.id))
}

/// Sets up a database with one user and one expense category named
/// "Groceries". Returns (db, owner id, category).
pub async fn setup_with_category() -> Result<(DatabaseConnection, i64, category_entity::Model)> {
    let (db, owner_id) = setup_with_user().await?;
    let category = create_test_category(&db, owner_id, "Groceries").await?;
    Ok((db, owner_id, category))
}

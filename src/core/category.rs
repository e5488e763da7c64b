//! Category business logic - scoped CRUD, default imports, and the merge
//! command.
//!
//! Every lookup here is keyed by `(id, user_id)` or filtered by `user_id`, so
//! a request for another owner's category is indistinguishable from a miss.
//! The merge command is the one multi-row mutation in the crate and runs
//! inside a single database transaction.

use crate::{
    entities::{Category, CategoryKind, Transaction, category, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

const NAME_MAX_LENGTH: usize = 100;
const COLOR_MAX_LENGTH: usize = 7;

/// Partial update for a category. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    /// New name, validated like at creation
    pub name: Option<String>,
    /// New polarity
    pub kind: Option<CategoryKind>,
    /// New display color, validated like at creation
    pub color: Option<String>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidRequest {
            message: "category name cannot be blank".to_string(),
        });
    }
    if name.len() > NAME_MAX_LENGTH {
        return Err(Error::InvalidRequest {
            message: format!("category name cannot exceed {NAME_MAX_LENGTH} characters"),
        });
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<()> {
    if color.trim().is_empty() {
        return Err(Error::InvalidRequest {
            message: "category color cannot be blank".to_string(),
        });
    }
    if color.len() > COLOR_MAX_LENGTH {
        return Err(Error::InvalidRequest {
            message: format!("category color cannot exceed {COLOR_MAX_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Finds a category by `(id, owner)`, returning `None` on a miss or when the
/// row belongs to a different owner.
///
/// Generic over the connection so the merge command can reuse it inside its
/// database transaction.
pub async fn get_category<C>(
    db: &C,
    owner_id: i64,
    category_id: i64,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all of the owner's categories, ordered alphabetically by name.
pub async fn list_categories(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(owner_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the owner's categories of one polarity, ordered by name.
pub async fn list_categories_by_kind(
    db: &DatabaseConnection,
    owner_id: i64,
    kind: CategoryKind,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(owner_id))
        .filter(category::Column::Kind.eq(kind))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Case-insensitive substring search over the owner's category names.
pub async fn search_categories_by_name(
    db: &DatabaseConnection,
    owner_id: i64,
    term: &str,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(owner_id))
        .filter(category::Column::Name.contains(term))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new category for the owner after validating name and color.
pub async fn create_category(
    db: &DatabaseConnection,
    owner_id: i64,
    name: String,
    kind: CategoryKind,
    color: String,
) -> Result<category::Model> {
    validate_name(&name)?;
    validate_color(&color)?;

    let now = chrono::Utc::now();
    let model = category::ActiveModel {
        user_id: Set(owner_id),
        name: Set(name.trim().to_string()),
        kind: Set(kind),
        color: Set(color),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Applies a partial update to one of the owner's categories.
///
/// Absent fields are left unchanged. A present-but-blank name or color is
/// rejected rather than ignored; "absent" and "explicitly cleared" stay
/// distinguishable.
pub async fn update_category(
    db: &DatabaseConnection,
    owner_id: i64,
    category_id: i64,
    changes: CategoryUpdate,
) -> Result<category::Model> {
    let category = get_category(db, owner_id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let mut model: category::ActiveModel = category.into();

    if let Some(name) = changes.name {
        validate_name(&name)?;
        model.name = Set(name.trim().to_string());
    }
    if let Some(kind) = changes.kind {
        model.kind = Set(kind);
    }
    if let Some(color) = changes.color {
        validate_color(&color)?;
        model.color = Set(color);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Deletes one of the owner's categories.
pub async fn delete_category(db: &DatabaseConnection, owner_id: i64, category_id: i64) -> Result<()> {
    let category = get_category(db, owner_id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    category.delete(db).await?;
    Ok(())
}

/// Default starter categories seeded by [`import_default_categories`].
const DEFAULT_CATEGORIES: &[(&str, CategoryKind, &str)] = &[
    ("Food & Dining", CategoryKind::Expense, "#FF6B6B"),
    ("Groceries", CategoryKind::Expense, "#4ECDC4"),
    ("Transportation", CategoryKind::Expense, "#45B7D1"),
    ("Gas & Fuel", CategoryKind::Expense, "#96CEB4"),
    ("Entertainment", CategoryKind::Expense, "#FECA57"),
    ("Shopping", CategoryKind::Expense, "#FF9FF3"),
    ("Health & Medical", CategoryKind::Expense, "#54A0FF"),
    ("Insurance", CategoryKind::Expense, "#5F27CD"),
    ("Utilities", CategoryKind::Expense, "#00D2D3"),
    ("Rent/Mortgage", CategoryKind::Expense, "#FF6348"),
    ("Phone & Internet", CategoryKind::Expense, "#2ED573"),
    ("Education", CategoryKind::Expense, "#FFA502"),
    ("Travel", CategoryKind::Expense, "#3742FA"),
    ("Personal Care", CategoryKind::Expense, "#F8B500"),
    ("Subscriptions", CategoryKind::Expense, "#A4B0BE"),
    ("Miscellaneous", CategoryKind::Expense, "#57606F"),
    ("Salary", CategoryKind::Income, "#2ED573"),
    ("Freelance", CategoryKind::Income, "#1DD1A1"),
    ("Business Income", CategoryKind::Income, "#00D2D3"),
    ("Investment Returns", CategoryKind::Income, "#55A3FF"),
    ("Rental Income", CategoryKind::Income, "#26DE81"),
    ("Side Hustle", CategoryKind::Income, "#0FB9B1"),
    ("Gifts", CategoryKind::Income, "#A55EEA"),
    ("Refunds", CategoryKind::Income, "#778CA3"),
    ("Bonus", CategoryKind::Income, "#F8B500"),
    ("Other Income", CategoryKind::Income, "#4B6584"),
];

/// Seeds the default category set for a fresh owner.
///
/// Fails when the owner already has any category, to avoid duplicating the
/// starter set.
pub async fn import_default_categories(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<category::Model>> {
    let existing = list_categories(db, owner_id).await?;
    if !existing.is_empty() {
        return Err(Error::InvalidRequest {
            message: "cannot import default categories when categories already exist".to_string(),
        });
    }

    let now = chrono::Utc::now();
    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (name, kind, color) in DEFAULT_CATEGORIES {
        let model = category::ActiveModel {
            user_id: Set(owner_id),
            name: Set((*name).to_string()),
            kind: Set(*kind),
            color: Set((*color).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(model.insert(db).await?);
    }

    info!(owner_id, count = created.len(), "imported default categories");
    Ok(created)
}

/// Merges one or more source categories into a target category.
///
/// All of each source's transactions are reassigned to the target, then the
/// sources are deleted in one batch. Validation happens before any mutation:
/// every category must exist for the owner, no source may equal the target,
/// and every source must share the target's polarity. The whole operation
/// runs in a single database transaction, so a failure after validation
/// leaves no partial state behind.
pub async fn merge_categories(
    db: &DatabaseConnection,
    owner_id: i64,
    target_category_id: i64,
    source_category_ids: &[i64],
) -> Result<()> {
    if source_category_ids.is_empty() {
        return Err(Error::InvalidRequest {
            message: "at least one source category is required".to_string(),
        });
    }

    let txn = db.begin().await?;

    let target = get_category(&txn, owner_id, target_category_id)
        .await?
        .ok_or(Error::CategoryNotFound {
            id: target_category_id,
        })?;

    let mut sources = Vec::with_capacity(source_category_ids.len());
    for &source_id in source_category_ids {
        let source = get_category(&txn, owner_id, source_id)
            .await?
            .ok_or(Error::CategoryNotFound { id: source_id })?;

        if source.id == target.id {
            return Err(Error::InvalidMerge {
                message: "cannot merge a category with itself".to_string(),
            });
        }
        if source.kind != target.kind {
            return Err(Error::InvalidMerge {
                message: format!(
                    "cannot merge categories of different kinds: category {} is {:?} but target is {:?}",
                    source.id, source.kind, target.kind
                ),
            });
        }
        sources.push(source);
    }

    let now = chrono::Utc::now();
    for source in &sources {
        Transaction::update_many()
            .col_expr(transaction::Column::CategoryId, Expr::value(target.id))
            .col_expr(transaction::Column::UpdatedAt, Expr::value(now))
            .filter(transaction::Column::UserId.eq(owner_id))
            .filter(transaction::Column::CategoryId.eq(source.id))
            .exec(&txn)
            .await?;
    }

    Category::delete_many()
        .filter(category::Column::UserId.eq(owner_id))
        .filter(category::Column::Id.is_in(sources.iter().map(|s| s.id).collect::<Vec<_>>()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        owner_id,
        target = target.id,
        sources = sources.len(),
        "merged categories"
    );
    Ok(())
}

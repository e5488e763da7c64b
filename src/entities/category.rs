//! Category entity - A named bucket for transactions and budgets.
//!
//! Each category belongs to exactly one user and carries a polarity
//! ([`CategoryKind`]) plus a display color. Categories are deleted directly or
//! absorbed into another category via the merge command.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Polarity of a category: money coming in or going out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum CategoryKind {
    /// Money coming in (salary, refunds, ...)
    #[sea_orm(string_value = "INCOME")]
    Income,
    /// Money going out (groceries, rent, ...)
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user; every scoped lookup filters on this
    pub user_id: i64,
    /// Human-readable name (non-blank, at most 100 characters)
    pub name: String,
    /// Income or expense polarity
    pub kind: CategoryKind,
    /// Display color, e.g. `"#FF6B6B"` (non-blank, at most 7 characters)
    pub color: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One category has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One category has many budgets
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

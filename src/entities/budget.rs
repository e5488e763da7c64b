//! Budget entity - A spending allowance for one category over a window.
//!
//! The coverage window is `[start_date, end_date]` inclusive. For non-CUSTOM
//! periods the end date is derived once at creation
//! (see [`crate::core::period`]) and never recomputed; for CUSTOM it is
//! supplied by the caller.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a budget's coverage window is determined.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum BudgetPeriod {
    /// One week from the start date
    #[sea_orm(string_value = "WEEKLY")]
    Weekly,
    /// One calendar month from the start date
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
    /// Three calendar months from the start date
    #[sea_orm(string_value = "QUARTERLY")]
    Quarterly,
    /// One calendar year from the start date
    #[sea_orm(string_value = "YEARLY")]
    Yearly,
    /// Caller-supplied end date, never recomputed
    #[sea_orm(string_value = "CUSTOM")]
    Custom,
}

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user; every scoped lookup filters on this
    pub user_id: i64,
    /// Category whose transactions count against this budget
    pub category_id: i64,
    /// Allowance for the window, strictly positive
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// First day of the coverage window
    pub start_date: Date,
    /// Last day of the coverage window, always >= `start_date`
    pub end_date: Date,
    /// How the window was determined
    pub period: BudgetPeriod,
    /// Toggled by activate/deactivate; defaults to true at creation
    pub is_active: bool,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each budget belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use budget::{
    BudgetPeriod, Column as BudgetColumn, Entity as Budget, Model as BudgetModel,
};
pub use category::{
    CategoryKind, Column as CategoryColumn, Entity as Category, Model as CategoryModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};

//! Core business logic - framework-agnostic commands and queries.
//!
//! Each operation is a small async unit: it takes an explicit owner id
//! (resolved once via [`owner::resolve_owner`]), touches the store only
//! through owner-scoped lookups, applies the domain rules, and returns a
//! model or raises a typed failure from [`crate::errors`].

pub mod budget;
pub mod category;
pub mod owner;
pub mod period;
pub mod transaction;
pub mod usage;

//! Tenant context resolution.
//!
//! Maps an authenticated principal to the owning user's id. Every command and
//! query in [`crate::core`] takes the resolved owner id as an explicit
//! parameter rather than reading ambient security state, so the caller
//! resolves once per request and threads the id through.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::prelude::*;

/// Resolves the current owner from an authenticated principal.
///
/// Fails with [`Error::Unauthenticated`] when no principal is present and
/// [`Error::UserNotFound`] when the principal maps to no known user. Never
/// mutates anything.
pub async fn resolve_owner(db: &DatabaseConnection, principal: Option<&str>) -> Result<i64> {
    let username = principal.ok_or(Error::Unauthenticated)?;

    let user = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            username: username.to_string(),
        })?;

    Ok(user.id)
}

use std::sync::Arc;

use async_graphql::{Context, Error, ErrorExtensions, MaybeUndefined, ID};
use chrono::Utc;
use platform_api::{internal_error, ApiError};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use uuid::Uuid;

use crate::auth::{CurrentUser, HrRole};

const DEFAULT_PAGE: i32 = 50;
const MAX_PAGE: i32 = 200;

pub(crate) fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| ApiError::internal(anyhow::anyhow!("missing database connection")).extend())
}

fn current_user(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    ctx.data::<CurrentUser>()
        .cloned()
        .map_err(|_| ApiError::Unauthenticated.extend())
}

pub(crate) fn require_role(ctx: &Context<'_>, role: HrRole) -> async_graphql::Result<CurrentUser> {
    let user = current_user(ctx)?;
    if user.has_role(role) {
        Ok(user)
    } else {
        Err(ApiError::Forbidden.extend())
    }
}

pub(crate) fn require_viewer(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    require_role(ctx, HrRole::Viewer)
}

pub(crate) fn require_editor(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    require_role(ctx, HrRole::Hr)
}

pub(crate) fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| ApiError::BadRequest.extend())
}

pub(crate) fn parse_optional_id(
    field: &str,
    value: &Option<ID>,
) -> async_graphql::Result<Option<Uuid>> {
    match value {
        Some(id) => Uuid::parse_str(id.as_str())
            .map(Some)
            .map_err(|_| validation_error(format!("Invalid {}", field))),
        None => Ok(None),
    }
}

/// `None` when the field was omitted, `Some(None)` when it was set to null.
pub(crate) fn maybe_id(
    field: &str,
    value: &MaybeUndefined<ID>,
) -> async_graphql::Result<Option<Option<Uuid>>> {
    match value {
        MaybeUndefined::Undefined => Ok(None),
        MaybeUndefined::Null => Ok(Some(None)),
        MaybeUndefined::Value(id) => Uuid::parse_str(id.as_str())
            .map(|uuid| Some(Some(uuid)))
            .map_err(|_| validation_error(format!("Invalid {}", field))),
    }
}

pub(crate) fn maybe_value<T: Copy>(value: &MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(inner) => Some(Some(*inner)),
    }
}

pub(crate) fn id_of(id: Uuid) -> ID {
    ID::from(id.to_string())
}

pub(crate) fn db_error(err: DbErr) -> Error {
    internal_error(err)
}

pub(crate) fn not_found(resource: &'static str) -> Error {
    ApiError::NotFound(resource).extend()
}

pub(crate) fn validation_error(message: impl Into<String>) -> Error {
    ApiError::validation(message).extend()
}

pub(crate) fn conflict_error(message: impl Into<String>) -> Error {
    ApiError::conflict(message).extend()
}

/// Like [`db_error`], but a unique-index violation surfaces as CONFLICT. Covers
/// writes that lose a race against a concurrent insert after their pre-check.
pub(crate) fn write_error(err: DbErr, conflict: impl FnOnce() -> String) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict_error(conflict()),
        _ => db_error(err),
    }
}

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

pub(crate) fn page_bounds(first: Option<i32>, offset: Option<i32>) -> (u64, u64) {
    let limit = first.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE) as u64;
    let skip = offset.unwrap_or(0).max(0) as u64;
    (limit, skip)
}

pub(crate) fn required_text(field: &str, value: &str, max: usize) -> async_graphql::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    validate_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trims the value; blank strings become `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
    max: usize,
) -> async_graphql::Result<Option<String>> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => {
            validate_length(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
        _ => Ok(None),
    }
}

pub(crate) fn optional_email(
    field: &str,
    value: Option<String>,
) -> async_graphql::Result<Option<String>> {
    let Some(email) = optional_text(field, value, 320)? else {
        return Ok(None);
    };
    if !looks_like_email(&email) {
        return Err(validation_error(format!("{} must be a valid email address", field)));
    }
    Ok(Some(email.to_lowercase()))
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

pub(crate) fn validate_length(field: &str, value: &str, max: usize) -> async_graphql::Result<()> {
    if value.chars().count() > max {
        return Err(validation_error(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Share of `part` in `whole` as a percentage rounded to one decimal.
pub(crate) fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 1000.0).round() / 10.0
}

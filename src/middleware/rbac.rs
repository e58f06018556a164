// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::CurrentUser};

/// A permission slug checked against the caller's grants.
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// Extractor that fails unless the authenticated caller holds `T`.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

        let required = T::slug();
        if !user.has_permission(required) {
            tracing::debug!(user_id = %user.id, permission = required, "permission denied");
            return Err(AppError::Forbidden(format!(
                "You need the '{}' permission to perform this action",
                required
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// PERMISSIONS
// ---

pub struct PermVehiclesAccess;
impl PermissionDef for PermVehiclesAccess {
    fn slug() -> &'static str { "vehicles.access" }
}

pub struct PermVehiclesCreate;
impl PermissionDef for PermVehiclesCreate {
    fn slug() -> &'static str { "vehicles.create" }
}

pub struct PermVehiclesEdit;
impl PermissionDef for PermVehiclesEdit {
    fn slug() -> &'static str { "vehicles.edit" }
}

pub struct PermShippingAccess;
impl PermissionDef for PermShippingAccess {
    fn slug() -> &'static str { "shipping.access" }
}

pub struct PermShippingEdit;
impl PermissionDef for PermShippingEdit {
    fn slug() -> &'static str { "shipping.edit" }
}

pub struct PermPurchaseAccess;
impl PermissionDef for PermPurchaseAccess {
    fn slug() -> &'static str { "purchase.access" }
}

pub struct PermPurchaseEdit;
impl PermissionDef for PermPurchaseEdit {
    fn slug() -> &'static str { "purchase.edit" }
}

pub struct PermFinancialAccess;
impl PermissionDef for PermFinancialAccess {
    fn slug() -> &'static str { "financial.access" }
}

pub struct PermFinancialEdit;
impl PermissionDef for PermFinancialEdit {
    fn slug() -> &'static str { "financial.edit" }
}

pub struct PermSalesAccess;
impl PermissionDef for PermSalesAccess {
    fn slug() -> &'static str { "sales.access" }
}

pub struct PermSalesEdit;
impl PermissionDef for PermSalesEdit {
    fn slug() -> &'static str { "sales.edit" }
}

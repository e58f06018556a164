// src/services/catalog_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{MakeRequest, ModelRequest, VehicleMake, VehicleModel},
};

fn name(raw: &str, what: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} name is required", what)));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            repo: CatalogRepository::new(),
        }
    }

    // =========================================================================
    //  MAKES
    // =========================================================================

    pub async fn list_makes(&self, only_active: bool) -> Result<Vec<VehicleMake>, AppError> {
        self.repo.list_makes(&self.pool, only_active).await
    }

    pub async fn get_make(&self, id: i64) -> Result<VehicleMake, AppError> {
        self.repo.get_make(&self.pool, id).await
    }

    pub async fn create_make(&self, req: MakeRequest) -> Result<VehicleMake, AppError> {
        let make_name = name(&req.make_name, "Make")?;
        self.repo
            .insert_make(&self.pool, &make_name, req.is_active.unwrap_or(true))
            .await
    }

    /// `is_active` keeps its stored value when omitted.
    pub async fn update_make(&self, id: i64, req: MakeRequest) -> Result<VehicleMake, AppError> {
        let make_name = name(&req.make_name, "Make")?;
        let is_active = match req.is_active {
            Some(flag) => flag,
            None => self.repo.get_make(&self.pool, id).await?.is_active,
        };
        self.repo.update_make(&self.pool, id, &make_name, is_active).await
    }

    pub async fn delete_make(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete_make(&self.pool, id).await
    }

    // =========================================================================
    //  MODELS
    // =========================================================================

    pub async fn list_models(
        &self,
        make_id: Option<i64>,
        only_active: bool,
    ) -> Result<Vec<VehicleModel>, AppError> {
        self.repo.list_models(&self.pool, make_id, only_active).await
    }

    pub async fn get_model(&self, id: i64) -> Result<VehicleModel, AppError> {
        self.repo.get_model(&self.pool, id).await
    }

    pub async fn create_model(&self, req: ModelRequest) -> Result<VehicleModel, AppError> {
        let model_name = name(&req.model_name, "Model")?;
        self.repo.get_make(&self.pool, req.make_id).await?;
        self.repo
            .insert_model(&self.pool, req.make_id, &model_name, req.is_active.unwrap_or(true))
            .await
    }

    pub async fn update_model(&self, id: i64, req: ModelRequest) -> Result<VehicleModel, AppError> {
        let model_name = name(&req.model_name, "Model")?;
        let current = self.repo.get_model(&self.pool, id).await?;
        if current.make_id != req.make_id {
            self.repo.get_make(&self.pool, req.make_id).await?;
        }
        let is_active = req.is_active.unwrap_or(current.is_active);
        self.repo
            .update_model(&self.pool, id, req.make_id, &model_name, is_active)
            .await
    }

    pub async fn delete_model(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete_model(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(name("  Nissan ", "Make").unwrap(), "Nissan");
        let err = name("   ", "Model").unwrap_err();
        assert_eq!(err.to_string(), "Model name is required");
    }
}

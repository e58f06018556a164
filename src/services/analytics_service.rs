// src/services/analytics_service.rs

//! Grouped counts and cost totals for the back-office dashboard.

use std::collections::BTreeMap;

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        filters::{
            Filter, VehicleBrandFilter, VehicleFinancialFilter, VehiclePurchaseFilter,
            VehicleSalesFilter, VehicleShippingFilter,
        },
    },
    db::{
        VehicleFinancialsRepository, VehiclePurchaseRepository, VehicleRepository,
        VehicleSalesRepository, VehicleShippingRepository,
    },
    models::analytics::{BrandCount, FinancialSummary, StatusCount},
};

/// Brand → count, alphabetical.
pub fn brand_map(rows: Vec<BrandCount>) -> BTreeMap<String, i64> {
    let mut map = BTreeMap::new();
    for row in rows {
        *map.entry(row.brand).or_insert(0) += row.count;
    }
    map
}

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
    vehicles: VehicleRepository,
    shipping: VehicleShippingRepository,
    purchase: VehiclePurchaseRepository,
    sales: VehicleSalesRepository,
    financials: VehicleFinancialsRepository,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            vehicles: VehicleRepository::new(),
            shipping: VehicleShippingRepository::new(),
            purchase: VehiclePurchaseRepository::new(),
            sales: VehicleSalesRepository::new(),
            financials: VehicleFinancialsRepository::new(),
        }
    }

    pub async fn shipping_status(&self, filter: &VehicleShippingFilter) -> Result<Vec<StatusCount>, AppError> {
        let qb = filter.to_builder()?;
        self.shipping.status_counts(&self.pool, &qb).await
    }

    pub async fn purchase_status(&self, filter: &VehiclePurchaseFilter) -> Result<Vec<StatusCount>, AppError> {
        let qb = filter.to_builder()?;
        self.purchase.status_counts(&self.pool, &qb).await
    }

    pub async fn sales_status(&self, filter: &VehicleSalesFilter) -> Result<Vec<StatusCount>, AppError> {
        let qb = filter.to_builder()?;
        self.sales.status_counts(&self.pool, &qb).await
    }

    pub async fn vehicle_brands(&self, filter: &VehicleBrandFilter) -> Result<BTreeMap<String, i64>, AppError> {
        let qb = filter.to_builder()?;
        let rows = self.vehicles.get_vehicle_brand_count(&self.pool, &qb).await?;
        Ok(brand_map(rows))
    }

    pub async fn financial_summary(&self, filter: &VehicleFinancialFilter) -> Result<FinancialSummary, AppError> {
        let qb = filter.to_builder()?;
        self.financials.summary(&self.pool, &qb).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_map_is_sorted_and_merges_duplicates() {
        let rows = vec![
            BrandCount { brand: "Toyota".into(), count: 3 },
            BrandCount { brand: "Honda".into(), count: 2 },
            BrandCount { brand: "Toyota".into(), count: 1 },
        ];
        let map = brand_map(rows);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Honda", "Toyota"]);
        assert_eq!(map["Toyota"], 4);
    }
}

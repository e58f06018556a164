// src/services/vehicle_service.rs

use std::{collections::HashMap, sync::Arc};

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        filters::{Filter, VehicleFilter},
        pagination::{PageParams, Paginated},
    },
    db::{
        VehicleDocumentRepository, VehicleFinancialsRepository, VehicleImageRepository,
        VehiclePurchaseRepository, VehicleRepository, VehicleSalesRepository,
        VehicleShippingRepository,
    },
    models::{
        auth::CurrentUser,
        vehicle::{CreateVehicleRequest, Vehicle, VehicleComplete, VehicleImage, VehicleValues},
    },
    services::{
        notification::{vehicle_ref, Notification, NotificationPriority, NotificationService},
        storage::ObjectStore,
    },
};

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validates enum fields and normalises free text.
pub fn vehicle_values(req: CreateVehicleRequest) -> Result<VehicleValues, AppError> {
    Ok(VehicleValues {
        code: req.code,
        make: req.make.trim().to_string(),
        model: req.model.trim().to_string(),
        trim_level: trimmed(req.trim_level),
        year_of_manufacture: req.year_of_manufacture,
        color: req.color.trim().to_string(),
        mileage_km: req.mileage_km,
        chassis_id: req.chassis_id.trim().to_string(),
        condition_status: req.condition_status.parse()?,
        currency: req.currency.parse()?,
        price_quote: req.price_quote,
        auction_grade: trimmed(req.auction_grade),
        auction_price: req.auction_price,
        cif_value: req.cif_value,
        hs_code: trimmed(req.hs_code),
        registration_number: trimmed(req.registration_number),
        record_date: req.record_date,
        internal_notes: trimmed(req.internal_notes),
        is_featured: req.is_featured,
    })
}

fn vehicle_payload(vehicle: &Vehicle) -> serde_json::Value {
    json!({
        "vehicle_id": vehicle.id,
        "code": vehicle.code,
        "make": vehicle.make,
        "model": vehicle.model,
        "year_of_manufacture": vehicle.year_of_manufacture,
        "chassis_id": vehicle.chassis_id,
    })
}

#[derive(Clone)]
pub struct VehicleService {
    pool: PgPool,
    vehicles: VehicleRepository,
    shipping: VehicleShippingRepository,
    financials: VehicleFinancialsRepository,
    sales: VehicleSalesRepository,
    purchase: VehiclePurchaseRepository,
    images: VehicleImageRepository,
    documents: VehicleDocumentRepository,
    store: Arc<dyn ObjectStore>,
    notifier: NotificationService,
}

impl VehicleService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>, notifier: NotificationService) -> Self {
        Self {
            pool,
            vehicles: VehicleRepository::new(),
            shipping: VehicleShippingRepository::new(),
            financials: VehicleFinancialsRepository::new(),
            sales: VehicleSalesRepository::new(),
            purchase: VehiclePurchaseRepository::new(),
            images: VehicleImageRepository::new(),
            documents: VehicleDocumentRepository::new(),
            store,
            notifier,
        }
    }

    /// Inserts the vehicle and its four default sibling rows atomically.
    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn create(
        &self,
        req: CreateVehicleRequest,
        user: &CurrentUser,
    ) -> Result<VehicleComplete, AppError> {
        let values = vehicle_values(req)?;

        let mut tx = self.pool.begin().await?;

        let vehicle = self.vehicles.insert(&mut *tx, &values).await?;
        let shipping = self.shipping.insert_default(&mut *tx, vehicle.id).await?;
        let financials = self.financials.insert_default(&mut *tx, vehicle.id).await?;
        let sales = self.sales.insert_default(&mut *tx, vehicle.id).await?;
        let purchase = self.purchase.insert_default(&mut *tx, vehicle.id).await?;

        tx.commit().await?;

        tracing::info!(vehicle_id = vehicle.id, chassis_id = %vehicle.chassis_id, "vehicle created");

        self.notifier.dispatch(Notification::new(
            "vehicle_created",
            vehicle_ref(vehicle.id),
            vehicle_payload(&vehicle),
            Some(&user.id),
        ));

        Ok(VehicleComplete {
            vehicle,
            shipping: Some(shipping),
            financials: Some(financials),
            sales: Some(sales),
            purchase: Some(purchase),
            images: Vec::new(),
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<VehicleComplete, AppError> {
        let vehicle = self.vehicles.get_by_id(&self.pool, id).await?;
        let mut assembled = self.assemble(vec![vehicle]).await?;
        assembled
            .pop()
            .ok_or_else(|| AppError::not_found("Vehicle", id))
    }

    pub async fn list(
        &self,
        filter: &VehicleFilter,
        page: PageParams,
    ) -> Result<Paginated<VehicleComplete>, AppError> {
        let qb = filter.to_builder()?;

        let (vehicles, total) = tokio::try_join!(
            self.vehicles.get_all(&self.pool, &qb, page.limit(), page.offset()),
            self.vehicles.count(&self.pool, &qb),
        )?;

        let data = self.assemble(vehicles).await?;
        Ok(Paginated::new(data, page, total))
    }

    /// Batch-loads siblings and images for a page, preserving its order.
    async fn assemble(&self, vehicles: Vec<Vehicle>) -> Result<Vec<VehicleComplete>, AppError> {
        if vehicles.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = vehicles.iter().map(|v| v.id).collect();

        let (shipping, financials, sales, purchase, images) = tokio::try_join!(
            self.shipping.get_by_vehicle_ids(&self.pool, &ids),
            self.financials.get_by_vehicle_ids(&self.pool, &ids),
            self.sales.get_by_vehicle_ids(&self.pool, &ids),
            self.purchase.get_by_vehicle_ids(&self.pool, &ids),
            self.images.get_by_vehicle_ids(&self.pool, &ids),
        )?;

        let mut shipping: HashMap<i64, _> = shipping.into_iter().map(|r| (r.vehicle_id, r)).collect();
        let mut financials: HashMap<i64, _> = financials.into_iter().map(|r| (r.vehicle_id, r)).collect();
        let mut sales: HashMap<i64, _> = sales.into_iter().map(|r| (r.vehicle_id, r)).collect();
        let mut purchase: HashMap<i64, _> = purchase.into_iter().map(|r| (r.vehicle_id, r)).collect();
        let mut images_by_vehicle: HashMap<i64, Vec<VehicleImage>> = HashMap::new();
        for image in images {
            images_by_vehicle.entry(image.vehicle_id).or_default().push(image);
        }

        Ok(vehicles
            .into_iter()
            .map(|vehicle| {
                let id = vehicle.id;
                VehicleComplete {
                    vehicle,
                    shipping: shipping.remove(&id),
                    financials: financials.remove(&id),
                    sales: sales.remove(&id),
                    purchase: purchase.remove(&id),
                    images: images_by_vehicle.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update(
        &self,
        id: i64,
        req: CreateVehicleRequest,
        user: &CurrentUser,
    ) -> Result<Vehicle, AppError> {
        let values = vehicle_values(req)?;
        let vehicle = self.vehicles.update(&self.pool, id, &values).await?;

        self.notifier.dispatch(Notification::new(
            "vehicle_updated",
            vehicle_ref(vehicle.id),
            vehicle_payload(&vehicle),
            Some(&user.id),
        ));

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn set_featured(
        &self,
        id: i64,
        is_featured: bool,
        user: &CurrentUser,
    ) -> Result<Vehicle, AppError> {
        let vehicle = self.vehicles.set_featured(&self.pool, id, is_featured).await?;

        let (kind, priority) = if is_featured {
            ("vehicle_featured", NotificationPriority::High)
        } else {
            ("vehicle_unfeatured", NotificationPriority::Normal)
        };
        self.notifier.dispatch(
            Notification::new(kind, vehicle_ref(vehicle.id), vehicle_payload(&vehicle), Some(&user.id))
                .with_priority(priority),
        );

        Ok(vehicle)
    }

    /// Deletes the vehicle; stored image and document objects are removed
    /// afterwards on a best-effort basis.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete(&self, id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let vehicle = self.vehicles.get_by_id(&self.pool, id).await?;
        let (images, documents) = tokio::try_join!(
            self.images.get_by_vehicle_id(&self.pool, id),
            self.documents.get_by_vehicle_id(&self.pool, id),
        )?;

        self.vehicles.delete(&self.pool, id).await?;

        let keys: Vec<String> = images
            .into_iter()
            .map(|i| i.filename)
            .chain(documents.into_iter().map(|d| d.filename))
            .collect();
        for key in keys {
            if let Err(e) = self.store.delete(&key).await {
                tracing::warn!(vehicle_id = id, key = %key, error = %e, "failed to remove stored object");
            }
        }

        tracing::info!(vehicle_id = id, "vehicle deleted");

        self.notifier.dispatch(
            Notification::new("vehicle_deleted", vehicle_ref(id), vehicle_payload(&vehicle), Some(&user.id))
                .with_priority(NotificationPriority::High),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateVehicleRequest {
        CreateVehicleRequest {
            code: 101,
            make: " Toyota ".into(),
            model: "Aqua".into(),
            trim_level: Some("  ".into()),
            year_of_manufacture: 2018,
            color: "Pearl".into(),
            mileage_km: Some(42_000),
            chassis_id: "NHP10-123".into(),
            condition_status: "unregistered".into(),
            currency: "JPY".into(),
            price_quote: None,
            auction_grade: Some("4.5".into()),
            auction_price: None,
            cif_value: None,
            hs_code: None,
            registration_number: None,
            record_date: None,
            internal_notes: None,
            is_featured: false,
        }
    }

    #[test]
    fn values_parse_enums_and_trim_text() {
        let values = vehicle_values(request()).unwrap();
        assert_eq!(values.make, "Toyota");
        assert_eq!(values.trim_level, None);
        assert_eq!(values.condition_status, crate::models::enums::ConditionStatus::Unregistered);
        assert_eq!(values.currency, crate::models::enums::Currency::Jpy);
    }

    #[test]
    fn unknown_condition_status_is_a_bad_request() {
        let mut req = request();
        req.condition_status = "SALVAGED".into();
        let err = vehicle_values(req).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("condition_status"));
    }

    #[test]
    fn unknown_currency_is_a_bad_request() {
        let mut req = request();
        req.currency = "EUR".into();
        assert!(matches!(vehicle_values(req), Err(AppError::BadRequest(_))));
    }
}

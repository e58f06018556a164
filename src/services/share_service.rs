// src/services/share_service.rs

//! Time-limited public links to a single vehicle.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        VehicleFinancialsRepository, VehicleImageRepository, VehiclePurchaseRepository,
        VehicleRepository, VehicleShareTokenRepository, VehicleShippingRepository,
    },
    models::{
        auth::CurrentUser,
        share::{
            CreateShareRequest, PublicFinancial, PublicImage, PublicPurchase, PublicShipping,
            PublicVehicleView, ShareTokenResponse, VehicleShareToken, SHARE_DETAILS,
            SHARE_DETAIL_FINANCIAL, SHARE_DETAIL_IMAGES, SHARE_DETAIL_PURCHASE,
            SHARE_DETAIL_SHIPPING,
        },
        vehicle::{Vehicle, VehicleFinancials, VehiclePurchase, VehicleShipping},
    },
    services::{
        notification::{vehicle_ref, Notification, NotificationService},
        storage::{presign_ttl, ObjectStore},
    },
};

pub const DEFAULT_EXPIRE_DAYS: i64 = 7;
pub const MAX_EXPIRE_DAYS: i64 = 365;
const TOKEN_BYTES: usize = 32;

/// 32 bytes from the OS CSPRNG, base64url without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Validates the lifetime and normalises the detail list (lowercase, deduplicated).
pub fn share_settings(req: &CreateShareRequest) -> Result<(i64, Vec<String>), AppError> {
    let days = req.expire_in_days.unwrap_or(DEFAULT_EXPIRE_DAYS);
    if days <= 0 || days > MAX_EXPIRE_DAYS {
        return Err(AppError::BadRequest(format!(
            "expire_in_days must be between 1 and {}",
            MAX_EXPIRE_DAYS
        )));
    }

    let mut details: Vec<String> = Vec::new();
    for raw in &req.include_details {
        let detail = raw.trim().to_ascii_lowercase();
        if !SHARE_DETAILS.contains(&detail.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unknown share detail '{}'. Allowed values: {}",
                raw,
                SHARE_DETAILS.join(", ")
            )));
        }
        if !details.contains(&detail) {
            details.push(detail);
        }
    }

    Ok((days, details))
}

/// Projects a vehicle into what an anonymous viewer may see.
pub fn public_view(
    token: &VehicleShareToken,
    vehicle: Vehicle,
    shipping: Option<VehicleShipping>,
    financials: Option<VehicleFinancials>,
    purchase: Option<VehiclePurchase>,
    images: Option<Vec<PublicImage>>,
) -> PublicVehicleView {
    PublicVehicleView {
        code: vehicle.code,
        make: vehicle.make,
        model: vehicle.model,
        trim_level: vehicle.trim_level,
        year_of_manufacture: vehicle.year_of_manufacture,
        color: vehicle.color,
        mileage_km: vehicle.mileage_km,
        condition_status: vehicle.condition_status,
        auction_grade: vehicle.auction_grade,
        expires_at: token.expires_at,
        shipping: shipping.map(|s| PublicShipping {
            vessel_name: s.vessel_name,
            departure_harbour: s.departure_harbour,
            shipment_date: s.shipment_date,
            arrival_date: s.arrival_date,
            clearing_date: s.clearing_date,
            shipping_status: s.shipping_status,
        }),
        financial: financials.map(|f| PublicFinancial {
            charges_lkr: f.charges_lkr,
            duty_lkr: f.duty_lkr,
            clearing_lkr: f.clearing_lkr,
            total_cost_lkr: f.total_cost_lkr,
        }),
        purchase: purchase.map(|p| PublicPurchase {
            purchase_date: p.purchase_date,
            purchase_status: p.purchase_status,
        }),
        images,
    }
}

#[derive(Clone)]
pub struct ShareService {
    pool: PgPool,
    tokens: VehicleShareTokenRepository,
    vehicles: VehicleRepository,
    shipping: VehicleShippingRepository,
    financials: VehicleFinancialsRepository,
    purchase: VehiclePurchaseRepository,
    images: VehicleImageRepository,
    store: Arc<dyn ObjectStore>,
    notifier: NotificationService,
    share_base_url: String,
}

impl ShareService {
    pub fn new(
        pool: PgPool,
        store: Arc<dyn ObjectStore>,
        notifier: NotificationService,
        share_base_url: String,
    ) -> Self {
        Self {
            pool,
            tokens: VehicleShareTokenRepository::new(),
            vehicles: VehicleRepository::new(),
            shipping: VehicleShippingRepository::new(),
            financials: VehicleFinancialsRepository::new(),
            purchase: VehiclePurchaseRepository::new(),
            images: VehicleImageRepository::new(),
            store,
            notifier,
            share_base_url: share_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn share_url(&self, token: &str) -> String {
        format!("{}/share/vehicle/public/{}", self.share_base_url, token)
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn issue(
        &self,
        vehicle_id: i64,
        req: CreateShareRequest,
        user: &CurrentUser,
    ) -> Result<ShareTokenResponse, AppError> {
        let (days, details) = share_settings(&req)?;

        if !self.vehicles.exists(&self.pool, vehicle_id).await? {
            return Err(AppError::not_found("Vehicle", vehicle_id));
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(days);

        let share = self
            .tokens
            .insert(&self.pool, vehicle_id, &token, expires_at, &details, Some(&user.id))
            .await?;

        tracing::info!(vehicle_id, expires_at = %share.expires_at, "share link issued");

        self.notifier.dispatch(Notification::new(
            "vehicle_share_created",
            vehicle_ref(vehicle_id),
            json!({
                "vehicle_id": vehicle_id,
                "expires_at": share.expires_at,
                "include_details": share.include_details,
            }),
            Some(&user.id),
        ));

        Ok(ShareTokenResponse {
            share_url: self.share_url(&share.token),
            token: share.token,
            expires_at: share.expires_at,
            include_details: share.include_details,
        })
    }

    /// Resolves a public link. Only the aggregates named at issue time are loaded.
    pub async fn consume(&self, token: &str) -> Result<PublicVehicleView, AppError> {
        let share = self.tokens.get_by_token(&self.pool, token).await?;
        let vehicle_id = share.vehicle_id;

        let vehicle = match self.vehicles.get_by_id(&self.pool, vehicle_id).await {
            Ok(vehicle) => vehicle,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::NotFound("Share link is invalid or expired".into()));
            }
            Err(e) => return Err(e),
        };

        let shipping = if share.includes(SHARE_DETAIL_SHIPPING) {
            Some(self.shipping.get_by_vehicle_id(&self.pool, vehicle_id).await?)
        } else {
            None
        };
        let financials = if share.includes(SHARE_DETAIL_FINANCIAL) {
            Some(self.financials.get_by_vehicle_id(&self.pool, vehicle_id).await?)
        } else {
            None
        };
        let purchase = if share.includes(SHARE_DETAIL_PURCHASE) {
            Some(self.purchase.get_by_vehicle_id(&self.pool, vehicle_id).await?)
        } else {
            None
        };
        let images = if share.includes(SHARE_DETAIL_IMAGES) {
            Some(self.public_images(vehicle_id).await?)
        } else {
            None
        };

        Ok(public_view(&share, vehicle, shipping, financials, purchase, images))
    }

    async fn public_images(&self, vehicle_id: i64) -> Result<Vec<PublicImage>, AppError> {
        let ttl = presign_ttl(None);
        let images = self.images.get_by_vehicle_id(&self.pool, vehicle_id).await?;

        let mut public = Vec::with_capacity(images.len());
        for image in images {
            match self.store.presigned_get(&image.filename, ttl).await {
                Ok(url) => public.push(PublicImage {
                    url,
                    is_primary: image.is_primary,
                    display_order: image.display_order,
                }),
                Err(e) => {
                    tracing::warn!(image_id = image.id, error = %e, "skipping image without a presigned url");
                }
            }
        }
        Ok(public)
    }

    pub async fn list(&self, vehicle_id: i64) -> Result<Vec<VehicleShareToken>, AppError> {
        if !self.vehicles.exists(&self.pool, vehicle_id).await? {
            return Err(AppError::not_found("Vehicle", vehicle_id));
        }
        self.tokens.list_by_vehicle(&self.pool, vehicle_id).await
    }

    #[tracing::instrument(skip(self, token, user), fields(user_id = %user.id))]
    pub async fn deactivate(
        &self,
        token: &str,
        user: &CurrentUser,
    ) -> Result<VehicleShareToken, AppError> {
        let share = self.tokens.deactivate(&self.pool, token).await?;

        self.notifier.dispatch(Notification::new(
            "vehicle_share_revoked",
            vehicle_ref(share.vehicle_id),
            json!({ "vehicle_id": share.vehicle_id, "share_id": share.id }),
            Some(&user.id),
        ));

        Ok(share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{ConditionStatus, Currency, PurchaseStatus};
    use rust_decimal::Decimal;

    fn request(days: Option<i64>, details: &[&str]) -> CreateShareRequest {
        CreateShareRequest {
            expire_in_days: days,
            include_details: details.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn tokens_are_url_safe_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn lifetime_defaults_and_bounds() {
        assert_eq!(share_settings(&request(None, &[])).unwrap().0, 7);
        assert_eq!(share_settings(&request(Some(365), &[])).unwrap().0, 365);
        assert!(share_settings(&request(Some(0), &[])).is_err());
        assert!(share_settings(&request(Some(366), &[])).is_err());
        assert!(share_settings(&request(Some(-3), &[])).is_err());
    }

    #[test]
    fn details_are_normalised_and_checked() {
        let (_, details) = share_settings(&request(None, &["Shipping", "images", "shipping"])).unwrap();
        assert_eq!(details, vec!["shipping".to_string(), "images".to_string()]);

        let err = share_settings(&request(None, &["sales"])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    fn sample_vehicle() -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: 9,
            code: 101,
            make: "Toyota".into(),
            model: "Aqua".into(),
            trim_level: None,
            year_of_manufacture: 2018,
            color: "Pearl".into(),
            mileage_km: Some(42_000),
            chassis_id: "NHP10-123".into(),
            condition_status: ConditionStatus::Unregistered,
            currency: Currency::Jpy,
            price_quote: None,
            auction_grade: Some("4.5".into()),
            auction_price: None,
            cif_value: None,
            hs_code: None,
            registration_number: None,
            record_date: None,
            internal_notes: Some("buyer is a friend of the owner".into()),
            is_featured: false,
            featured_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn token(details: &[&str]) -> VehicleShareToken {
        let now = Utc::now();
        VehicleShareToken {
            id: 1,
            vehicle_id: 9,
            token: generate_token(),
            expires_at: now + Duration::days(7),
            include_details: details.iter().map(|d| d.to_string()).collect(),
            is_active: true,
            created_by: Some("user-1".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_view_hides_internal_fields() {
        let now = Utc::now();
        let purchase = VehiclePurchase {
            id: 3,
            vehicle_id: 9,
            supplier_id: Some(4),
            bought_from_name: Some("USS Tokyo".into()),
            bought_from_title: None,
            bought_from_contact: Some("+81 3 0000".into()),
            bought_from_address: None,
            bought_from_other_contacts: None,
            purchase_remarks: Some("negotiated".into()),
            lc_bank: Some("HNB".into()),
            lc_number: Some("LC-1".into()),
            lc_cost_jpy: Some(Decimal::new(1_000_000, 0)),
            purchase_date: None,
            purchase_status: PurchaseStatus::LcIssued,
            created_at: now,
            updated_at: now,
        };

        let view = public_view(&token(&["purchase"]), sample_vehicle(), None, None, Some(purchase), None);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["purchase"]["purchase_status"], "LC_ISSUED");
        assert!(json.get("shipping").is_none());
        assert!(json.get("images").is_none());

        let text = json.to_string();
        for hidden in ["internal_notes", "friend of the owner", "USS Tokyo", "lc_number", "chassis_id", "revenue", "profit"] {
            assert!(!text.contains(hidden), "{} leaked into the public view", hidden);
        }
    }
}

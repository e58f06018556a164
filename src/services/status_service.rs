// src/services/status_service.rs

//! Shipping and purchase status transitions.
//!
//! A transition overwrites the sibling row and, when the status actually
//! moves, appends a history row in the same transaction. Notifications and
//! customer emails go out after commit.

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        HistoryRepository, VehiclePurchaseRepository, VehicleRepository, VehicleSalesRepository,
        VehicleShippingRepository,
    },
    models::{
        auth::CurrentUser,
        enums::{PurchaseStatus, ShippingStatus},
        history::{HistoryKind, ManualHistoryRequest, NewHistoryEntry, StatusHistory},
        vehicle::{
            PurchaseValues, ShippingValues, UpdatePurchaseRequest, UpdateShippingRequest,
            VehiclePurchase, VehicleShipping,
        },
    },
    services::{
        email::{EmailMessage, EmailService},
        notification::{vehicle_ref, Notification, NotificationPriority, NotificationService},
    },
};

pub const DEFAULT_RECENT_LIMIT: i64 = 50;
pub const MAX_RECENT_LIMIT: i64 = 500;

fn remarks(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn shipping_values(req: &UpdateShippingRequest) -> Result<ShippingValues, AppError> {
    Ok(ShippingValues {
        vessel_name: req.vessel_name.clone(),
        departure_harbour: req.departure_harbour.clone(),
        shipment_date: req.shipment_date,
        arrival_date: req.arrival_date,
        clearing_date: req.clearing_date,
        shipping_status: req.shipping_status.parse()?,
    })
}

pub fn purchase_values(req: &UpdatePurchaseRequest) -> Result<PurchaseValues, AppError> {
    Ok(PurchaseValues {
        supplier_id: req.supplier_id,
        bought_from_name: req.bought_from_name.clone(),
        bought_from_title: req.bought_from_title.clone(),
        bought_from_contact: req.bought_from_contact.clone(),
        bought_from_address: req.bought_from_address.clone(),
        bought_from_other_contacts: req.bought_from_other_contacts.clone(),
        purchase_remarks: req.purchase_remarks.clone(),
        lc_bank: req.lc_bank.clone(),
        lc_number: req.lc_number.clone(),
        lc_cost_jpy: req.lc_cost_jpy,
        purchase_date: req.purchase_date,
        purchase_status: req.purchase_status.parse()?,
    })
}

/// Normalises a status for `kind`, rejecting values outside its enum.
pub fn normalise_status(kind: HistoryKind, raw: &str) -> Result<String, AppError> {
    let status = match kind {
        HistoryKind::Shipping => raw.parse::<ShippingStatus>()?.as_str(),
        HistoryKind::Purchase => raw.parse::<PurchaseStatus>()?.as_str(),
    };
    Ok(status.to_string())
}

#[derive(Clone)]
pub struct StatusService {
    pool: PgPool,
    vehicles: VehicleRepository,
    shipping: VehicleShippingRepository,
    purchase: VehiclePurchaseRepository,
    sales: VehicleSalesRepository,
    shipping_history: HistoryRepository,
    purchase_history: HistoryRepository,
    notifier: NotificationService,
    email: EmailService,
}

impl StatusService {
    pub fn new(pool: PgPool, notifier: NotificationService, email: EmailService) -> Self {
        Self {
            pool,
            vehicles: VehicleRepository::new(),
            shipping: VehicleShippingRepository::new(),
            purchase: VehiclePurchaseRepository::new(),
            sales: VehicleSalesRepository::new(),
            shipping_history: HistoryRepository::new(HistoryKind::Shipping),
            purchase_history: HistoryRepository::new(HistoryKind::Purchase),
            notifier,
            email,
        }
    }

    fn history(&self, kind: HistoryKind) -> &HistoryRepository {
        match kind {
            HistoryKind::Shipping => &self.shipping_history,
            HistoryKind::Purchase => &self.purchase_history,
        }
    }

    // =========================================================================
    //  SHIPPING
    // =========================================================================

    pub async fn get_shipping(&self, vehicle_id: i64) -> Result<VehicleShipping, AppError> {
        self.shipping.get_by_vehicle_id(&self.pool, vehicle_id).await
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update_shipping(
        &self,
        vehicle_id: i64,
        req: UpdateShippingRequest,
        user: &CurrentUser,
    ) -> Result<VehicleShipping, AppError> {
        let values = shipping_values(&req)?;

        let mut tx = self.pool.begin().await?;

        let current = self.shipping.get_for_update(&mut *tx, vehicle_id).await?;
        let updated = self
            .shipping
            .update_shipping_status(&mut *tx, vehicle_id, &values)
            .await?;

        let changed = current.shipping_status != updated.shipping_status;
        if changed {
            self.shipping_history
                .insert(
                    &mut *tx,
                    &NewHistoryEntry {
                        vehicle_id,
                        old_status: Some(current.shipping_status.to_string()),
                        new_status: updated.shipping_status.to_string(),
                        changed_by: Some(user.id.clone()),
                        change_remarks: remarks(req.change_remarks),
                        changed_at: None,
                    },
                )
                .await?;
        }

        tx.commit().await?;

        if changed {
            tracing::info!(
                vehicle_id,
                from = %current.shipping_status,
                to = %updated.shipping_status,
                "shipping status changed"
            );
            self.publish_change(
                vehicle_id,
                HistoryKind::Shipping,
                current.shipping_status.as_str(),
                updated.shipping_status.as_str(),
                NotificationPriority::for_shipping(updated.shipping_status),
                user,
            );
        }

        Ok(updated)
    }

    // =========================================================================
    //  PURCHASE
    // =========================================================================

    pub async fn get_purchase(&self, vehicle_id: i64) -> Result<VehiclePurchase, AppError> {
        self.purchase.get_by_vehicle_id(&self.pool, vehicle_id).await
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update_purchase(
        &self,
        vehicle_id: i64,
        req: UpdatePurchaseRequest,
        user: &CurrentUser,
    ) -> Result<VehiclePurchase, AppError> {
        let values = purchase_values(&req)?;

        let mut tx = self.pool.begin().await?;

        let current = self.purchase.get_for_update(&mut *tx, vehicle_id).await?;
        let updated = self
            .purchase
            .update_purchase_status(&mut *tx, vehicle_id, &values)
            .await?;

        let changed = current.purchase_status != updated.purchase_status;
        if changed {
            self.purchase_history
                .insert(
                    &mut *tx,
                    &NewHistoryEntry {
                        vehicle_id,
                        old_status: Some(current.purchase_status.to_string()),
                        new_status: updated.purchase_status.to_string(),
                        changed_by: Some(user.id.clone()),
                        change_remarks: remarks(req.change_remarks),
                        changed_at: None,
                    },
                )
                .await?;
        }

        tx.commit().await?;

        if changed {
            tracing::info!(
                vehicle_id,
                from = %current.purchase_status,
                to = %updated.purchase_status,
                "purchase status changed"
            );
            self.publish_change(
                vehicle_id,
                HistoryKind::Purchase,
                current.purchase_status.as_str(),
                updated.purchase_status.as_str(),
                NotificationPriority::for_purchase(updated.purchase_status),
                user,
            );
        }

        Ok(updated)
    }

    /// Notification plus, when the sale has a customer with an email, a
    /// status email. Both run detached.
    fn publish_change(
        &self,
        vehicle_id: i64,
        kind: HistoryKind,
        old_status: &str,
        new_status: &str,
        priority: NotificationPriority,
        user: &CurrentUser,
    ) {
        let payload = json!({
            "vehicle_id": vehicle_id,
            "old_status": old_status,
            "new_status": new_status,
            "changed_by": user.id,
        });
        self.notifier.dispatch(
            Notification::new(
                &format!("{}_status_changed", kind.label()),
                vehicle_ref(vehicle_id),
                payload.clone(),
                Some(&user.id),
            )
            .with_priority(priority),
        );

        if !self.email.is_enabled() {
            return;
        }

        let pool = self.pool.clone();
        let sales = self.sales.clone();
        let email = self.email.clone();
        let label = kind.label();
        let new_status = new_status.to_string();
        tokio::spawn(async move {
            let to = match sales.customer_email(&pool, vehicle_id).await {
                Ok(Some(to)) => to,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(vehicle_id, error = %e, "could not resolve customer email");
                    return;
                }
            };

            let message = EmailMessage {
                to,
                subject: format!("Vehicle {} update: {}", label, new_status),
                template: format!("{}_status_update", label),
                data: payload,
            };
            if let Err(e) = email.send(&message).await {
                tracing::warn!(vehicle_id, error = %e, "failed to send status email");
            }
        });
    }

    // =========================================================================
    //  HISTORY
    // =========================================================================

    pub async fn vehicle_history(
        &self,
        kind: HistoryKind,
        vehicle_id: i64,
    ) -> Result<Vec<StatusHistory>, AppError> {
        if !self.vehicles.exists(&self.pool, vehicle_id).await? {
            return Err(AppError::not_found("Vehicle", vehicle_id));
        }
        self.history(kind).get_by_vehicle_id(&self.pool, vehicle_id).await
    }

    pub async fn recent_history(
        &self,
        kind: HistoryKind,
        limit: Option<i64>,
    ) -> Result<Vec<StatusHistory>, AppError> {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .min(MAX_RECENT_LIMIT);
        self.history(kind).get_recent(&self.pool, limit).await
    }

    pub async fn history_by_status(
        &self,
        kind: HistoryKind,
        status: &str,
    ) -> Result<Vec<StatusHistory>, AppError> {
        let status = normalise_status(kind, status)?;
        self.history(kind).get_by_status(&self.pool, &status).await
    }

    pub async fn current_statuses(&self, kind: HistoryKind) -> Result<Vec<StatusHistory>, AppError> {
        self.history(kind)
            .get_current_status_for_all_vehicles(&self.pool)
            .await
    }

    /// Records a (possibly backdated) transition without touching the sibling row.
    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn add_manual_entry(
        &self,
        kind: HistoryKind,
        vehicle_id: i64,
        req: ManualHistoryRequest,
        user: &CurrentUser,
    ) -> Result<StatusHistory, AppError> {
        let new_status = normalise_status(kind, &req.new_status)?;
        let old_status = match req.old_status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(normalise_status(kind, raw)?),
            None => None,
        };

        if !self.vehicles.exists(&self.pool, vehicle_id).await? {
            return Err(AppError::not_found("Vehicle", vehicle_id));
        }

        let entry = NewHistoryEntry {
            vehicle_id,
            old_status,
            new_status,
            changed_by: Some(user.id.clone()),
            change_remarks: remarks(req.change_remarks),
            changed_at: req.changed_at,
        };

        self.history(kind)
            .insert_manual_history_entry(&self.pool, &entry)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping_request(status: &str) -> UpdateShippingRequest {
        UpdateShippingRequest {
            vessel_name: Some("MV Hoegh".into()),
            departure_harbour: Some("Yokohama".into()),
            shipment_date: None,
            arrival_date: None,
            clearing_date: None,
            shipping_status: status.into(),
            change_remarks: None,
        }
    }

    #[test]
    fn shipping_status_is_validated() {
        assert_eq!(
            shipping_values(&shipping_request("shipped")).unwrap().shipping_status,
            ShippingStatus::Shipped
        );
        assert!(matches!(
            shipping_values(&shipping_request("LOST_AT_SEA")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn history_statuses_follow_their_kind() {
        assert_eq!(normalise_status(HistoryKind::Purchase, "lc_issued").unwrap(), "LC_ISSUED");
        assert!(normalise_status(HistoryKind::Shipping, "LC_ISSUED").is_err());
        assert_eq!(normalise_status(HistoryKind::Shipping, "Delivered").unwrap(), "DELIVERED");
    }

    #[test]
    fn blank_remarks_are_dropped() {
        assert_eq!(remarks(Some("   ".into())), None);
        assert_eq!(remarks(Some(" ok ".into())), Some("ok".into()));
    }
}

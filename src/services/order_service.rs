// src/services/order_service.rs

//! Customer sourcing orders ("find me a vehicle like this").

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        filters::{Filter, OrderFilter},
        pagination::{PageParams, Paginated},
    },
    db::{CustomerRepository, OrderRepository},
    models::{
        auth::CurrentUser,
        customer::{Customer, CustomerValues},
        enums::{CustomerType, OrderPriority, OrderStatus, ShippingMethod},
        order::{CreateOrderRequest, CustomerOrder, OrderValues, UpdateOrderStatusRequest},
    },
    services::notification::{Notification, NotificationPriority, NotificationService},
};

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn order_number(customer_id: i64) -> String {
    format!("ORD-{}-{}", Utc::now().timestamp(), customer_id)
}

/// Validates everything in the request that does not depend on the customer row.
pub fn order_values(
    req: &CreateOrderRequest,
    customer_id: i64,
    created_by: Option<String>,
) -> Result<OrderValues, AppError> {
    if let (Some(min), Some(max)) = (req.preferred_year_min, req.preferred_year_max) {
        if min > max {
            return Err(AppError::BadRequest(
                "preferred_year_min cannot be greater than preferred_year_max".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (req.budget_min, req.budget_max) {
        if min > max {
            return Err(AppError::BadRequest(
                "budget_min cannot be greater than budget_max".to_string(),
            ));
        }
    }

    let priority = match req.priority.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => raw.parse()?,
        None => OrderPriority::Normal,
    };
    let shipping_method = match req.shipping_method.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(raw) => raw.parse()?,
        None => ShippingMethod::Sea,
    };

    let features: Vec<&str> = req
        .features
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    let features = serde_json::to_string(&features)
        .map_err(|e| AppError::BadRequest(format!("Invalid features: {}", e)))?;

    let order_status = if req.is_draft {
        OrderStatus::Draft
    } else {
        OrderStatus::Submitted
    };

    Ok(OrderValues {
        order_number: order_number(customer_id),
        customer_id,
        preferred_make: trimmed(req.preferred_make.clone()),
        preferred_model: trimmed(req.preferred_model.clone()),
        preferred_year_min: req.preferred_year_min,
        preferred_year_max: req.preferred_year_max,
        preferred_color: trimmed(req.preferred_color.clone()),
        max_mileage_km: req.max_mileage_km,
        preferred_condition: trimmed(req.preferred_condition.clone()),
        budget_min: req.budget_min,
        budget_max: req.budget_max,
        features,
        priority,
        shipping_method,
        expected_delivery_date: req.expected_delivery_date,
        additional_notes: trimmed(req.additional_notes.clone()),
        order_status,
        is_draft: req.is_draft,
        created_by,
    })
}

fn order_payload(order: &CustomerOrder) -> serde_json::Value {
    json!({
        "order_id": order.id,
        "order_number": order.order_number,
        "customer_id": order.customer_id,
        "order_status": order.order_status,
        "priority": order.priority,
    })
}

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    orders: OrderRepository,
    customers: CustomerRepository,
    notifier: NotificationService,
}

impl OrderService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(),
            customers: CustomerRepository::new(),
            notifier,
        }
    }

    /// Finds the customer by contact number (refreshing their details) or
    /// registers them, then files the order. Both happen in one transaction.
    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn submit(
        &self,
        req: CreateOrderRequest,
        user: &CurrentUser,
    ) -> Result<CustomerOrder, AppError> {
        // Fail fast on enum / range problems before opening a transaction.
        order_values(&req, 0, None)?;

        let contact_number = req.contact_number.trim().to_string();
        let name = req.customer_name.trim().to_string();
        let title = trimmed(req.customer_title.clone());
        let email = trimmed(req.email.clone());
        let address = trimmed(req.address.clone());

        let mut tx = self.pool.begin().await?;

        let customer: Customer = match self
            .customers
            .get_by_contact_number(&mut *tx, &contact_number)
            .await?
        {
            Some(existing) => {
                self.customers
                    .refresh_contact_details(
                        &mut *tx,
                        existing.id,
                        &name,
                        title.as_deref(),
                        email.as_deref(),
                        address.as_deref(),
                    )
                    .await?
            }
            None => {
                self.customers
                    .insert(
                        &mut *tx,
                        &CustomerValues {
                            name,
                            title,
                            contact_number: Some(contact_number),
                            email,
                            address,
                            other_contacts: None,
                            customer_type: CustomerType::Individual,
                            notes: None,
                        },
                    )
                    .await?
            }
        };

        let values = order_values(&req, customer.id, Some(user.id.clone()))?;
        let order = self.orders.insert(&mut *tx, &values).await?;

        tx.commit().await?;

        tracing::info!(order_id = order.id, order_number = %order.order_number, customer_id = customer.id, "order submitted");

        let kind = if order.is_draft { "order_drafted" } else { "order_submitted" };
        self.notifier.dispatch(Notification::new(
            kind,
            order.order_number.clone(),
            order_payload(&order),
            Some(&user.id),
        ));

        Ok(order)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CustomerOrder, AppError> {
        self.orders.get_by_id(&self.pool, id).await
    }

    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: PageParams,
    ) -> Result<Paginated<CustomerOrder>, AppError> {
        let qb = filter.to_builder()?;
        let (orders, total) = tokio::try_join!(
            self.orders.list(&self.pool, &qb, page.limit(), page.offset()),
            self.orders.count(&self.pool, &qb),
        )?;
        Ok(Paginated::new(orders, page, total))
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update_status(
        &self,
        id: i64,
        req: UpdateOrderStatusRequest,
        user: &CurrentUser,
    ) -> Result<CustomerOrder, AppError> {
        let status: OrderStatus = req.order_status.parse()?;
        let previous = self.orders.get_by_id(&self.pool, id).await?;
        let order = self.orders.update_status(&self.pool, id, status).await?;

        let priority = match order.order_status {
            OrderStatus::Cancelled | OrderStatus::Completed => NotificationPriority::High,
            _ => NotificationPriority::Normal,
        };
        let mut payload = order_payload(&order);
        payload["old_status"] = json!(previous.order_status);

        self.notifier.dispatch(
            Notification::new(
                "order_status_changed",
                order.order_number.clone(),
                payload,
                Some(&user.id),
            )
            .with_priority(priority),
        );

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: "Ruwan Jayasinghe".into(),
            customer_title: None,
            contact_number: "0779998877".into(),
            email: None,
            address: None,
            preferred_make: Some("Honda".into()),
            preferred_model: Some("Vezel".into()),
            preferred_year_min: Some(2016),
            preferred_year_max: Some(2019),
            preferred_color: None,
            max_mileage_km: Some(60_000),
            preferred_condition: None,
            budget_min: None,
            budget_max: None,
            features: vec!["sunroof".into(), " ".into(), "leather".into()],
            priority: None,
            shipping_method: None,
            expected_delivery_date: None,
            additional_notes: None,
            is_draft: false,
        }
    }

    #[test]
    fn defaults_and_feature_serialisation() {
        let values = order_values(&request(), 42, Some("user-1".into())).unwrap();
        assert_eq!(values.order_status, OrderStatus::Submitted);
        assert!(!values.is_draft);
        assert_eq!(values.priority, OrderPriority::Normal);
        assert_eq!(values.shipping_method, ShippingMethod::Sea);
        assert_eq!(values.features, r#"["sunroof","leather"]"#);
        assert!(values.order_number.starts_with("ORD-"));
        assert!(values.order_number.ends_with("-42"));
    }

    #[test]
    fn drafts_keep_draft_status() {
        let mut req = request();
        req.is_draft = true;
        let values = order_values(&req, 1, None).unwrap();
        assert_eq!(values.order_status, OrderStatus::Draft);
        assert!(values.is_draft);
    }

    #[test]
    fn invalid_priority_and_ranges_are_rejected() {
        let mut req = request();
        req.priority = Some("ASAP".into());
        assert!(matches!(order_values(&req, 1, None), Err(AppError::BadRequest(_))));

        let mut req = request();
        req.preferred_year_min = Some(2020);
        assert!(order_values(&req, 1, None).is_err());
    }
}

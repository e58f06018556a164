// src/services/sales_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{VehicleFinancialsRepository, VehicleSalesRepository},
    models::{
        auth::CurrentUser,
        enums::SaleStatus,
        vehicle::{
            FinancialValues, SalesValues, UpdateFinancialsRequest, UpdateSalesRequest,
            VehicleFinancials, VehicleSales,
        },
    },
    services::notification::{vehicle_ref, Notification, NotificationService},
};

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Rejects negative charges and fills the total from the components when absent.
pub fn financial_values(req: &UpdateFinancialsRequest) -> Result<FinancialValues, AppError> {
    let components = [
        ("charges_lkr", req.charges_lkr),
        ("tt_lkr", req.tt_lkr),
        ("duty_lkr", req.duty_lkr),
        ("clearing_lkr", req.clearing_lkr),
        ("other_expenses_lkr", req.other_expenses_lkr),
    ];
    if let Some((name, _)) = components.iter().find(|(_, v)| *v < Decimal::ZERO) {
        return Err(AppError::BadRequest(format!("{} cannot be negative", name)));
    }

    let total = match req.total_cost_lkr {
        Some(total) => total,
        None => components.iter().map(|(_, v)| *v).sum(),
    };
    if total <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Total cost must be greater than zero".to_string(),
        ));
    }

    Ok(FinancialValues {
        charges_lkr: req.charges_lkr,
        tt_lkr: req.tt_lkr,
        duty_lkr: req.duty_lkr,
        clearing_lkr: req.clearing_lkr,
        other_expenses_lkr: req.other_expenses_lkr,
        total_cost_lkr: total,
    })
}

/// Validates the sale. `profit` is left for the caller to derive since it
/// needs the persisted total cost.
pub fn sales_values(req: UpdateSalesRequest) -> Result<SalesValues, AppError> {
    let sale_status: SaleStatus = req.sale_status.parse()?;
    let sold_to_name = trimmed(req.sold_to_name);

    let mut sold_date = req.sold_date;
    if sale_status == SaleStatus::Sold {
        if sold_to_name.is_none() {
            return Err(AppError::BadRequest(
                "Customer name is required when status is SOLD".to_string(),
            ));
        }
        if !req.revenue.is_some_and(|r| r > Decimal::ZERO) {
            return Err(AppError::BadRequest(
                "Revenue is required when status is SOLD".to_string(),
            ));
        }
        sold_date.get_or_insert_with(Utc::now);
    }

    Ok(SalesValues {
        customer_id: req.customer_id,
        sold_to_name,
        sold_to_title: trimmed(req.sold_to_title),
        contact_number: trimmed(req.contact_number),
        customer_address: trimmed(req.customer_address),
        sold_date,
        revenue: req.revenue,
        profit: req.profit,
        sale_remarks: trimmed(req.sale_remarks),
        sale_status,
    })
}

#[derive(Clone)]
pub struct SalesService {
    pool: PgPool,
    financials: VehicleFinancialsRepository,
    sales: VehicleSalesRepository,
    notifier: NotificationService,
}

impl SalesService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self {
            pool,
            financials: VehicleFinancialsRepository::new(),
            sales: VehicleSalesRepository::new(),
            notifier,
        }
    }

    pub async fn get_financials(&self, vehicle_id: i64) -> Result<VehicleFinancials, AppError> {
        self.financials.get_by_vehicle_id(&self.pool, vehicle_id).await
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update_financials(
        &self,
        vehicle_id: i64,
        req: UpdateFinancialsRequest,
        user: &CurrentUser,
    ) -> Result<VehicleFinancials, AppError> {
        let values = financial_values(&req)?;
        let financials = self.financials.update(&self.pool, vehicle_id, &values).await?;

        self.notifier.dispatch(Notification::new(
            "vehicle_financials_updated",
            vehicle_ref(vehicle_id),
            json!({ "vehicle_id": vehicle_id, "total_cost_lkr": financials.total_cost_lkr }),
            Some(&user.id),
        ));

        Ok(financials)
    }

    pub async fn get_sales(&self, vehicle_id: i64) -> Result<VehicleSales, AppError> {
        self.sales.get_by_vehicle_id(&self.pool, vehicle_id).await
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update_sales(
        &self,
        vehicle_id: i64,
        req: UpdateSalesRequest,
        user: &CurrentUser,
    ) -> Result<VehicleSales, AppError> {
        let mut values = sales_values(req)?;

        let mut tx = self.pool.begin().await?;

        if values.profit.is_none() {
            if let Some(revenue) = values.revenue {
                let financials = self.financials.get_by_vehicle_id(&mut *tx, vehicle_id).await?;
                values.profit = Some(revenue - financials.total_cost_lkr);
            }
        }

        let sales = self.sales.update(&mut *tx, vehicle_id, &values).await?;

        tx.commit().await?;

        tracing::info!(vehicle_id, sale_status = %sales.sale_status, "sales record updated");

        self.notifier.dispatch(Notification::new(
            "vehicle_sales_updated",
            vehicle_ref(vehicle_id),
            json!({
                "vehicle_id": vehicle_id,
                "sale_status": sales.sale_status,
                "customer_id": sales.customer_id,
            }),
            Some(&user.id),
        ));

        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn financials(total: Option<Decimal>) -> UpdateFinancialsRequest {
        UpdateFinancialsRequest {
            charges_lkr: dec("1000"),
            tt_lkr: dec("250.50"),
            duty_lkr: dec("0"),
            clearing_lkr: dec("49.50"),
            other_expenses_lkr: dec("0"),
            total_cost_lkr: total,
        }
    }

    fn sale(status: &str) -> UpdateSalesRequest {
        UpdateSalesRequest {
            customer_id: None,
            sold_to_name: Some("Nimal Perera".into()),
            sold_to_title: None,
            contact_number: Some("0771234567".into()),
            customer_address: None,
            sold_date: None,
            revenue: Some(dec("5500000")),
            profit: None,
            sale_remarks: None,
            sale_status: status.into(),
        }
    }

    #[test]
    fn total_defaults_to_component_sum() {
        assert_eq!(financial_values(&financials(None)).unwrap().total_cost_lkr, dec("1300"));
        assert_eq!(
            financial_values(&financials(Some(dec("2000")))).unwrap().total_cost_lkr,
            dec("2000")
        );
    }

    #[test]
    fn zero_or_negative_totals_are_rejected() {
        assert!(financial_values(&financials(Some(dec("0")))).is_err());

        let mut empty = financials(None);
        empty.charges_lkr = dec("0");
        empty.tt_lkr = dec("0");
        empty.clearing_lkr = dec("0");
        assert!(matches!(financial_values(&empty), Err(AppError::BadRequest(_))));

        let mut negative = financials(None);
        negative.duty_lkr = dec("-1");
        let err = financial_values(&negative).unwrap_err();
        assert!(err.to_string().contains("duty_lkr"));
    }

    #[test]
    fn sold_requires_a_name() {
        let mut req = sale("SOLD");
        req.sold_to_name = Some("  ".into());
        let err = sales_values(req).unwrap_err();
        assert_eq!(err.to_string(), "Customer name is required when status is SOLD");
    }

    #[test]
    fn sold_requires_positive_revenue() {
        let mut req = sale("SOLD");
        req.revenue = Some(dec("0"));
        let err = sales_values(req).unwrap_err();
        assert_eq!(err.to_string(), "Revenue is required when status is SOLD");
    }

    #[test]
    fn sold_date_defaults_to_now() {
        let before = Utc::now();
        let values = sales_values(sale("sold")).unwrap();
        let sold_date = values.sold_date.unwrap();
        assert!(sold_date >= before && sold_date <= Utc::now());
    }

    #[test]
    fn reserved_sale_needs_no_buyer() {
        let mut req = sale("RESERVED");
        req.sold_to_name = None;
        req.revenue = None;
        let values = sales_values(req).unwrap();
        assert_eq!(values.sale_status, SaleStatus::Reserved);
        assert!(values.sold_date.is_none());
    }

    #[test]
    fn unknown_sale_status_is_rejected() {
        assert!(matches!(sales_values(sale("LEASED")), Err(AppError::BadRequest(_))));
    }
}

// src/common/filters.rs

//! Query-parameter adapters for list and analytics endpoints.
//!
//! Every filter translates its inputs into [`QueryBuilder`] calls. Columns are
//! resolved through static allow-lists, so caller input only ever reaches the
//! SQL text as a bound argument.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::common::error::AppError;
use crate::common::query_builder::QueryBuilder;
use crate::models::enums::{
    ConditionStatus, CustomerType, OrderPriority, OrderStatus, SaleStatus, ShippingStatus,
    SupplierType,
};

/// Concatenated text the vehicle `search` parameter matches against.
pub const VEHICLE_SEARCH_EXPR: &str = "(v.make || ' ' || v.model || ' ' || v.chassis_id)";

pub trait Filter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError>;

    fn to_builder(&self) -> Result<QueryBuilder, AppError> {
        let mut qb = QueryBuilder::new();
        self.apply(&mut qb)?;
        Ok(qb)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_enum<T>(value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = crate::models::enums::ParseEnumError>,
{
    value.parse::<T>().map_err(AppError::from)
}

// =============================================================================
//  ALLOW-LISTS
// =============================================================================

/// Sortable vehicle fields → qualified column.
pub fn vehicle_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("v.id"),
        "code" => Some("v.code"),
        "make" => Some("v.make"),
        "model" => Some("v.model"),
        "year" | "year_of_manufacture" => Some("v.year_of_manufacture"),
        "mileage" | "mileage_km" => Some("v.mileage_km"),
        "color" => Some("v.color"),
        "price_quote" => Some("v.price_quote"),
        "created_at" => Some("v.created_at"),
        "updated_at" => Some("v.updated_at"),
        "shipping_status" => Some("vs.shipping_status"),
        "sale_status" => Some("vsa.sale_status"),
        "total_cost_lkr" => Some("vf.total_cost_lkr"),
        _ => None,
    }
}

pub fn customer_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("c.id"),
        "name" => Some("c.name"),
        "customer_type" => Some("c.customer_type"),
        "created_at" => Some("c.created_at"),
        _ => None,
    }
}

pub fn supplier_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("s.id"),
        "name" => Some("s.name"),
        "supplier_type" => Some("s.supplier_type"),
        "country" => Some("s.country"),
        "created_at" => Some("s.created_at"),
        _ => None,
    }
}

fn apply_sort(
    qb: &mut QueryBuilder,
    sort_by: &Option<String>,
    sort_order: &Option<String>,
    resolve: fn(&str) -> Option<&'static str>,
    default_column: &'static str,
    tie_breaker: &'static str,
) -> Result<(), AppError> {
    let column = match non_blank(sort_by) {
        Some(field) => resolve(field)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown sort field '{}'", field)))?,
        None => default_column,
    };
    let direction = non_blank(sort_order).unwrap_or("desc");
    qb.set_order_by(column, direction).set_tie_breaker(tie_breaker);
    Ok(())
}

// =============================================================================
//  VEHICLES
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilter {
    pub make: Option<String>,
    pub model: Option<String>,
    pub condition_status: Option<String>,
    pub shipping_status: Option<String>,
    pub sale_status: Option<String>,
    pub year: Option<i32>,
    pub search: Option<String>,
    pub mileage_min: Option<i32>,
    pub mileage_max: Option<i32>,
    pub is_featured: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl Filter for VehicleFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        if let Some(make) = non_blank(&self.make) {
            qb.add_equal("v.make", make);
        }
        if let Some(model) = non_blank(&self.model) {
            qb.add_equal("v.model", model);
        }
        if let Some(status) = non_blank(&self.condition_status) {
            qb.add_equal("v.condition_status", parse_enum::<ConditionStatus>(status)?);
        }
        if let Some(status) = non_blank(&self.shipping_status) {
            qb.add_equal("vs.shipping_status", parse_enum::<ShippingStatus>(status)?);
        }
        if let Some(status) = non_blank(&self.sale_status) {
            qb.add_equal("vsa.sale_status", parse_enum::<SaleStatus>(status)?);
        }
        if let Some(year) = self.year {
            qb.add_equal("v.year_of_manufacture", year);
        }
        if let Some(search) = non_blank(&self.search) {
            qb.add_like(VEHICLE_SEARCH_EXPR, search);
        }

        if self.mileage_min.is_some_and(|m| m < 0) || self.mileage_max.is_some_and(|m| m < 0) {
            return Err(AppError::BadRequest("Mileage bounds cannot be negative".into()));
        }
        if let (Some(min), Some(max)) = (self.mileage_min, self.mileage_max) {
            if min > max {
                return Err(AppError::BadRequest(
                    "mileage_min cannot be greater than mileage_max".into(),
                ));
            }
        }
        qb.add_bounds("v.mileage_km", self.mileage_min, self.mileage_max);

        if let Some(featured) = self.is_featured {
            qb.add_equal("v.is_featured", featured);
        }

        apply_sort(
            qb,
            &self.sort_by,
            &self.sort_order,
            vehicle_sort_column,
            "v.created_at",
            "v.id DESC",
        )
    }
}

// =============================================================================
//  DATE RANGES (analytics)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    #[serde(rename = "dateRangeStart")]
    pub start: Option<String>,
    #[serde(rename = "dateRangeEnd")]
    pub end: Option<String>,
}

fn parse_day(raw: &str, param: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("Invalid {} '{}', expected YYYY-MM-DD", param, raw))
    })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    day.and_time(last).and_utc()
}

impl DateRange {
    /// Adds range / min-only / max-only on `column`; the end day is inclusive.
    pub fn apply_to(&self, qb: &mut QueryBuilder, column: &'static str) -> Result<(), AppError> {
        let start = non_blank(&self.start)
            .map(|s| parse_day(s, "dateRangeStart"))
            .transpose()?;
        let end = non_blank(&self.end)
            .map(|s| parse_day(s, "dateRangeEnd"))
            .transpose()?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AppError::BadRequest(
                    "dateRangeStart cannot be after dateRangeEnd".into(),
                ));
            }
        }

        qb.add_bounds(column, start.map(start_of_day), end.map(end_of_day));
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleShippingFilter {
    #[serde(flatten)]
    pub range: DateRange,
}

impl Filter for VehicleShippingFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        self.range.apply_to(qb, "vs.created_at")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleSalesFilter {
    #[serde(flatten)]
    pub range: DateRange,
}

impl Filter for VehicleSalesFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        self.range.apply_to(qb, "vsa.created_at")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFinancialFilter {
    #[serde(flatten)]
    pub range: DateRange,
}

impl Filter for VehicleFinancialFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        self.range.apply_to(qb, "vf.created_at")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehiclePurchaseFilter {
    #[serde(flatten)]
    pub range: DateRange,
}

impl Filter for VehiclePurchaseFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        self.range.apply_to(qb, "vp.created_at")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleBrandFilter {
    #[serde(flatten)]
    pub range: DateRange,
}

impl Filter for VehicleBrandFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        self.range.apply_to(qb, "v.created_at")
    }
}

// =============================================================================
//  CUSTOMERS / SUPPLIERS / ORDERS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub customer_type: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl Filter for CustomerFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        qb.add_equal("c.is_active", self.is_active.unwrap_or(true));
        if let Some(search) = non_blank(&self.search) {
            qb.add_like("c.name", search);
        }
        if let Some(kind) = non_blank(&self.customer_type) {
            qb.add_equal("c.customer_type", parse_enum::<CustomerType>(kind)?);
        }
        apply_sort(qb, &self.sort_by, &self.sort_order, customer_sort_column, "c.created_at", "c.id DESC")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    pub search: Option<String>,
    pub supplier_type: Option<String>,
    pub country: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl Filter for SupplierFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        qb.add_equal("s.is_active", self.is_active.unwrap_or(true));
        if let Some(search) = non_blank(&self.search) {
            qb.add_like("s.name", search);
        }
        if let Some(kind) = non_blank(&self.supplier_type) {
            qb.add_equal("s.supplier_type", parse_enum::<SupplierType>(kind)?);
        }
        if let Some(country) = non_blank(&self.country) {
            qb.add_equal("s.country", country);
        }
        apply_sort(qb, &self.sort_by, &self.sort_order, supplier_sort_column, "s.created_at", "s.id DESC")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub order_status: Option<String>,
    pub customer_id: Option<i64>,
    pub priority: Option<String>,
}

impl Filter for OrderFilter {
    fn apply(&self, qb: &mut QueryBuilder) -> Result<(), AppError> {
        if let Some(status) = non_blank(&self.order_status) {
            qb.add_equal("o.order_status", parse_enum::<OrderStatus>(status)?);
        }
        if let Some(customer_id) = self.customer_id {
            qb.add_equal("o.customer_id", customer_id);
        }
        if let Some(priority) = non_blank(&self.priority) {
            qb.add_equal("o.priority", parse_enum::<OrderPriority>(priority)?);
        }
        qb.set_order_by("o.created_at", "desc").set_tie_breaker("o.id DESC");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::query_builder::SqlParam;

    fn where_of(filter: &impl Filter) -> (String, Vec<SqlParam>) {
        let qb = filter.to_builder().unwrap();
        let built = qb.build("SELECT 1", None, None, 0, 0, true);
        (built.sql, built.args)
    }

    #[test]
    fn vehicle_filter_maps_s3_query() {
        let filter = VehicleFilter {
            make: Some("Toyota".into()),
            mileage_min: Some(10_000),
            mileage_max: Some(80_000),
            ..Default::default()
        };
        let (sql, args) = where_of(&filter);
        assert_eq!(sql, "SELECT 1 WHERE v.make = $1 AND v.mileage_km BETWEEN $2 AND $3");
        assert_eq!(
            args,
            vec![SqlParam::Text("Toyota".into()), SqlParam::Int(10_000), SqlParam::Int(80_000)]
        );
    }

    #[test]
    fn search_uses_concatenated_expression() {
        let filter = VehicleFilter { search: Some("aqua".into()), ..Default::default() };
        let (sql, args) = where_of(&filter);
        assert_eq!(
            sql,
            "SELECT 1 WHERE (v.make || ' ' || v.model || ' ' || v.chassis_id) ILIKE $1"
        );
        assert_eq!(args, vec![SqlParam::Text("%aqua%".into())]);
    }

    #[test]
    fn shipping_status_filter_keys_off_shipping_status() {
        let filter = VehicleFilter {
            shipping_status: Some("shipped".into()),
            ..Default::default()
        };
        let (sql, args) = where_of(&filter);
        assert_eq!(sql, "SELECT 1 WHERE vs.shipping_status = $1");
        assert_eq!(args, vec![SqlParam::Text("SHIPPED".into())]);
    }

    #[test]
    fn invalid_status_is_rejected() {
        let filter = VehicleFilter { sale_status: Some("GONE".into()), ..Default::default() };
        assert!(matches!(filter.to_builder(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unknown_sort_field_is_rejected_before_the_builder() {
        let filter = VehicleFilter {
            sort_by: Some("v.id; DROP TABLE cars.vehicles".into()),
            ..Default::default()
        };
        let err = filter.to_builder().unwrap_err();
        assert!(err.to_string().contains("Unknown sort field"));
    }

    #[test]
    fn known_sort_field_resolves_with_stable_tie_breaker() {
        let filter = VehicleFilter {
            sort_by: Some("year".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        };
        let qb = filter.to_builder().unwrap();
        let built = qb.build("SELECT 1", None, None, 0, 0, false);
        assert_eq!(built.sql, "SELECT 1 ORDER BY v.year_of_manufacture ASC, v.id DESC");
    }

    #[test]
    fn inverted_mileage_bounds_are_rejected() {
        let filter = VehicleFilter {
            mileage_min: Some(90_000),
            mileage_max: Some(10_000),
            ..Default::default()
        };
        assert!(filter.to_builder().is_err());
    }

    #[test]
    fn single_mileage_bound_uses_min_or_max() {
        let min_only = VehicleFilter { mileage_min: Some(5), ..Default::default() };
        assert_eq!(where_of(&min_only).0, "SELECT 1 WHERE v.mileage_km >= $1");
        let max_only = VehicleFilter { mileage_max: Some(5), ..Default::default() };
        assert_eq!(where_of(&max_only).0, "SELECT 1 WHERE v.mileage_km <= $1");
    }

    #[test]
    fn date_range_variants() {
        let both = VehicleShippingFilter {
            range: DateRange { start: Some("2024-01-01".into()), end: Some("2024-01-31".into()) },
        };
        let (sql, args) = where_of(&both);
        assert_eq!(sql, "SELECT 1 WHERE vs.created_at BETWEEN $1 AND $2");
        assert_eq!(
            args[0],
            SqlParam::Timestamp("2024-01-01T00:00:00Z".parse().unwrap())
        );
        assert_eq!(
            args[1],
            SqlParam::Timestamp("2024-01-31T23:59:59.999999Z".parse().unwrap())
        );

        let start_only = VehicleSalesFilter {
            range: DateRange { start: Some("2024-01-01".into()), end: None },
        };
        assert_eq!(where_of(&start_only).0, "SELECT 1 WHERE vsa.created_at >= $1");

        let end_only = VehicleFinancialFilter {
            range: DateRange { start: None, end: Some("2024-01-01".into()) },
        };
        assert_eq!(where_of(&end_only).0, "SELECT 1 WHERE vf.created_at <= $1");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let bad = VehicleShippingFilter {
            range: DateRange { start: Some("01/02/2024".into()), end: None },
        };
        let err = bad.to_builder().unwrap_err();
        assert!(err.to_string().contains("dateRangeStart"));
    }

    #[test]
    fn customer_filter_defaults_to_active_rows() {
        let (sql, args) = where_of(&CustomerFilter::default());
        assert_eq!(sql, "SELECT 1 WHERE c.is_active = $1");
        assert_eq!(args, vec![SqlParam::Bool(true)]);
    }

    #[test]
    fn date_range_deserializes_from_camel_case_params() {
        let filter: VehicleShippingFilter =
            serde_json::from_value(serde_json::json!({"dateRangeStart": "2024-02-01"})).unwrap();
        assert_eq!(filter.range.start.as_deref(), Some("2024-02-01"));
    }
}

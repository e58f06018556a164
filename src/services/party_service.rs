// src/services/party_service.rs

//! Customers and suppliers.

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        filters::{CustomerFilter, Filter, SupplierFilter},
        pagination::{PageParams, Paginated},
    },
    db::{CustomerRepository, SupplierRepository},
    models::{
        auth::CurrentUser,
        customer::{Customer, CustomerRequest, CustomerValues},
        enums::CustomerType,
        supplier::{Supplier, SupplierRequest, SupplierValues, DEFAULT_SUPPLIER_COUNTRY},
    },
    services::notification::{
        customer_ref, supplier_ref, Notification, NotificationPriority, NotificationService,
    },
};

pub const SEARCH_LIMIT: i64 = 20;

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn search_term(term: &str) -> Result<&str, AppError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest("Search term is required".to_string()));
    }
    Ok(term)
}

pub fn customer_values(req: CustomerRequest) -> Result<CustomerValues, AppError> {
    let customer_type = match trimmed(req.customer_type) {
        Some(raw) => raw.parse()?,
        None => CustomerType::Individual,
    };

    Ok(CustomerValues {
        name: req.name.trim().to_string(),
        title: trimmed(req.title),
        contact_number: trimmed(req.contact_number),
        email: trimmed(req.email),
        address: trimmed(req.address),
        other_contacts: trimmed(req.other_contacts),
        customer_type,
        notes: trimmed(req.notes),
    })
}

pub fn supplier_values(req: SupplierRequest) -> Result<SupplierValues, AppError> {
    Ok(SupplierValues {
        name: req.name.trim().to_string(),
        title: trimmed(req.title),
        contact_number: trimmed(req.contact_number),
        email: trimmed(req.email),
        address: trimmed(req.address),
        other_contacts: trimmed(req.other_contacts),
        supplier_type: req.supplier_type.parse()?,
        country: trimmed(req.country).unwrap_or_else(|| DEFAULT_SUPPLIER_COUNTRY.to_string()),
        notes: trimmed(req.notes),
    })
}

// =============================================================================
//  CUSTOMERS
// =============================================================================

#[derive(Clone)]
pub struct CustomerService {
    pool: PgPool,
    repo: CustomerRepository,
    notifier: NotificationService,
}

impl CustomerService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self {
            pool,
            repo: CustomerRepository::new(),
            notifier,
        }
    }

    fn notify(&self, kind: &str, customer: &Customer, user: &CurrentUser, priority: NotificationPriority) {
        self.notifier.dispatch(
            Notification::new(
                kind,
                customer_ref(customer.id),
                json!({
                    "customer_id": customer.id,
                    "name": customer.name,
                    "customer_type": customer.customer_type,
                }),
                Some(&user.id),
            )
            .with_priority(priority),
        );
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn create(&self, req: CustomerRequest, user: &CurrentUser) -> Result<Customer, AppError> {
        let values = customer_values(req)?;
        let customer = self.repo.insert(&self.pool, &values).await?;
        tracing::info!(customer_id = customer.id, "customer created");
        self.notify("customer_created", &customer, user, NotificationPriority::Normal);
        Ok(customer)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Customer, AppError> {
        self.repo.get_by_id(&self.pool, id).await
    }

    pub async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageParams,
    ) -> Result<Paginated<Customer>, AppError> {
        let qb = filter.to_builder()?;
        let (customers, total) = tokio::try_join!(
            self.repo.list(&self.pool, &qb, page.limit(), page.offset()),
            self.repo.count(&self.pool, &qb),
        )?;
        Ok(Paginated::new(customers, page, total))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Customer>, AppError> {
        let term = search_term(term)?;
        self.repo.search(&self.pool, term, SEARCH_LIMIT).await
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update(
        &self,
        id: i64,
        req: CustomerRequest,
        user: &CurrentUser,
    ) -> Result<Customer, AppError> {
        let values = customer_values(req)?;
        let customer = self.repo.update(&self.pool, id, &values).await?;
        self.notify("customer_updated", &customer, user, NotificationPriority::Normal);
        Ok(customer)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete(&self, id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let customer = self.repo.get_by_id(&self.pool, id).await?;
        self.repo.soft_delete(&self.pool, id).await?;
        tracing::info!(customer_id = id, "customer deactivated");
        self.notify("customer_deleted", &customer, user, NotificationPriority::High);
        Ok(())
    }
}

// =============================================================================
//  SUPPLIERS
// =============================================================================

#[derive(Clone)]
pub struct SupplierService {
    pool: PgPool,
    repo: SupplierRepository,
    notifier: NotificationService,
}

impl SupplierService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self {
            pool,
            repo: SupplierRepository::new(),
            notifier,
        }
    }

    fn notify(&self, kind: &str, supplier: &Supplier, user: &CurrentUser, priority: NotificationPriority) {
        self.notifier.dispatch(
            Notification::new(
                kind,
                supplier_ref(supplier.id),
                json!({
                    "supplier_id": supplier.id,
                    "name": supplier.name,
                    "supplier_type": supplier.supplier_type,
                    "country": supplier.country,
                }),
                Some(&user.id),
            )
            .with_priority(priority),
        );
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn create(&self, req: SupplierRequest, user: &CurrentUser) -> Result<Supplier, AppError> {
        let values = supplier_values(req)?;
        let supplier = self.repo.insert(&self.pool, &values).await?;
        tracing::info!(supplier_id = supplier.id, "supplier created");
        self.notify("supplier_created", &supplier, user, NotificationPriority::Normal);
        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Supplier, AppError> {
        self.repo.get_by_id(&self.pool, id).await
    }

    pub async fn list(
        &self,
        filter: &SupplierFilter,
        page: PageParams,
    ) -> Result<Paginated<Supplier>, AppError> {
        let qb = filter.to_builder()?;
        let (suppliers, total) = tokio::try_join!(
            self.repo.list(&self.pool, &qb, page.limit(), page.offset()),
            self.repo.count(&self.pool, &qb),
        )?;
        Ok(Paginated::new(suppliers, page, total))
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Supplier>, AppError> {
        let term = search_term(term)?;
        self.repo.search(&self.pool, term, SEARCH_LIMIT).await
    }

    #[tracing::instrument(skip(self, req, user), fields(user_id = %user.id))]
    pub async fn update(
        &self,
        id: i64,
        req: SupplierRequest,
        user: &CurrentUser,
    ) -> Result<Supplier, AppError> {
        let values = supplier_values(req)?;
        let supplier = self.repo.update(&self.pool, id, &values).await?;
        self.notify("supplier_updated", &supplier, user, NotificationPriority::Normal);
        Ok(supplier)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete(&self, id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let supplier = self.repo.get_by_id(&self.pool, id).await?;
        self.repo.soft_delete(&self.pool, id).await?;
        tracing::info!(supplier_id = id, "supplier deactivated");
        self.notify("supplier_deleted", &supplier, user, NotificationPriority::High);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SupplierType;

    fn customer(kind: Option<&str>) -> CustomerRequest {
        CustomerRequest {
            name: "  Kamal Silva ".into(),
            title: None,
            contact_number: Some(" 0712345678 ".into()),
            email: Some("".into()),
            address: None,
            other_contacts: None,
            customer_type: kind.map(str::to_string),
            notes: None,
        }
    }

    fn supplier(kind: &str, country: Option<&str>) -> SupplierRequest {
        SupplierRequest {
            name: "USS Nagoya".into(),
            title: None,
            contact_number: None,
            email: None,
            address: None,
            other_contacts: None,
            supplier_type: kind.into(),
            country: country.map(str::to_string),
            notes: None,
        }
    }

    #[test]
    fn customer_defaults_to_individual() {
        let values = customer_values(customer(None)).unwrap();
        assert_eq!(values.customer_type, CustomerType::Individual);
        assert_eq!(values.name, "Kamal Silva");
        assert_eq!(values.contact_number.as_deref(), Some("0712345678"));
        assert_eq!(values.email, None);
    }

    #[test]
    fn customer_type_is_validated() {
        assert_eq!(
            customer_values(customer(Some("business"))).unwrap().customer_type,
            CustomerType::Business
        );
        assert!(matches!(
            customer_values(customer(Some("GOVERNMENT"))),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn supplier_country_defaults() {
        let values = supplier_values(supplier("AUCTION", None)).unwrap();
        assert_eq!(values.country, DEFAULT_SUPPLIER_COUNTRY);
        assert_eq!(values.supplier_type, SupplierType::Auction);
        assert_eq!(supplier_values(supplier("dealer", Some("Korea"))).unwrap().country, "Korea");
    }

    #[test]
    fn supplier_type_is_required_and_validated() {
        assert!(supplier_values(supplier("BROKER", None)).is_err());
        assert!(supplier_values(supplier("", None)).is_err());
    }

    #[test]
    fn blank_search_is_rejected() {
        assert!(search_term("   ").is_err());
        assert_eq!(search_term(" toy ").unwrap(), "toy");
    }
}

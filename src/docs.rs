// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common::pagination::PageMeta;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "car-service", description = "Vehicle import and resale back office"),
    paths(
        crate::health,

        // --- Vehicles ---
        handlers::vehicles::list_vehicles,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::get_vehicle,
        handlers::vehicles::update_vehicle,
        handlers::vehicles::delete_vehicle,
        handlers::vehicles::set_featured,

        // --- Shipping ---
        handlers::status::get_shipping,
        handlers::status::update_shipping,
        handlers::status::get_shipping_history,
        handlers::status::add_shipping_history,
        handlers::status::recent_shipping_history,
        handlers::status::shipping_history_by_status,
        handlers::status::current_shipping_statuses,

        // --- Purchase ---
        handlers::status::get_purchase,
        handlers::status::update_purchase,
        handlers::status::get_purchase_history,
        handlers::status::add_purchase_history,
        handlers::status::recent_purchase_history,
        handlers::status::purchase_history_by_status,
        handlers::status::current_purchase_statuses,

        // --- Financials / Sales ---
        handlers::sales::get_financials,
        handlers::sales::update_financials,
        handlers::sales::get_sales,
        handlers::sales::update_sales,

        // --- Media ---
        handlers::media::upload_images,
        handlers::media::image_url,
        handlers::media::list_images,
        handlers::media::set_primary_image,
        handlers::media::delete_image,
        handlers::media::upload_document,
        handlers::media::list_documents,
        handlers::media::delete_document,

        // --- Catalog ---
        handlers::catalog::list_makes,
        handlers::catalog::create_make,
        handlers::catalog::get_make,
        handlers::catalog::update_make,
        handlers::catalog::delete_make,
        handlers::catalog::list_models,
        handlers::catalog::create_model,
        handlers::catalog::get_model,
        handlers::catalog::update_model,
        handlers::catalog::delete_model,

        // --- Customers ---
        handlers::parties::list_customers,
        handlers::parties::search_customers,
        handlers::parties::create_customer,
        handlers::parties::get_customer,
        handlers::parties::update_customer,
        handlers::parties::delete_customer,

        // --- Suppliers ---
        handlers::parties::list_suppliers,
        handlers::parties::search_suppliers,
        handlers::parties::create_supplier,
        handlers::parties::get_supplier,
        handlers::parties::update_supplier,
        handlers::parties::delete_supplier,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,

        // --- Analytics ---
        handlers::analytics::shipping_status,
        handlers::analytics::purchase_status,
        handlers::analytics::sales_status,
        handlers::analytics::vehicle_brand_status,
        handlers::analytics::financial_summary,

        // --- Share ---
        handlers::share::create_share,
        handlers::share::list_shares,
        handlers::share::deactivate_share,
        handlers::share::public_share,
    ),
    components(
        schemas(
            PageMeta,

            // --- Enums ---
            models::enums::ConditionStatus,
            models::enums::Currency,
            models::enums::ShippingStatus,
            models::enums::PurchaseStatus,
            models::enums::SaleStatus,
            models::enums::DocumentType,
            models::enums::CustomerType,
            models::enums::SupplierType,
            models::enums::OrderStatus,
            models::enums::OrderPriority,
            models::enums::ShippingMethod,

            // --- Vehicles ---
            models::vehicle::Vehicle,
            models::vehicle::VehicleShipping,
            models::vehicle::VehicleFinancials,
            models::vehicle::VehicleSales,
            models::vehicle::VehiclePurchase,
            models::vehicle::VehicleImage,
            models::vehicle::VehicleComplete,
            models::vehicle::CreateVehicleRequest,
            models::vehicle::FeaturedRequest,
            models::vehicle::UpdateShippingRequest,
            models::vehicle::UpdatePurchaseRequest,
            models::vehicle::UpdateFinancialsRequest,
            models::vehicle::UpdateSalesRequest,
            models::vehicle::ImageUploadError,
            models::vehicle::ImageUploadResult,
            models::vehicle::PresignedUrl,
            handlers::media::ImageUploadForm,
            handlers::media::DocumentUploadForm,

            // --- History ---
            models::history::StatusHistory,
            models::history::ManualHistoryRequest,

            // --- Documents ---
            models::document::VehicleDocument,
            models::document::VehicleDocumentView,

            // --- Share ---
            models::share::VehicleShareToken,
            models::share::CreateShareRequest,
            models::share::ShareTokenResponse,
            models::share::PublicVehicleView,
            models::share::PublicShipping,
            models::share::PublicFinancial,
            models::share::PublicPurchase,
            models::share::PublicImage,

            // --- Parties / orders ---
            models::customer::Customer,
            models::customer::CustomerRequest,
            models::supplier::Supplier,
            models::supplier::SupplierRequest,
            models::order::CustomerOrder,
            models::order::CreateOrderRequest,
            models::order::UpdateOrderStatusRequest,

            // --- Catalog ---
            models::catalog::VehicleMake,
            models::catalog::VehicleModel,
            models::catalog::MakeRequest,
            models::catalog::ModelRequest,

            // --- Analytics ---
            models::analytics::StatusCount,
            models::analytics::FinancialSummary,
        )
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Vehicles", description = "Vehicle records and their aggregates"),
        (name = "Shipping", description = "Shipping status and history"),
        (name = "Purchase", description = "Purchase status and history"),
        (name = "Financials", description = "Import cost breakdown"),
        (name = "Sales", description = "Sale status and buyer"),
        (name = "Media", description = "Vehicle images and documents"),
        (name = "Catalog", description = "Makes and models"),
        (name = "Customers", description = "Buyers"),
        (name = "Suppliers", description = "Auctions, dealers and private sellers"),
        (name = "Orders", description = "Customer sourcing requests"),
        (name = "Analytics", description = "Dashboard aggregates"),
        (name = "Share", description = "Public vehicle links")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/car-service/api/v1/vehicles"));
        assert!(doc.paths.paths.contains_key("/car-service/api/v1/share/vehicle/public/{token}"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(components.schemas.contains_key("VehicleComplete"));
    }

    #[test]
    fn document_form_example_is_a_known_document_type() {
        let doc = serde_json::to_value(ApiDoc::openapi()).expect("serializable");
        let field = &doc["components"]["schemas"]["DocumentUploadForm"]["properties"]["document_type"];
        let example = field
            .get("example")
            .or_else(|| field["examples"].get(0))
            .and_then(|v| v.as_str())
            .expect("document_type example");
        assert!(example.parse::<models::enums::DocumentType>().is_ok());
    }
}

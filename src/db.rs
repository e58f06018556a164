// src/db.rs

pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod document_repo;
pub use document_repo::VehicleDocumentRepository;
pub mod financials_repo;
pub use financials_repo::VehicleFinancialsRepository;
pub mod history_repo;
pub use history_repo::HistoryRepository;
pub mod image_repo;
pub use image_repo::VehicleImageRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod purchase_repo;
pub use purchase_repo::VehiclePurchaseRepository;
pub mod sales_repo;
pub use sales_repo::VehicleSalesRepository;
pub mod share_repo;
pub use share_repo::VehicleShareTokenRepository;
pub mod shipping_repo;
pub use shipping_repo::VehicleShippingRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod vehicle_repo;
pub use vehicle_repo::VehicleRepository;

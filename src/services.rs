// src/services.rs

pub mod analytics_service;
pub mod auth;
pub mod catalog_service;
pub mod email;
pub mod media_service;
pub mod notification;
pub mod order_service;
pub mod party_service;
pub mod sales_service;
pub mod share_service;
pub mod status_service;
pub mod storage;
pub mod vehicle_service;

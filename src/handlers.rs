// src/handlers.rs

pub mod analytics;
pub mod catalog;
pub mod media;
pub mod orders;
pub mod parties;
pub mod sales;
pub mod share;
pub mod status;
pub mod vehicles;

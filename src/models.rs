// src/models.rs

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod customer;
pub mod document;
pub mod enums;
pub mod history;
pub mod order;
pub mod share;
pub mod supplier;
pub mod vehicle;

// src/common.rs

pub mod error;
pub mod filters;
pub mod pagination;
pub mod query_builder;

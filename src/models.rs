// src/models.rs

pub mod export;
pub mod requests;
pub mod staging;

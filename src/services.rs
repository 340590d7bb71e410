// src/services.rs

pub mod audit_service;
pub mod report_engine;
pub mod report_exporter;
pub mod report_generator;
pub mod report_reader;
pub mod staging_table_manager;
pub mod workbook;

pub use report_engine::ReportEngine;

// src/docs.rs

use utoipa::OpenApi;

use crate::{common, handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Reports ---
        handlers::reports::generate_report,
        handlers::reports::list_report,
        handlers::reports::export_report,
        handlers::reports::audit_report,
        handlers::reports::cleanup_report,
        handlers::reports::drop_report_table,
    ),
    components(
        schemas(
            // --- Staging ---
            models::staging::ReportKind,
            models::staging::SourceLedger,
            models::staging::AccountingBook,
            models::staging::ReportStatus,
            models::staging::StagedRow,
            models::staging::AuditInfo,
            models::staging::SourceCount,
            models::staging::GenerationSummary,
            models::requests::ReportPage,
            common::pagination::PaginationMeta,

            // --- Payloads ---
            handlers::reports::GenerateReportPayload,
            handlers::reports::ExportReportPayload,
            handlers::reports::CleanupResponse,
        )
    ),
    tags(
        (name = "Reports", description = "Relatórios contábeis: geração, leitura paginada, exportação e auditoria do staging")
    )
)]
pub struct ApiDoc;

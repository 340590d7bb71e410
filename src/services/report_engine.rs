// src/services/report_engine.rs

use std::{sync::Arc, time::Duration};

use crate::{
    common::{db_utils::with_deadline, error::AppError, pagination::PageRequest},
    db::{SchemaCatalog, StagingStore},
    models::{
        export::ExportedWorkbook,
        requests::{validate_owner, ExportLimits, ExportRequest, GenerationRequest, ReadFilter, ReportPage},
        staging::{AuditInfo, GenerationSummary, ReportKind},
    },
    services::{
        audit_service::AuditService, report_exporter::ReportExporter,
        report_generator::ReportGenerator, report_reader::ReportReader,
        staging_table_manager::StagingTableManager, workbook::WorkbookWriter,
    },
};

/// Fachada do motor de staging: é o que os handlers enxergam.
#[derive(Clone)]
pub struct ReportEngine {
    manager: StagingTableManager,
    generator: ReportGenerator,
    reader: ReportReader,
    exporter: ReportExporter,
    audit: AuditService,
}

impl ReportEngine {
    pub fn new(
        store: Arc<dyn StagingStore>,
        writer: Arc<dyn WorkbookWriter>,
        deadline: Duration,
        limits: ExportLimits,
    ) -> Self {
        // --- Monta o gráfico de dependências ---
        let manager = StagingTableManager::new(store, SchemaCatalog::new(), deadline);
        let generator = ReportGenerator::new(manager.clone());
        let reader = ReportReader::new(manager.clone());
        let exporter = ReportExporter::new(generator.clone(), reader.clone(), writer, limits);
        let audit = AuditService::new(manager.clone());

        Self {
            manager,
            generator,
            reader,
            exporter,
            audit,
        }
    }

    pub async fn ensure_and_regenerate(&self, request: &GenerationRequest) -> Result<GenerationSummary, AppError> {
        self.generator.regenerate(request).await
    }

    pub async fn page(&self, kind: ReportKind, filter: &ReadFilter, page: PageRequest) -> Result<ReportPage, AppError> {
        self.reader.page(kind, filter, page).await
    }

    pub async fn count(&self, kind: ReportKind, filter: &ReadFilter) -> Result<i64, AppError> {
        self.reader.count(kind, filter).await
    }

    pub async fn export(&self, request: &ExportRequest) -> Result<ExportedWorkbook, AppError> {
        self.exporter.export(request).await
    }

    pub async fn info(&self, tenant: &str, kind: ReportKind, owner: &str) -> Result<AuditInfo, AppError> {
        self.audit.info(tenant, kind, owner).await
    }

    /// Remove as linhas do dono; a tabela continua.
    pub async fn cleanup(&self, tenant: &str, kind: ReportKind, owner: &str) -> Result<u64, AppError> {
        let owner = validate_owner(owner)?;
        let table = self.manager.resolve(tenant, kind)?;

        if !self.manager.exists(&table).await? {
            return Ok(0);
        }
        let removed = with_deadline(
            self.manager.deadline(),
            self.manager.store().delete_rows(&table, &owner),
        )
        .await?;

        tracing::info!(tenant = %tenant, owner = %owner, kind = %kind, "🧹 {} linhas removidas", removed);
        Ok(removed)
    }

    pub async fn drop_table(&self, tenant: &str, kind: ReportKind) -> Result<(), AppError> {
        self.manager.drop_table(tenant, kind).await
    }
}

// src/db/staging_store.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    db::{predicate::Predicate, schema_catalog::TenantSchema},
    models::{
        requests::GenerationScope,
        staging::{AuditInfo, ReportKind, SourceLedger, StagedRow},
    },
};

/// Identidade de uma tabela de staging: (schema do conjunto, tipo de relatório).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTable {
    pub schema: Arc<TenantSchema>,
    pub kind: ReportKind,
}

impl StagingTable {
    pub fn new(schema: Arc<TenantSchema>, kind: ReportKind) -> Self {
        Self { schema, kind }
    }

    pub fn qualified_name(&self) -> String {
        self.schema.qualify(self.kind.table_name())
    }
}

/// Tudo o que o motor precisa do banco. Cada chamada é uma ida ao banco.
#[async_trait]
pub trait StagingStore: Send + Sync {
    async fn table_exists(&self, table: &StagingTable) -> Result<bool, AppError>;

    /// Cria tabela e índice. Se outra requisição criou antes, devolve
    /// `AppError::StagingTableExists`.
    async fn create_table(&self, table: &StagingTable) -> Result<(), AppError>;

    async fn drop_table(&self, table: &StagingTable) -> Result<(), AppError>;

    async fn delete_rows(&self, table: &StagingTable, owner: &str) -> Result<u64, AppError>;

    /// Um INSERT … SELECT da fonte para o escopo; devolve as linhas inseridas.
    async fn populate(
        &self,
        table: &StagingTable,
        source: SourceLedger,
        scope: &GenerationScope,
    ) -> Result<u64, AppError>;

    async fn count_rows(&self, table: &StagingTable, predicate: &Predicate) -> Result<i64, AppError>;

    async fn fetch_rows(
        &self,
        table: &StagingTable,
        predicate: &Predicate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StagedRow>, AppError>;

    async fn audit(&self, table: &StagingTable, owner: &str) -> Result<AuditInfo, AppError>;
}

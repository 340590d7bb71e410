// src/services/report_reader.rs

use crate::{
    common::{
        db_utils::with_deadline,
        error::AppError,
        pagination::{PageRequest, PaginationMeta, MAX_PAGE_SIZE},
    },
    db::predicate::Predicate,
    models::{
        requests::{validate_owner, ReadFilter, ReportPage},
        staging::{ReportKind, StagedRow},
    },
    services::staging_table_manager::StagingTableManager,
};

#[derive(Clone)]
pub struct ReportReader {
    manager: StagingTableManager,
}

impl ReportReader {
    pub fn new(manager: StagingTableManager) -> Self {
        Self { manager }
    }

    fn predicate(&self, kind: ReportKind, filter: &ReadFilter) -> Result<Predicate, AppError> {
        if let Some(owner) = &filter.owner {
            validate_owner(owner)?;
        }
        Predicate::for_filter(kind, filter)
    }

    pub async fn count(&self, kind: ReportKind, filter: &ReadFilter) -> Result<i64, AppError> {
        let predicate = self.predicate(kind, filter)?;
        let table = self.manager.resolve(&filter.tenant, kind)?;

        // Tabela ainda não criada = relatório vazio.
        if !self.manager.exists(&table).await? {
            return Ok(0);
        }
        with_deadline(
            self.manager.deadline(),
            self.manager.store().count_rows(&table, &predicate),
        )
        .await
    }

    /// Contagem e página saem do mesmo predicado.
    pub async fn page(
        &self,
        kind: ReportKind,
        filter: &ReadFilter,
        page: PageRequest,
    ) -> Result<ReportPage, AppError> {
        page.check(MAX_PAGE_SIZE)?;
        let predicate = self.predicate(kind, filter)?;
        let table = self.manager.resolve(&filter.tenant, kind)?;

        if !self.manager.exists(&table).await? {
            return Ok(ReportPage {
                data: Vec::new(),
                pagination: PaginationMeta::new(page, 0),
            });
        }

        let deadline = self.manager.deadline();
        let store = self.manager.store();

        let total = with_deadline(deadline, store.count_rows(&table, &predicate)).await?;
        let data = if total > page.offset() {
            with_deadline(
                deadline,
                store.fetch_rows(&table, &predicate, page.limit(), page.offset()),
            )
            .await?
        } else {
            Vec::new()
        };

        Ok(ReportPage {
            data,
            pagination: PaginationMeta::new(page, total),
        })
    }

    /// Primeiras `limit` linhas na ordem do relatório (usado pela exportação).
    pub async fn first_rows(
        &self,
        kind: ReportKind,
        filter: &ReadFilter,
        limit: usize,
    ) -> Result<Vec<StagedRow>, AppError> {
        let predicate = self.predicate(kind, filter)?;
        let table = self.manager.resolve(&filter.tenant, kind)?;

        if !self.manager.exists(&table).await? {
            return Ok(Vec::new());
        }
        with_deadline(
            self.manager.deadline(),
            self.manager
                .store()
                .fetch_rows(&table, &predicate, limit as i64, 0),
        )
        .await
    }
}

// src/services/staging_table_manager.rs

use std::{sync::Arc, time::Duration};

use crate::{
    common::{db_utils::with_deadline, error::AppError},
    db::{SchemaCatalog, StagingStore, StagingTable},
    models::staging::ReportKind,
};

/// Ciclo de vida das tabelas de staging. Também é o ponto de acesso ao store
/// para os demais serviços (com o prazo aplicado).
#[derive(Clone)]
pub struct StagingTableManager {
    store: Arc<dyn StagingStore>,
    catalog: SchemaCatalog,
    deadline: Duration,
}

impl StagingTableManager {
    pub fn new(store: Arc<dyn StagingStore>, catalog: SchemaCatalog, deadline: Duration) -> Self {
        Self {
            store,
            catalog,
            deadline,
        }
    }

    pub fn store(&self) -> &dyn StagingStore {
        self.store.as_ref()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Valida o conjunto e monta a identidade da tabela. Não toca o banco.
    pub fn resolve(&self, tenant: &str, kind: ReportKind) -> Result<StagingTable, AppError> {
        let schema = self.catalog.resolve(tenant)?;
        Ok(StagingTable::new(schema, kind))
    }

    pub async fn exists(&self, table: &StagingTable) -> Result<bool, AppError> {
        with_deadline(self.deadline, self.store.table_exists(table)).await
    }

    /// Garante que a tabela existe. Corrida de criação conta como sucesso;
    /// qualquer outra falha (checagem ou DDL) sobe.
    pub async fn ensure_table(&self, table: &StagingTable) -> Result<(), AppError> {
        if self.exists(table).await? {
            return Ok(());
        }

        match with_deadline(self.deadline, self.store.create_table(table)).await {
            Ok(()) => {
                tracing::info!(
                    tenant = %table.schema.tenant,
                    kind = %table.kind,
                    "🧱 Tabela de staging {} criada",
                    table.qualified_name()
                );
                Ok(())
            }
            Err(AppError::StagingTableExists(name)) => {
                tracing::debug!("Tabela {} criada por outra requisição", name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn drop_table(&self, tenant: &str, kind: ReportKind) -> Result<(), AppError> {
        let table = self.resolve(tenant, kind)?;
        with_deadline(self.deadline, self.store.drop_table(&table)).await?;
        tracing::warn!(tenant = %tenant, kind = %kind, "🗑️ Tabela {} removida", table.qualified_name());
        Ok(())
    }
}

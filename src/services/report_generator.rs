// src/services/report_generator.rs

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::{db_utils::with_deadline, error::AppError},
    db::StagingTable,
    models::{
        requests::{GenerationRequest, GenerationScope},
        staging::{GenerationSummary, ReportKind, SourceCount, SourceLedger},
    },
    services::staging_table_manager::StagingTableManager,
};

// (schema, dono, tipo)
type GenerationKey = (String, String, ReportKind);

/// Referência ao lock de uma chave. Ao sair de escopo (inclusive quando o
/// future é cancelado) a entrada some do mapa se ninguém mais a usa.
struct LockLease<'a> {
    locks: &'a DashMap<GenerationKey, Arc<Mutex<()>>>,
    key: GenerationKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        // Mapa + este lease.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 2);
    }
}

#[derive(Clone)]
pub struct ReportGenerator {
    manager: StagingTableManager,
    // Serializa regenerações do mesmo dono/tipo dentro do processo.
    locks: Arc<DashMap<GenerationKey, Arc<Mutex<()>>>>,
}

impl ReportGenerator {
    pub fn new(manager: StagingTableManager) -> Self {
        Self {
            manager,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Apaga as linhas do dono e repopula fonte por fonte.
    ///
    /// Se uma fonte falha depois de outra ter terminado, as linhas já inseridas
    /// ficam e o erro é `PartialGeneration`. O chamador repete a regeneração
    /// inteira; nunca se retoma do meio.
    pub async fn regenerate(&self, request: &GenerationRequest) -> Result<GenerationSummary, AppError> {
        // 1. Validação (antes de qualquer ida ao banco)
        let scope = request.scope()?;
        let table = self.manager.resolve(&request.tenant, request.kind)?;

        let key = (table.schema.schema.clone(), scope.owner.clone(), request.kind);
        let lease = self.lease(key);

        let _guard = lease.lock.lock().await;

        tracing::info!(
            tenant = %request.tenant,
            owner = %scope.owner,
            kind = %request.kind,
            "🔄 Regenerando relatório {} a {}",
            scope.period.from,
            scope.period.to
        );

        self.run(request, &table, &scope).await
    }

    fn lease(&self, key: GenerationKey) -> LockLease<'_> {
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        LockLease {
            locks: &self.locks,
            key,
            lock,
        }
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        table: &StagingTable,
        scope: &GenerationScope,
    ) -> Result<GenerationSummary, AppError> {
        let store = self.manager.store();
        let deadline = self.manager.deadline();

        // 2. Tabela
        self.manager.ensure_table(table).await?;

        // 3. Limpa só as linhas do dono
        let removed_rows = with_deadline(deadline, store.delete_rows(table, &scope.owner)).await?;
        tracing::debug!(owner = %scope.owner, "{} linhas anteriores removidas", removed_rows);

        // 4. Uma inserção por fonte, em ordem
        let mut completed: Vec<SourceLedger> = Vec::new();
        let mut inserted: Vec<SourceCount> = Vec::new();

        for &source in request.kind.sources() {
            if !scope.status.includes(source) {
                continue;
            }

            match with_deadline(deadline, store.populate(table, source, scope)).await {
                Ok(rows) => {
                    tracing::debug!(kind = %request.kind, source = %source, "{} linhas inseridas", rows);
                    completed.push(source);
                    inserted.push(SourceCount { source, rows });
                }
                Err(cause) if completed.is_empty() => return Err(cause),
                Err(cause) => {
                    tracing::error!(
                        tenant = %request.tenant,
                        owner = %scope.owner,
                        kind = %request.kind,
                        "🔥 Fonte {} falhou após {:?}: {}",
                        source,
                        completed,
                        cause
                    );
                    return Err(AppError::PartialGeneration {
                        kind: request.kind,
                        failed: source,
                        completed,
                        cause: Box::new(cause),
                    });
                }
            }
        }

        let total_inserted: u64 = inserted.iter().map(|s| s.rows).sum();
        tracing::info!(
            tenant = %request.tenant,
            owner = %scope.owner,
            kind = %request.kind,
            "✅ Relatório gerado: {} linhas",
            total_inserted
        );

        Ok(GenerationSummary {
            generation_id: Uuid::new_v4(),
            report_kind: request.kind,
            tenant: table.schema.tenant.clone(),
            owner: scope.owner.clone(),
            removed_rows,
            inserted,
            total_inserted,
            generated_at: Utc::now(),
        })
    }
}

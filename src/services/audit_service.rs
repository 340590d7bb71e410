// src/services/audit_service.rs

use crate::{
    common::{db_utils::with_deadline, error::AppError},
    models::{
        requests::validate_owner,
        staging::{AuditInfo, ReportKind},
    },
    services::staging_table_manager::StagingTableManager,
};

#[derive(Clone)]
pub struct AuditService {
    manager: StagingTableManager,
}

impl AuditService {
    pub fn new(manager: StagingTableManager) -> Self {
        Self { manager }
    }

    pub async fn info(&self, tenant: &str, kind: ReportKind, owner: &str) -> Result<AuditInfo, AppError> {
        let owner = validate_owner(owner)?;
        let table = self.manager.resolve(tenant, kind)?;

        if !self.manager.exists(&table).await? {
            return Ok(AuditInfo::empty(kind, &table.schema.tenant, &owner));
        }

        with_deadline(self.manager.deadline(), self.manager.store().audit(&table, &owner)).await
    }
}

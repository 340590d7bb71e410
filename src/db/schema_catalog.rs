// src/db/schema_catalog.rs

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::Regex;

use crate::common::error::AppError;

// Identificador de conjunto: letra inicial, até 63 caracteres (limite do Postgres).
static TENANT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,62}$").unwrap());

/// Vínculo imutável conjunto → schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSchema {
    pub tenant: String,
    pub schema: String,
}

impl TenantSchema {
    /// Nome do schema entre aspas, seguro para interpolar em SQL.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.schema)
    }

    /// `"schema"."tabela"`. Só recebe nomes estáticos de tabela.
    pub fn qualify(&self, table: &str) -> String {
        format!("{}.\"{}\"", self.quoted(), table)
    }
}

/// Resolve e guarda em cache os schemas por conjunto. Clonar compartilha o cache.
#[derive(Clone, Default)]
pub struct SchemaCatalog {
    bindings: Arc<DashMap<String, Arc<TenantSchema>>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, tenant: &str) -> Result<Arc<TenantSchema>, AppError> {
        let tenant = tenant.trim();

        if let Some(binding) = self.bindings.get(tenant) {
            return Ok(Arc::clone(binding.value()));
        }

        if !TENANT_PATTERN.is_match(tenant) {
            return Err(AppError::InvalidTenant(tenant.to_string()));
        }

        let binding = Arc::new(TenantSchema {
            tenant: tenant.to_string(),
            schema: tenant.to_lowercase(),
        });

        // Se outra task chegou antes, fica a versão dela (os valores são iguais).
        let entry = self
            .bindings
            .entry(tenant.to_string())
            .or_insert_with(|| Arc::clone(&binding));
        Ok(Arc::clone(entry.value()))
    }

    pub fn cached(&self) -> usize {
        self.bindings.len()
    }
}

// src/db/predicate.rs

use sqlx::{Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::layout,
    models::{
        requests::ReadFilter,
        staging::{columns::*, ReportKind},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(String),
    Contains(String),
}

/// Filtro de leitura já validado contra as colunas do tipo. É a única fonte do
/// WHERE: contagem e página usam a mesma instância.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    kind: ReportKind,
    conditions: Vec<(&'static str, Condition)>,
}

impl Predicate {
    pub fn for_filter(kind: ReportKind, filter: &ReadFilter) -> Result<Self, AppError> {
        let mut predicate = Self {
            kind,
            conditions: Vec::new(),
        };

        predicate.add(OWNER, filter.owner.as_deref(), Condition::Equals)?;
        predicate.add(ACCOUNT_CODE, filter.account.as_deref(), Condition::Contains)?;
        predicate.add(
            ACCOUNT_DESCRIPTION,
            filter.account_description.as_deref(),
            Condition::Contains,
        )?;
        predicate.add(COST_CENTER, filter.cost_center.as_deref(), Condition::Contains)?;
        predicate.add(COUNTERPARTY_ID, filter.counterparty_id.as_deref(), Condition::Contains)?;
        predicate.add(ENTRY_TYPE, filter.entry_type.as_deref(), Condition::Contains)?;
        predicate.add(ENTRY_NUMBER, filter.entry_number.as_deref(), Condition::Contains)?;
        predicate.add(SOURCE_MODULE, filter.source_module.as_deref(), Condition::Equals)?;
        predicate.add(
            SOURCE_LEDGER,
            filter.source_ledger.map(|s| s.code()),
            Condition::Equals,
        )?;
        predicate.add(ACCOUNT_STATUS, filter.account_status.as_deref(), Condition::Equals)?;

        Ok(predicate)
    }

    fn add(
        &mut self,
        column: &'static str,
        value: Option<&str>,
        condition: fn(String) -> Condition,
    ) -> Result<(), AppError> {
        // Filtro vazio = sem filtro.
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };
        if !layout::has_column(self.kind, column) {
            return Err(AppError::InvalidRequest(format!(
                "El reporte {} no admite el filtro '{}'.",
                self.kind, column
            )));
        }
        self.conditions.push((column, condition(value.to_string())));
        Ok(())
    }

    #[cfg(test)]
    pub fn conditions(&self) -> &[(&'static str, Condition)] {
        &self.conditions
    }

    /// Acrescenta o WHERE ao builder, com todos os valores como bind.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, (column, condition)) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(*column);
            match condition {
                Condition::Equals(value) => {
                    qb.push(" = ").push_bind(value.clone());
                }
                Condition::Contains(value) => {
                    qb.push(" ILIKE '%' || ")
                        .push_bind(escape_like(value))
                        .push(" || '%' ESCAPE '\\'");
                }
            }
        }
    }

    /// Avaliação em memória com a mesma semântica do SQL.
    #[cfg(test)]
    pub fn matches(&self, row: &crate::models::staging::StagedRow) -> bool {
        use crate::models::export::CellValue;

        self.conditions.iter().all(|(column, condition)| {
            let CellValue::Text(actual) = row.value(column) else {
                return false;
            };
            match condition {
                Condition::Equals(expected) => actual == *expected,
                Condition::Contains(needle) => {
                    actual.to_lowercase().contains(&needle.to_lowercase())
                }
            }
        })
    }
}

/// `%` e `_` digitados pelo usuário são literais.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

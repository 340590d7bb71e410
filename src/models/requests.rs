// src/models/requests.rs

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, pagination::PaginationMeta},
    models::staging::{AccountingBook, ReportKind, ReportStatus, SourceLedger, StagedRow},
};

pub const MAX_OWNER_LEN: usize = 254;

/// Período fechado `[from, to]`, já validado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    /// Limite superior exclusivo usado nas consultas (`fecha < to + 1`).
    pub fn end_exclusive(&self) -> NaiveDate {
        self.to.checked_add_days(Days::new(1)).unwrap_or(self.to)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Pedido de regeneração de um relatório.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: ReportKind,
    pub tenant: String,
    pub owner: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub book: AccountingBook,
    pub status: ReportStatus,
}

impl GenerationRequest {
    /// Valida dono e datas. Nada aqui toca o banco.
    pub fn scope(&self) -> Result<GenerationScope, AppError> {
        let owner = validate_owner(&self.owner)?;

        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(AppError::InvalidRequest(
                    "Las fechas 'desde' y 'hasta' son obligatorias.".into(),
                ))
            }
        };
        if from > to {
            return Err(AppError::InvalidRequest(format!(
                "La fecha inicial ({}) es posterior a la fecha final ({}).",
                from, to
            )));
        }

        Ok(GenerationScope {
            owner,
            period: Period { from, to },
            book: self.book,
            status: self.status,
        })
    }
}

pub fn validate_owner(owner: &str) -> Result<String, AppError> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(AppError::InvalidRequest("El usuario es obligatorio.".into()));
    }
    if owner.chars().count() > MAX_OWNER_LEN {
        return Err(AppError::InvalidRequest(format!(
            "El usuario no puede superar {} caracteres.",
            MAX_OWNER_LEN
        )));
    }
    Ok(owner.to_string())
}

/// Escopo validado que o store usa para popular uma fonte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationScope {
    pub owner: String,
    pub period: Period,
    pub book: AccountingBook,
    pub status: ReportStatus,
}

/// Filtros de leitura. Campos de texto casam por "contém" (sem diferenciar
/// maiúsculas); módulo, fonte e estado da conta casam por igualdade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadFilter {
    pub tenant: String,
    pub owner: Option<String>,
    pub account: Option<String>,
    pub account_description: Option<String>,
    pub cost_center: Option<String>,
    pub counterparty_id: Option<String>,
    pub entry_type: Option<String>,
    pub entry_number: Option<String>,
    pub source_module: Option<String>,
    pub source_ledger: Option<SourceLedger>,
    pub account_status: Option<String>,
}

impl ReadFilter {
    pub fn for_owner(tenant: &str, owner: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            owner: Some(owner.to_string()),
            ..Default::default()
        }
    }
}

/// Exportação = regeneração + leitura limitada.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub generation: GenerationRequest,
    pub max_rows: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLimits {
    pub default_rows: usize,
    pub hard_limit: usize,
}

impl Default for ExportLimits {
    fn default() -> Self {
        Self {
            default_rows: 10_000,
            hard_limit: 50_000,
        }
    }
}

impl ExportLimits {
    pub fn resolve(&self, requested: Option<usize>) -> Result<usize, AppError> {
        match requested {
            None => Ok(self.default_rows.min(self.hard_limit)),
            Some(0) => Err(AppError::InvalidRequest(
                "El máximo de filas debe ser mayor que cero.".into(),
            )),
            Some(n) if n > self.hard_limit => Err(AppError::InvalidRequest(format!(
                "El máximo de filas ({}) supera el límite permitido de {}.",
                n, self.hard_limit
            ))),
            Some(n) => Ok(n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub data: Vec<StagedRow>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(from: Option<NaiveDate>, to: Option<NaiveDate>, owner: &str) -> GenerationRequest {
        GenerationRequest {
            kind: ReportKind::Journal,
            tenant: "ACME".into(),
            owner: owner.into(),
            from,
            to,
            book: AccountingBook::default(),
            status: ReportStatus::default(),
        }
    }

    #[test]
    fn single_day_period_is_valid() {
        let day = date(2024, 1, 31);
        let scope = request(Some(day), Some(day), "alice").scope().unwrap();
        assert_eq!(scope.period.end_exclusive(), date(2024, 2, 1));
        assert!(scope.period.contains(day));
    }

    #[test]
    fn missing_or_inverted_dates_are_rejected() {
        assert!(request(None, Some(date(2024, 1, 1)), "alice").scope().is_err());
        assert!(request(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)), "alice")
            .scope()
            .is_err());
    }

    #[test]
    fn owner_must_be_present_and_bounded() {
        let day = Some(date(2024, 1, 1));
        assert!(request(day, day, "  ").scope().is_err());
        assert!(request(day, day, &"x".repeat(MAX_OWNER_LEN + 1)).scope().is_err());
        assert_eq!(request(day, day, " alice ").scope().unwrap().owner, "alice");
    }

    #[test]
    fn export_cap_defaults_and_bounds() {
        let limits = ExportLimits::default();
        assert_eq!(limits.resolve(None).unwrap(), 10_000);
        assert_eq!(limits.resolve(Some(50_000)).unwrap(), 50_000);
        assert!(limits.resolve(Some(50_001)).is_err());
        assert!(limits.resolve(Some(0)).is_err());
    }
}

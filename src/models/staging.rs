// src/models/staging.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::export::CellValue;

// --- Enums ---

/// Os pipelines de relatório suportados. Cada um tem a sua tabela de staging,
/// com nome físico fixo dentro do schema do conjunto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    GeneralLedger,    // Libro mayor
    Journal,          // Diario de contabilidad
    GroupedMovements, // Movimientos contables agrupados
    ChartOfAccounts,  // Plan contable
    TrialBalance,     // Balance de comprobación
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::GeneralLedger,
        ReportKind::Journal,
        ReportKind::GroupedMovements,
        ReportKind::ChartOfAccounts,
        ReportKind::TrialBalance,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::GeneralLedger => "general-ledger",
            ReportKind::Journal => "journal",
            ReportKind::GroupedMovements => "grouped-movements",
            ReportKind::ChartOfAccounts => "chart-of-accounts",
            ReportKind::TrialBalance => "trial-balance",
        }
    }

    /// Nome físico da tabela de staging (sempre o mesmo para o tipo).
    pub fn table_name(self) -> &'static str {
        match self {
            ReportKind::GeneralLedger => "stg_general_ledger",
            ReportKind::Journal => "stg_journal",
            ReportKind::GroupedMovements => "stg_grouped_movements",
            ReportKind::ChartOfAccounts => "stg_chart_of_accounts",
            ReportKind::TrialBalance => "stg_trial_balance",
        }
    }

    /// Fontes populadas, na ordem de inserção. A ordem define a faixa de
    /// `sequence` de cada fonte (todas as linhas de A antes de B).
    pub fn sources(self) -> &'static [SourceLedger] {
        match self {
            ReportKind::GeneralLedger => &[
                SourceLedger::OpeningBalance,
                SourceLedger::Posted,
                SourceLedger::Pending,
            ],
            ReportKind::Journal => &[SourceLedger::Posted, SourceLedger::Pending],
            ReportKind::GroupedMovements => &[SourceLedger::Pending, SourceLedger::Posted],
            ReportKind::ChartOfAccounts => &[SourceLedger::AccountCatalog],
            ReportKind::TrialBalance => &[SourceLedger::AccountBalance],
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            ReportKind::GeneralLedger => "Libro Mayor",
            ReportKind::Journal => "Diario Contabilidad",
            ReportKind::GroupedMovements => "Movimientos Agrupados",
            ReportKind::ChartOfAccounts => "Plan Contable",
            ReportKind::TrialBalance => "Balance de Comprobación",
        }
    }

    /// Tipos com colunas monetárias levam a linha de totais na exportação.
    pub fn has_totals_row(self) -> bool {
        !matches!(self, ReportKind::ChartOfAccounts)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// De onde veio cada linha do staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceLedger {
    OpeningBalance, // Saldos iniciais (movimentos mayorizados antes do período)
    Posted,         // Mayor (asientos mayorizados)
    Pending,        // Diario (asientos ainda não mayorizados)
    AccountCatalog, // Catálogo de contas
    AccountBalance, // Saldos por conta (inicial + período)
}

impl SourceLedger {
    /// Valor gravado na coluna `source_ledger`.
    pub fn code(self) -> &'static str {
        match self {
            SourceLedger::OpeningBalance => "opening",
            SourceLedger::Posted => "posted",
            SourceLedger::Pending => "pending",
            SourceLedger::AccountCatalog => "catalog",
            SourceLedger::AccountBalance => "balance",
        }
    }
}

impl fmt::Display for SourceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Seletor de contabilidade: 'F' fiscal, 'C' corporativa, 'A' ambas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountingBook {
    #[default]
    Fiscal,
    Corporate,
    All,
}

impl AccountingBook {
    pub fn codes(self) -> &'static [&'static str] {
        match self {
            AccountingBook::Fiscal => &["F", "A"],
            AccountingBook::Corporate => &["C", "A"],
            AccountingBook::All => &["F", "C", "A"],
        }
    }
}

/// Preliminar inclui o diário pendente; oficial só o que já foi mayorizado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Preliminary,
    Official,
}

impl ReportStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Preliminary => "Preliminar",
            ReportStatus::Official => "Oficial",
        }
    }

    pub fn includes(self, source: SourceLedger) -> bool {
        !(self == ReportStatus::Official && source == SourceLedger::Pending)
    }
}

// --- Colunas ---

/// Nomes de coluna das tabelas de staging, compartilhados pelo DDL, pelos
/// predicados e pela exportação.
pub mod columns {
    pub const SEQUENCE: &str = "sequence";
    pub const OWNER: &str = "owner";
    pub const SOURCE_LEDGER: &str = "source_ledger";
    pub const ACCOUNT_CODE: &str = "account_code";
    pub const ACCOUNT_DESCRIPTION: &str = "account_description";
    pub const COST_CENTER: &str = "cost_center";
    pub const COUNTERPARTY_ID: &str = "counterparty_id";
    pub const COUNTERPARTY_NAME: &str = "counterparty_name";
    pub const ENTRY_NUMBER: &str = "entry_number";
    pub const ENTRY_TYPE: &str = "entry_type";
    pub const ENTRY_TYPE_DESCRIPTION: &str = "entry_type_description";
    pub const SOURCE_MODULE: &str = "source_module";
    pub const DOCUMENT_TYPE: &str = "document_type";
    pub const DOCUMENT_NUMBER: &str = "document_number";
    pub const SOURCE_REFERENCE: &str = "source_reference";
    pub const REFERENCE: &str = "reference";
    pub const NOTES: &str = "notes";
    pub const POSTING_DATE: &str = "posting_date";
    pub const DEBIT_LOCAL: &str = "debit_local";
    pub const CREDIT_LOCAL: &str = "credit_local";
    pub const DEBIT_FOREIGN: &str = "debit_foreign";
    pub const CREDIT_FOREIGN: &str = "credit_foreign";
    pub const AMOUNT_LOCAL: &str = "amount_local";
    pub const AMOUNT_FOREIGN: &str = "amount_foreign";
    pub const ACCOUNT_STATUS: &str = "account_status";
    pub const PARENT_ACCOUNT: &str = "parent_account";
    pub const PARENT_DESCRIPTION: &str = "parent_description";
    pub const PERIOD_FROM: &str = "period_from";
    pub const PERIOD_TO: &str = "period_to";
    pub const REPORT_STATUS: &str = "report_status";
    pub const GENERATED_AT: &str = "generated_at";
}

// --- Structs ---

/// Uma linha desnormalizada do staging. Colunas que o tipo de relatório não
/// carrega voltam como `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StagedRow {
    #[schema(example = 1)]
    pub sequence: i64,
    #[schema(example = "alice")]
    pub owner: String,
    #[schema(example = "posted")]
    pub source_ledger: String,

    #[schema(example = "01.1.1.1.004")]
    pub account_code: String,
    #[schema(example = "Caja general")]
    pub account_description: Option<String>,
    pub cost_center: Option<String>,
    pub counterparty_id: Option<String>,
    pub counterparty_name: Option<String>,

    #[schema(example = "CG00001234")]
    pub entry_number: Option<String>,
    pub entry_type: Option<String>,
    pub entry_type_description: Option<String>,
    #[schema(example = "CP")]
    pub source_module: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub source_reference: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-01-15")]
    pub posting_date: Option<NaiveDate>,

    // Valores
    #[schema(example = "1500.00")]
    pub debit_local: Option<Decimal>,
    pub credit_local: Option<Decimal>,
    pub debit_foreign: Option<Decimal>,
    pub credit_foreign: Option<Decimal>,
    #[schema(example = "-150.00")]
    pub amount_local: Option<Decimal>, // COALESCE(débito, crédito * -1)
    pub amount_foreign: Option<Decimal>,

    // Plano de contas
    pub account_status: Option<String>,
    pub parent_account: Option<String>,
    pub parent_description: Option<String>,

    // Geração
    #[schema(value_type = Option<String>, format = Date)]
    pub period_from: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub period_to: Option<NaiveDate>,
    pub report_status: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl StagedRow {
    /// Valor de uma coluna pelo nome; usado pela exportação.
    pub fn value(&self, column: &str) -> CellValue {
        use columns::*;

        let text = |v: &Option<String>| match v {
            Some(s) => CellValue::Text(s.clone()),
            None => CellValue::Empty,
        };
        let money = |v: &Option<Decimal>| v.map(CellValue::Money).unwrap_or(CellValue::Empty);
        let date = |v: &Option<NaiveDate>| v.map(CellValue::Date).unwrap_or(CellValue::Empty);

        match column {
            SEQUENCE => CellValue::Integer(self.sequence),
            OWNER => CellValue::Text(self.owner.clone()),
            SOURCE_LEDGER => CellValue::Text(self.source_ledger.clone()),
            ACCOUNT_CODE => CellValue::Text(self.account_code.clone()),
            ACCOUNT_DESCRIPTION => text(&self.account_description),
            COST_CENTER => text(&self.cost_center),
            COUNTERPARTY_ID => text(&self.counterparty_id),
            COUNTERPARTY_NAME => text(&self.counterparty_name),
            ENTRY_NUMBER => text(&self.entry_number),
            ENTRY_TYPE => text(&self.entry_type),
            ENTRY_TYPE_DESCRIPTION => text(&self.entry_type_description),
            SOURCE_MODULE => text(&self.source_module),
            DOCUMENT_TYPE => text(&self.document_type),
            DOCUMENT_NUMBER => text(&self.document_number),
            SOURCE_REFERENCE => text(&self.source_reference),
            REFERENCE => text(&self.reference),
            NOTES => text(&self.notes),
            POSTING_DATE => date(&self.posting_date),
            DEBIT_LOCAL => money(&self.debit_local),
            CREDIT_LOCAL => money(&self.credit_local),
            DEBIT_FOREIGN => money(&self.debit_foreign),
            CREDIT_FOREIGN => money(&self.credit_foreign),
            AMOUNT_LOCAL => money(&self.amount_local),
            AMOUNT_FOREIGN => money(&self.amount_foreign),
            ACCOUNT_STATUS => text(&self.account_status),
            PARENT_ACCOUNT => text(&self.parent_account),
            PARENT_DESCRIPTION => text(&self.parent_description),
            PERIOD_FROM => date(&self.period_from),
            PERIOD_TO => date(&self.period_to),
            REPORT_STATUS => text(&self.report_status),
            GENERATED_AT => CellValue::Text(self.generated_at.to_rfc3339()),
            _ => CellValue::Empty,
        }
    }
}

/// Diagnóstico do staging de um dono. Ausência de linhas não é erro: tudo zerado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    pub report_kind: ReportKind,
    #[schema(example = "ACME")]
    pub tenant: String,
    #[schema(example = "alice")]
    pub owner: String,
    #[schema(example = 5)]
    pub total_rows: i64,
    #[schema(value_type = Option<String>, format = Date)]
    pub first_posting_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub last_posting_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub period_from: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub period_to: Option<NaiveDate>,
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl AuditInfo {
    pub fn empty(kind: ReportKind, tenant: &str, owner: &str) -> Self {
        Self {
            report_kind: kind,
            tenant: tenant.to_string(),
            owner: owner.to_string(),
            total_rows: 0,
            first_posting_date: None,
            last_posting_date: None,
            period_from: None,
            period_to: None,
            last_generated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceCount {
    pub source: SourceLedger,
    pub rows: u64,
}

/// Resultado de uma regeneração.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub generation_id: Uuid,
    pub report_kind: ReportKind,
    pub tenant: String,
    pub owner: String,
    pub removed_rows: u64,
    pub inserted: Vec<SourceCount>,
    pub total_inserted: u64,
    pub generated_at: DateTime<Utc>,
}

// src/db/layout.rs

use crate::{
    db::schema_catalog::TenantSchema,
    models::staging::{columns::*, ReportKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Identity,
    Text,
    Date,
    Money,
    Timestamp,
}

impl ColumnType {
    fn ddl(self) -> &'static str {
        match self {
            ColumnType::Identity => "BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
            ColumnType::Text => "TEXT",
            ColumnType::Date => "DATE",
            ColumnType::Money => "NUMERIC(32, 12)",
            ColumnType::Timestamp => "TIMESTAMPTZ NOT NULL DEFAULT now()",
        }
    }

    fn cast(self) -> &'static str {
        match self {
            ColumnType::Identity => "BIGINT",
            ColumnType::Text => "TEXT",
            ColumnType::Date => "DATE",
            ColumnType::Money => "NUMERIC",
            ColumnType::Timestamp => "TIMESTAMPTZ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

const fn col(name: &'static str, kind: ColumnType) -> Column {
    Column { name, kind }
}

use ColumnType::{Date, Identity, Money, Text, Timestamp};

/// Todas as colunas conhecidas, na ordem em que `StagedRow` é lida.
pub const ALL_COLUMNS: &[Column] = &[
    col(SEQUENCE, Identity),
    col(OWNER, Text),
    col(SOURCE_LEDGER, Text),
    col(ACCOUNT_CODE, Text),
    col(ACCOUNT_DESCRIPTION, Text),
    col(COST_CENTER, Text),
    col(COUNTERPARTY_ID, Text),
    col(COUNTERPARTY_NAME, Text),
    col(ENTRY_NUMBER, Text),
    col(ENTRY_TYPE, Text),
    col(ENTRY_TYPE_DESCRIPTION, Text),
    col(SOURCE_MODULE, Text),
    col(DOCUMENT_TYPE, Text),
    col(DOCUMENT_NUMBER, Text),
    col(SOURCE_REFERENCE, Text),
    col(REFERENCE, Text),
    col(NOTES, Text),
    col(POSTING_DATE, Date),
    col(DEBIT_LOCAL, Money),
    col(CREDIT_LOCAL, Money),
    col(DEBIT_FOREIGN, Money),
    col(CREDIT_FOREIGN, Money),
    col(AMOUNT_LOCAL, Money),
    col(AMOUNT_FOREIGN, Money),
    col(ACCOUNT_STATUS, Text),
    col(PARENT_ACCOUNT, Text),
    col(PARENT_DESCRIPTION, Text),
    col(PERIOD_FROM, Date),
    col(PERIOD_TO, Date),
    col(REPORT_STATUS, Text),
    col(GENERATED_AT, Timestamp),
];

const MONEY_COLUMNS: &[&str] = &[
    DEBIT_LOCAL,
    CREDIT_LOCAL,
    DEBIT_FOREIGN,
    CREDIT_FOREIGN,
    AMOUNT_LOCAL,
    AMOUNT_FOREIGN,
];

const GENERAL_LEDGER: &[&str] = &[
    SEQUENCE, OWNER, SOURCE_LEDGER, ACCOUNT_CODE, ACCOUNT_DESCRIPTION, COST_CENTER,
    COUNTERPARTY_ID, COUNTERPARTY_NAME, ENTRY_NUMBER, ENTRY_TYPE, SOURCE_MODULE,
    DOCUMENT_TYPE, DOCUMENT_NUMBER, SOURCE_REFERENCE, REFERENCE, NOTES, POSTING_DATE,
    DEBIT_LOCAL, CREDIT_LOCAL, DEBIT_FOREIGN, CREDIT_FOREIGN, AMOUNT_LOCAL, AMOUNT_FOREIGN,
    PERIOD_FROM, PERIOD_TO, REPORT_STATUS, GENERATED_AT,
];

const JOURNAL: &[&str] = &[
    SEQUENCE, OWNER, SOURCE_LEDGER, ACCOUNT_CODE, ACCOUNT_DESCRIPTION, COST_CENTER,
    COUNTERPARTY_ID, COUNTERPARTY_NAME, ENTRY_NUMBER, ENTRY_TYPE, ENTRY_TYPE_DESCRIPTION,
    SOURCE_MODULE, DOCUMENT_TYPE, DOCUMENT_NUMBER, SOURCE_REFERENCE, REFERENCE, NOTES,
    POSTING_DATE, DEBIT_LOCAL, CREDIT_LOCAL, DEBIT_FOREIGN, CREDIT_FOREIGN, AMOUNT_LOCAL,
    AMOUNT_FOREIGN, PERIOD_FROM, PERIOD_TO, REPORT_STATUS, GENERATED_AT,
];

const GROUPED_MOVEMENTS: &[&str] = &[
    SEQUENCE, OWNER, SOURCE_LEDGER, ACCOUNT_CODE, ACCOUNT_DESCRIPTION, COST_CENTER,
    COUNTERPARTY_ID, COUNTERPARTY_NAME, ENTRY_NUMBER, ENTRY_TYPE, SOURCE_MODULE,
    DOCUMENT_TYPE, DOCUMENT_NUMBER, REFERENCE, NOTES, POSTING_DATE, DEBIT_LOCAL,
    CREDIT_LOCAL, DEBIT_FOREIGN, CREDIT_FOREIGN, AMOUNT_LOCAL, AMOUNT_FOREIGN, PERIOD_FROM,
    PERIOD_TO, REPORT_STATUS, GENERATED_AT,
];

const CHART_OF_ACCOUNTS: &[&str] = &[
    SEQUENCE, OWNER, SOURCE_LEDGER, ACCOUNT_CODE, ACCOUNT_DESCRIPTION, ACCOUNT_STATUS,
    PARENT_ACCOUNT, PARENT_DESCRIPTION, PERIOD_FROM, PERIOD_TO, REPORT_STATUS, GENERATED_AT,
];

// Uma linha por conta do catálogo: débitos e créditos somados, saldo em amount_*.
const TRIAL_BALANCE: &[&str] = &[
    SEQUENCE, OWNER, SOURCE_LEDGER, ACCOUNT_CODE, ACCOUNT_DESCRIPTION, ACCOUNT_STATUS,
    PARENT_ACCOUNT, PARENT_DESCRIPTION, DEBIT_LOCAL, CREDIT_LOCAL, DEBIT_FOREIGN,
    CREDIT_FOREIGN, AMOUNT_LOCAL, AMOUNT_FOREIGN, PERIOD_FROM, PERIOD_TO, REPORT_STATUS,
    GENERATED_AT,
];

/// Colunas físicas da tabela de staging de cada tipo.
pub fn columns(kind: ReportKind) -> &'static [&'static str] {
    match kind {
        ReportKind::GeneralLedger => GENERAL_LEDGER,
        ReportKind::Journal => JOURNAL,
        ReportKind::GroupedMovements => GROUPED_MOVEMENTS,
        ReportKind::ChartOfAccounts => CHART_OF_ACCOUNTS,
        ReportKind::TrialBalance => TRIAL_BALANCE,
    }
}

pub fn has_column(kind: ReportKind, column: &str) -> bool {
    columns(kind).contains(&column)
}

fn is_money(column: &str) -> bool {
    MONEY_COLUMNS.contains(&column)
}

/// Colunas monetárias do tipo, na ordem da tabela.
pub fn money_columns(kind: ReportKind) -> Vec<&'static str> {
    columns(kind).iter().copied().filter(|c| is_money(c)).collect()
}

fn definition(name: &str) -> Option<&'static Column> {
    ALL_COLUMNS.iter().find(|c| c.name == name)
}

/// DDL da tabela e do índice `(owner, sequence)`.
pub fn create_table_sql(schema: &TenantSchema, kind: ReportKind) -> Vec<String> {
    let table = schema.qualify(kind.table_name());

    let column_defs: Vec<String> = columns(kind)
        .iter()
        .filter_map(|name| definition(name))
        .map(|c| {
            if c.name == OWNER || c.name == ACCOUNT_CODE || c.name == SOURCE_LEDGER {
                format!("    {} TEXT NOT NULL", c.name)
            } else {
                format!("    {} {}", c.name, c.kind.ddl())
            }
        })
        .collect();

    vec![
        format!("CREATE TABLE {} (\n{}\n)", table, column_defs.join(",\n")),
        format!(
            "CREATE INDEX IF NOT EXISTS ix_{name}_owner_seq ON {table} (owner, sequence)",
            name = kind.table_name(),
            table = table,
        ),
    ]
}

/// Lista do SELECT na ordem de `ALL_COLUMNS`; o que o tipo não tem volta NULL tipado.
pub fn select_list(kind: ReportKind) -> String {
    ALL_COLUMNS
        .iter()
        .map(|c| {
            if has_column(kind, c.name) {
                c.name.to_string()
            } else {
                format!("NULL::{} AS {}", c.kind.cast(), c.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Expressão de coluna para agregações: NULL tipado se o tipo não a carrega.
pub fn column_or_null(kind: ReportKind, column: &str) -> String {
    match definition(column) {
        Some(c) if has_column(kind, column) => c.name.to_string(),
        Some(c) => format!("NULL::{}", c.kind.cast()),
        None => "NULL".to_string(),
    }
}

/// Chave de ordenação de negócio; `sequence` é sempre o desempate final.
pub fn order_columns(kind: ReportKind) -> &'static [&'static str] {
    match kind {
        ReportKind::GeneralLedger => &[ACCOUNT_CODE, POSTING_DATE, SEQUENCE],
        ReportKind::Journal => &[POSTING_DATE, ENTRY_NUMBER, SEQUENCE],
        ReportKind::GroupedMovements => &[ACCOUNT_CODE, COUNTERPARTY_ID, SEQUENCE],
        ReportKind::ChartOfAccounts | ReportKind::TrialBalance => &[ACCOUNT_CODE, SEQUENCE],
    }
}

pub fn order_by(kind: ReportKind) -> String {
    order_columns(kind).join(", ")
}

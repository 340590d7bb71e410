// src/db/memory_store.rs
//
// Store em memória para os testes dos serviços. Emula as fontes do ERP com as
// mesmas regras dos INSERT … SELECT (sinal, documento, truncamento, ordem) e
// permite injetar falhas por etapa.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{
        layout,
        predicate::Predicate,
        sources::{document_parts, CLOSING_ENTRY_CLASS, GROUPED_TEXT_LIMIT, OPENING_BALANCE_NOTE},
        staging_store::{StagingStore, StagingTable},
    },
    models::{
        export::CellValue,
        requests::GenerationScope,
        staging::{columns::*, AuditInfo, ReportKind, SourceLedger, StagedRow},
    },
};

// ---
// Fixtures
// ---

#[derive(Debug, Clone)]
pub struct Movement {
    pub account: String,
    pub date: NaiveDate,
    pub entry: String,
    pub line: i64,
    pub book: String,
    pub entry_class: Option<String>,
    pub entry_type: Option<String>,
    pub entry_type_description: Option<String>,
    pub module: Option<String>,
    pub source_reference: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub cost_center: Option<String>,
    pub counterparty_id: Option<String>,
    pub counterparty_name: Option<String>,
    pub debit_local: Option<Decimal>,
    pub credit_local: Option<Decimal>,
    pub debit_foreign: Option<Decimal>,
    pub credit_foreign: Option<Decimal>,
}

impl Movement {
    pub fn new(account: &str, date: NaiveDate, entry: &str) -> Self {
        Self {
            account: account.to_string(),
            date,
            entry: entry.to_string(),
            line: 1,
            book: "F".to_string(),
            entry_class: None,
            entry_type: Some("CG".to_string()),
            entry_type_description: Some("Contabilidad general".to_string()),
            module: Some("CG".to_string()),
            source_reference: None,
            reference: None,
            notes: None,
            cost_center: None,
            counterparty_id: None,
            counterparty_name: None,
            debit_local: None,
            credit_local: None,
            debit_foreign: None,
            credit_foreign: None,
        }
    }

    pub fn line(mut self, line: i64) -> Self {
        self.line = line;
        self
    }

    pub fn debit(mut self, local: Decimal) -> Self {
        self.debit_local = Some(local);
        self
    }

    pub fn credit(mut self, local: Decimal) -> Self {
        self.credit_local = Some(local);
        self
    }

    pub fn foreign(mut self, debit: Option<Decimal>, credit: Option<Decimal>) -> Self {
        self.debit_foreign = debit;
        self.credit_foreign = credit;
        self
    }

    pub fn book(mut self, book: &str) -> Self {
        self.book = book.to_string();
        self
    }

    pub fn closing(mut self) -> Self {
        self.entry_class = Some(CLOSING_ENTRY_CLASS.to_string());
        self
    }

    pub fn module(mut self, module: &str, source_reference: &str) -> Self {
        self.module = Some(module.to_string());
        self.source_reference = Some(source_reference.to_string());
        self
    }

    pub fn counterparty(mut self, id: &str, name: &str) -> Self {
        self.counterparty_id = Some(id.to_string());
        self.counterparty_name = Some(name.to_string());
        self
    }

    pub fn cost_center(mut self, cost_center: &str) -> Self {
        self.cost_center = Some(cost_center.to_string());
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub code: String,
    pub description: String,
    pub accepts_data: String,
    pub parent: Option<String>,
}

impl Account {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            accepts_data: "S".to_string(),
            parent: None,
        }
    }

    pub fn under(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }
}

/// Falha injetada: transitória (pool esgotado) ou permanente (erro de protocolo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Transient,
    Permanent,
}

impl Failure {
    fn error(self) -> AppError {
        match self {
            Failure::Transient => AppError::DatabaseError(sqlx::Error::PoolTimedOut),
            Failure::Permanent => {
                AppError::DatabaseError(sqlx::Error::Protocol("falha injetada".to_string()))
            }
        }
    }
}

// ---
// Store
// ---

#[derive(Default)]
struct Table {
    rows: Vec<StagedRow>,
    next_sequence: i64,
}

#[derive(Default)]
struct State {
    tables: HashMap<(String, ReportKind), Table>,
    posted: HashMap<String, Vec<Movement>>,
    pending: HashMap<String, Vec<Movement>>,
    accounts: HashMap<String, Vec<Account>>,

    calls: usize,
    create_race: bool,
    fail_exists: Option<Failure>,
    fail_create: Option<Failure>,
    fail_populate: HashSet<SourceLedger>,
    populate_failure: Option<Failure>,
    populate_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MemoryStagingStore {
    state: Arc<Mutex<State>>,
}

fn key(table: &StagingTable) -> (String, ReportKind) {
    (table.schema.schema.clone(), table.kind)
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_posted(&self, schema: &str, movements: Vec<Movement>) {
        let mut state = self.state.lock().unwrap();
        state.posted.entry(schema.to_string()).or_default().extend(movements);
    }

    pub fn add_pending(&self, schema: &str, movements: Vec<Movement>) {
        let mut state = self.state.lock().unwrap();
        state.pending.entry(schema.to_string()).or_default().extend(movements);
    }

    pub fn add_accounts(&self, schema: &str, accounts: Vec<Account>) {
        let mut state = self.state.lock().unwrap();
        state.accounts.entry(schema.to_string()).or_default().extend(accounts);
    }

    /// O próximo CREATE encontra a tabela criada por "outra requisição".
    pub fn simulate_create_race(&self) {
        self.state.lock().unwrap().create_race = true;
    }

    pub fn fail_exists_check(&self, failure: Failure) {
        self.state.lock().unwrap().fail_exists = Some(failure);
    }

    pub fn fail_create(&self, failure: Failure) {
        self.state.lock().unwrap().fail_create = Some(failure);
    }

    pub fn fail_populate(&self, source: SourceLedger, failure: Failure) {
        let mut state = self.state.lock().unwrap();
        state.fail_populate.insert(source);
        state.populate_failure = Some(failure);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_exists = None;
        state.fail_create = None;
        state.fail_populate.clear();
        state.populate_failure = None;
        state.populate_delay = None;
    }

    pub fn slow_populate(&self, delay: Duration) {
        self.state.lock().unwrap().populate_delay = Some(delay);
    }

    /// Número de chamadas feitas ao store.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn has_table(&self, schema: &str, kind: ReportKind) -> bool {
        self.state
            .lock()
            .unwrap()
            .tables
            .contains_key(&(schema.to_string(), kind))
    }

    /// Todas as linhas da tabela, na ordem de inserção.
    pub fn rows(&self, schema: &str, kind: ReportKind) -> Vec<StagedRow> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(&(schema.to_string(), kind))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    fn touch(&self) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state
    }
}

fn missing_table(table: &StagingTable) -> AppError {
    AppError::InvalidRequest(format!("relation {} does not exist", table.qualified_name()))
}

fn signed_amount(debit: Option<Decimal>, credit: Option<Decimal>) -> Option<Decimal> {
    debit.or(credit.map(|c| -c))
}

fn sum(values: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
    values.flatten().fold(None, |acc, v| Some(acc.unwrap_or(Decimal::ZERO) + v))
}

fn truncate(value: Option<String>) -> Option<String> {
    value.map(|v| v.chars().take(GROUPED_TEXT_LIMIT).collect())
}

fn cmp_nulls_last(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
        (CellValue::Empty, _) => Ordering::Greater,
        (_, CellValue::Empty) => Ordering::Less,
        (CellValue::Text(x), CellValue::Text(y)) => x.cmp(y),
        (CellValue::Date(x), CellValue::Date(y)) => x.cmp(y),
        (CellValue::Integer(x), CellValue::Integer(y)) => x.cmp(y),
        (CellValue::Money(x), CellValue::Money(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn blank_row(owner: &str, source: SourceLedger, account: &str, scope: &GenerationScope) -> StagedRow {
    StagedRow {
        sequence: 0,
        owner: owner.to_string(),
        source_ledger: source.code().to_string(),
        account_code: account.to_string(),
        account_description: None,
        cost_center: None,
        counterparty_id: None,
        counterparty_name: None,
        entry_number: None,
        entry_type: None,
        entry_type_description: None,
        source_module: None,
        document_type: None,
        document_number: None,
        source_reference: None,
        reference: None,
        notes: None,
        posting_date: None,
        debit_local: None,
        credit_local: None,
        debit_foreign: None,
        credit_foreign: None,
        amount_local: None,
        amount_foreign: None,
        account_status: None,
        parent_account: None,
        parent_description: None,
        period_from: Some(scope.period.from),
        period_to: Some(scope.period.to),
        report_status: Some(scope.status.label().to_string()),
        generated_at: Utc::now(),
    }
}

/// Zera as colunas que o tipo não carrega, como o SELECT com NULL tipado.
fn project(kind: ReportKind, mut row: StagedRow) -> StagedRow {
    let keep = |c: &str| layout::has_column(kind, c);
    if !keep(COST_CENTER) { row.cost_center = None; }
    if !keep(COUNTERPARTY_ID) { row.counterparty_id = None; }
    if !keep(COUNTERPARTY_NAME) { row.counterparty_name = None; }
    if !keep(ENTRY_NUMBER) { row.entry_number = None; }
    if !keep(ENTRY_TYPE) { row.entry_type = None; }
    if !keep(ENTRY_TYPE_DESCRIPTION) { row.entry_type_description = None; }
    if !keep(SOURCE_MODULE) { row.source_module = None; }
    if !keep(DOCUMENT_TYPE) { row.document_type = None; }
    if !keep(DOCUMENT_NUMBER) { row.document_number = None; }
    if !keep(SOURCE_REFERENCE) { row.source_reference = None; }
    if !keep(REFERENCE) { row.reference = None; }
    if !keep(NOTES) { row.notes = None; }
    if !keep(POSTING_DATE) { row.posting_date = None; }
    row
}

fn movement_rows(
    kind: ReportKind,
    source: SourceLedger,
    scope: &GenerationScope,
    movements: &[Movement],
    accounts: &[Account],
) -> Vec<StagedRow> {
    let books = scope.book.codes();
    let describe = |code: &str| {
        accounts
            .iter()
            .find(|a| a.code == code)
            .map(|a| a.description.clone())
    };

    let mut selected: Vec<&Movement> = movements
        .iter()
        .filter(|m| books.contains(&m.book.as_str()))
        .filter(|m| scope.period.contains(m.date))
        .filter(|m| {
            kind != ReportKind::GeneralLedger
                || m.entry_class.as_deref() != Some(CLOSING_ENTRY_CLASS)
        })
        .collect();

    selected.sort_by(|a, b| match kind {
        ReportKind::GeneralLedger => (&a.account, a.date, &a.entry, a.line)
            .cmp(&(&b.account, b.date, &b.entry, b.line)),
        ReportKind::GroupedMovements => (&a.account, &a.counterparty_id, a.date, a.line)
            .cmp(&(&b.account, &b.counterparty_id, b.date, b.line)),
        _ => (a.date, &a.entry, a.line).cmp(&(b.date, &b.entry, b.line)),
    });

    selected
        .into_iter()
        .map(|m| {
            let (document_type, document_number) =
                document_parts(m.module.as_deref(), m.source_reference.as_deref());
            let mut row = blank_row(&scope.owner, source, &m.account, scope);
            row.account_description = describe(&m.account);
            row.cost_center = m.cost_center.clone();
            row.counterparty_id = m.counterparty_id.clone();
            row.counterparty_name = m.counterparty_name.clone();
            row.entry_number = Some(m.entry.clone());
            row.entry_type = m.entry_type.clone();
            row.entry_type_description = m.entry_type_description.clone();
            row.source_module = m.module.clone();
            row.document_type = document_type;
            row.document_number = document_number;
            row.source_reference = m.source_reference.clone();
            row.reference = m.reference.clone();
            row.notes = m.notes.clone();
            row.posting_date = Some(m.date);
            row.debit_local = m.debit_local;
            row.credit_local = m.credit_local;
            row.debit_foreign = m.debit_foreign;
            row.credit_foreign = m.credit_foreign;
            row.amount_local = signed_amount(m.debit_local, m.credit_local);
            row.amount_foreign = signed_amount(m.debit_foreign, m.credit_foreign);

            if kind == ReportKind::GroupedMovements {
                row.account_code = row.account_code.chars().take(GROUPED_TEXT_LIMIT).collect();
                row.account_description = truncate(row.account_description);
                row.cost_center = truncate(row.cost_center);
                row.counterparty_id = truncate(row.counterparty_id);
                row.counterparty_name = truncate(row.counterparty_name);
                row.entry_number = truncate(row.entry_number);
                row.entry_type = truncate(row.entry_type);
                row.source_module = truncate(row.source_module);
                row.document_type = truncate(row.document_type);
                row.document_number = truncate(row.document_number);
                row.reference = truncate(row.reference);
                row.notes = truncate(row.notes);
            }
            project(kind, row)
        })
        .collect()
}

fn opening_rows(scope: &GenerationScope, movements: &[Movement], accounts: &[Account]) -> Vec<StagedRow> {
    let books = scope.book.codes();
    let mut groups: BTreeMap<(String, Option<String>), Vec<&Movement>> = BTreeMap::new();
    for m in movements.iter().filter(|m| {
        books.contains(&m.book.as_str())
            && m.date < scope.period.from
            && m.entry_class.as_deref() != Some(CLOSING_ENTRY_CLASS)
    }) {
        groups
            .entry((m.account.clone(), m.cost_center.clone()))
            .or_default()
            .push(m);
    }

    let mut keys: Vec<_> = groups.keys().cloned().collect();
    // NULL de centro de custo por último, como no ORDER BY.
    keys.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| match (&a.1, &b.1) {
            (None, None) => Ordering::Equal,
            (None, _) => Ordering::Greater,
            (_, None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(y),
        })
    });

    keys.into_iter()
        .map(|k| {
            let group = &groups[&k];
            let net_local = sum(group.iter().map(|m| signed_amount(m.debit_local, m.credit_local)));
            let net_foreign =
                sum(group.iter().map(|m| signed_amount(m.debit_foreign, m.credit_foreign)));

            let mut row = blank_row(&scope.owner, SourceLedger::OpeningBalance, &k.0, scope);
            row.account_description = accounts
                .iter()
                .find(|a| a.code == k.0)
                .map(|a| a.description.clone());
            row.cost_center = k.1.clone();
            row.notes = Some(OPENING_BALANCE_NOTE.to_string());
            row.posting_date = Some(scope.period.from);
            row.debit_local = net_local.filter(|n| *n >= Decimal::ZERO);
            row.credit_local = net_local.filter(|n| *n < Decimal::ZERO).map(|n| -n);
            row.debit_foreign = net_foreign.filter(|n| *n >= Decimal::ZERO);
            row.credit_foreign = net_foreign.filter(|n| *n < Decimal::ZERO).map(|n| -n);
            row.amount_local = net_local;
            row.amount_foreign = net_foreign;
            row
        })
        .collect()
}

fn catalog_rows(scope: &GenerationScope, accounts: &[Account]) -> Vec<StagedRow> {
    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));

    sorted
        .into_iter()
        .map(|a| {
            let mut row = blank_row(&scope.owner, SourceLedger::AccountCatalog, &a.code, scope);
            row.account_description = Some(a.description.clone());
            row.account_status = Some(a.accepts_data.clone());
            row.parent_account = a.parent.clone();
            row.parent_description = a.parent.as_ref().and_then(|p| {
                accounts.iter().find(|x| &x.code == p).map(|x| x.description.clone())
            });
            row
        })
        .collect()
}

fn trial_balance_rows(
    scope: &GenerationScope,
    posted: &[Movement],
    pending: &[Movement],
    accounts: &[Account],
) -> Vec<StagedRow> {
    let books = scope.book.codes();
    let in_book = |m: &&Movement| books.contains(&m.book.as_str());
    let zero = Decimal::ZERO;
    let or_zero = |v: Option<Decimal>| v.unwrap_or(zero);

    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));

    sorted
        .into_iter()
        .map(|a| {
            // (débito local, crédito local, débito dólar, crédito dólar)
            let mut totals = [zero; 4];

            let before: Vec<&Movement> = posted
                .iter()
                .filter(in_book)
                .filter(|m| m.account == a.code && m.date < scope.period.from)
                .collect();
            if !before.is_empty() {
                let net_local: Decimal = before
                    .iter()
                    .map(|m| or_zero(m.debit_local) - or_zero(m.credit_local))
                    .sum();
                let net_foreign: Decimal = before
                    .iter()
                    .map(|m| or_zero(m.debit_foreign) - or_zero(m.credit_foreign))
                    .sum();
                totals[0] += net_local.max(zero);
                totals[1] += (-net_local).max(zero);
                totals[2] += net_foreign.max(zero);
                totals[3] += (-net_foreign).max(zero);
            }

            let include_pending = scope.status.includes(SourceLedger::Pending);
            let period = posted
                .iter()
                .chain(pending.iter().filter(|_| include_pending))
                .filter(in_book)
                .filter(|m| m.account == a.code && scope.period.contains(m.date));
            for m in period {
                totals[0] += or_zero(m.debit_local);
                totals[1] += or_zero(m.credit_local);
                totals[2] += or_zero(m.debit_foreign);
                totals[3] += or_zero(m.credit_foreign);
            }

            let mut row = blank_row(&scope.owner, SourceLedger::AccountBalance, &a.code, scope);
            row.account_description = Some(a.description.clone());
            row.account_status = Some(a.accepts_data.clone());
            row.parent_account = a.parent.clone();
            row.parent_description = a.parent.as_ref().and_then(|p| {
                accounts.iter().find(|x| &x.code == p).map(|x| x.description.clone())
            });
            row.debit_local = Some(totals[0]);
            row.credit_local = Some(totals[1]);
            row.debit_foreign = Some(totals[2]);
            row.credit_foreign = Some(totals[3]);
            row.amount_local = Some(totals[0] - totals[1]);
            row.amount_foreign = Some(totals[2] - totals[3]);
            row
        })
        .collect()
}

#[async_trait]
impl StagingStore for MemoryStagingStore {
    async fn table_exists(&self, table: &StagingTable) -> Result<bool, AppError> {
        let state = self.touch();
        if let Some(failure) = state.fail_exists {
            return Err(failure.error());
        }
        Ok(state.tables.contains_key(&key(table)))
    }

    async fn create_table(&self, table: &StagingTable) -> Result<(), AppError> {
        let mut state = self.touch();
        if let Some(failure) = state.fail_create {
            return Err(failure.error());
        }
        if state.create_race || state.tables.contains_key(&key(table)) {
            state.create_race = false;
            state.tables.entry(key(table)).or_insert_with(|| Table {
                rows: Vec::new(),
                next_sequence: 1,
            });
            return Err(AppError::StagingTableExists(table.qualified_name()));
        }
        state.tables.insert(
            key(table),
            Table {
                rows: Vec::new(),
                next_sequence: 1,
            },
        );
        Ok(())
    }

    async fn drop_table(&self, table: &StagingTable) -> Result<(), AppError> {
        self.touch().tables.remove(&key(table));
        Ok(())
    }

    async fn delete_rows(&self, table: &StagingTable, owner: &str) -> Result<u64, AppError> {
        let mut state = self.touch();
        let stored = state.tables.get_mut(&key(table)).ok_or_else(|| missing_table(table))?;
        let before = stored.rows.len();
        stored.rows.retain(|r| r.owner != owner);
        Ok((before - stored.rows.len()) as u64)
    }

    async fn populate(
        &self,
        table: &StagingTable,
        source: SourceLedger,
        scope: &GenerationScope,
    ) -> Result<u64, AppError> {
        let delay = self.state.lock().unwrap().populate_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.touch();
        if state.fail_populate.contains(&source) {
            let failure = state.populate_failure.unwrap_or(Failure::Permanent);
            return Err(failure.error());
        }

        let schema = &table.schema.schema;
        let accounts = state.accounts.get(schema).cloned().unwrap_or_default();
        let posted = state.posted.get(schema).cloned().unwrap_or_default();
        let pending = state.pending.get(schema).cloned().unwrap_or_default();

        let rows = match source {
            SourceLedger::Posted => movement_rows(table.kind, source, scope, &posted, &accounts),
            SourceLedger::Pending => movement_rows(table.kind, source, scope, &pending, &accounts),
            SourceLedger::OpeningBalance => opening_rows(scope, &posted, &accounts),
            SourceLedger::AccountCatalog => catalog_rows(scope, &accounts),
            SourceLedger::AccountBalance => trial_balance_rows(scope, &posted, &pending, &accounts),
        };

        let stored = state.tables.get_mut(&key(table)).ok_or_else(|| missing_table(table))?;
        let inserted = rows.len() as u64;
        for mut row in rows {
            row.sequence = stored.next_sequence;
            stored.next_sequence += 1;
            stored.rows.push(row);
        }
        Ok(inserted)
    }

    async fn count_rows(&self, table: &StagingTable, predicate: &Predicate) -> Result<i64, AppError> {
        let state = self.touch();
        let stored = state.tables.get(&key(table)).ok_or_else(|| missing_table(table))?;
        Ok(stored.rows.iter().filter(|r| predicate.matches(r)).count() as i64)
    }

    async fn fetch_rows(
        &self,
        table: &StagingTable,
        predicate: &Predicate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StagedRow>, AppError> {
        let state = self.touch();
        let stored = state.tables.get(&key(table)).ok_or_else(|| missing_table(table))?;

        let order = layout::order_columns(table.kind);
        let mut rows: Vec<StagedRow> = stored
            .rows
            .iter()
            .filter(|r| predicate.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            order
                .iter()
                .map(|c| cmp_nulls_last(&a.value(c), &b.value(c)))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn audit(&self, table: &StagingTable, owner: &str) -> Result<AuditInfo, AppError> {
        let state = self.touch();
        let stored = state.tables.get(&key(table)).ok_or_else(|| missing_table(table))?;
        let rows: Vec<&StagedRow> = stored.rows.iter().filter(|r| r.owner == owner).collect();

        let mut info = AuditInfo::empty(table.kind, &table.schema.tenant, owner);
        info.total_rows = rows.len() as i64;
        info.first_posting_date = rows.iter().filter_map(|r| r.posting_date).min();
        info.last_posting_date = rows.iter().filter_map(|r| r.posting_date).max();
        info.period_from = rows.iter().filter_map(|r| r.period_from).min();
        info.period_to = rows.iter().filter_map(|r| r.period_to).max();
        info.last_generated_at = rows.iter().map(|r| r.generated_at).max();
        Ok(info)
    }
}

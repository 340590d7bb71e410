// src/db/sources.rs
//
// Montagem dos INSERT … SELECT que populam o staging a partir das tabelas do
// ERP (mayor, diario e cadastros). Nomes de schema/tabela vêm de listas fixas;
// todo valor do pedido entra como bind.

use sqlx::{Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::{layout, staging_store::StagingTable},
    models::{
        requests::GenerationScope,
        staging::{columns::*, ReportKind, SourceLedger},
    },
};

/// Módulos cujo `fuente` traz tipo (3) + número (até 20) do documento.
pub const DOCUMENT_MODULES: &[&str] = &["CP", "CB", "CC", "FEE", "IC"];
/// Caixa: tipo (3) + número (até 40).
pub const CASH_MODULE: &str = "CJ";
/// Limite dos textos do relatório de movimentos agrupados.
pub const GROUPED_TEXT_LIMIT: usize = 254;
/// Asientos de fechamento ficam fora do razão.
pub const CLOSING_ENTRY_CLASS: &str = "C";
pub const OPENING_BALANCE_NOTE: &str = "Saldo inicial";

// account_code é NOT NULL no staging; movimento sem conta entra com ''.
const MOVEMENT_ACCOUNT: &str = "COALESCE(m.cuenta_contable, '')";

/// Tipo e número do documento a partir do módulo de origem e do `fuente`.
pub fn document_parts(module: Option<&str>, source_reference: Option<&str>) -> (Option<String>, Option<String>) {
    let (Some(module), Some(reference)) = (module, source_reference) else {
        return (None, None);
    };
    let number_len = if DOCUMENT_MODULES.contains(&module) {
        20
    } else if module == CASH_MODULE {
        40
    } else {
        return (None, None);
    };

    let doc_type: String = reference.chars().take(3).collect();
    let doc_number: String = reference.chars().skip(3).take(number_len).collect();
    (Some(doc_type), Some(doc_number))
}

fn document_sql(module: &str, reference: &str, part: &str) -> String {
    let modules = DOCUMENT_MODULES
        .iter()
        .map(|m| format!("'{}'", m))
        .collect::<Vec<_>>()
        .join(", ");
    let (short, long) = match part {
        DOCUMENT_TYPE => ("FROM 1 FOR 3", "FROM 1 FOR 3"),
        _ => ("FROM 4 FOR 20", "FROM 4 FOR 40"),
    };
    format!(
        "CASE WHEN {module} IN ({modules}) THEN SUBSTRING({reference} {short}) \
         WHEN {module} = '{cash}' THEN SUBSTRING({reference} {long}) END",
        module = module,
        modules = modules,
        reference = reference,
        short = short,
        long = long,
        cash = CASH_MODULE,
    )
}

pub fn signed_amount_sql(debit: &str, credit: &str) -> String {
    format!("COALESCE({}, {} * -1)", debit, credit)
}

// ---
// Expressões
// ---

enum Expr {
    Sql(String),
    Owner,
    Source,
    PeriodFrom,
    PeriodTo,
    Status,
}

fn sql(s: impl Into<String>) -> Expr {
    Expr::Sql(s.into())
}

/// Como cada fonte de movimentos expõe os campos do asiento.
struct MovementSource {
    from: String,
    posting_date: &'static str,
    book: &'static str,
    module: &'static str,
    entry_type: &'static str,
    entry_class: &'static str,
    notes: &'static str,
}

impl MovementSource {
    fn for_source(schema: &str, source: SourceLedger) -> Option<Self> {
        match source {
            // Mayor: os campos do asiento também estão na linha.
            SourceLedger::Posted => Some(Self {
                from: format!(
                    "{s}.mayor m JOIN {s}.asiento_mayorizado h ON h.asiento = m.asiento",
                    s = schema
                ),
                posting_date: "m.fecha",
                book: "m.contabilidad",
                module: "m.origen",
                entry_type: "m.tipo_asiento",
                entry_class: "m.clase_asiento",
                notes: "h.notas",
            }),
            // Diario: cabeçalho em asiento_de_diario, linhas em diario.
            SourceLedger::Pending => Some(Self {
                from: format!(
                    "{s}.asiento_de_diario h JOIN {s}.diario m ON m.asiento = h.asiento",
                    s = schema
                ),
                posting_date: "h.fecha",
                book: "h.contabilidad",
                module: "h.origen",
                entry_type: "h.tipo_asiento",
                entry_class: "h.clase_asiento",
                notes: "h.notas",
            }),
            SourceLedger::OpeningBalance
            | SourceLedger::AccountCatalog
            | SourceLedger::AccountBalance => None,
        }
    }

    fn expr(&self, column: &str) -> Option<Expr> {
        let e = match column {
            OWNER => Expr::Owner,
            SOURCE_LEDGER => Expr::Source,
            PERIOD_FROM => Expr::PeriodFrom,
            PERIOD_TO => Expr::PeriodTo,
            REPORT_STATUS => Expr::Status,
            ACCOUNT_CODE => sql(MOVEMENT_ACCOUNT),
            ACCOUNT_DESCRIPTION => sql("c.descripcion"),
            COST_CENTER => sql("m.centro_costo"),
            COUNTERPARTY_ID => sql("m.nit"),
            COUNTERPARTY_NAME => sql("n.razon_social"),
            ENTRY_NUMBER => sql("m.asiento"),
            ENTRY_TYPE => sql(self.entry_type),
            ENTRY_TYPE_DESCRIPTION => sql("t.descripcion"),
            SOURCE_MODULE => sql(self.module),
            DOCUMENT_TYPE => sql(document_sql(self.module, "m.fuente", DOCUMENT_TYPE)),
            DOCUMENT_NUMBER => sql(document_sql(self.module, "m.fuente", DOCUMENT_NUMBER)),
            SOURCE_REFERENCE => sql("m.fuente"),
            REFERENCE => sql("m.referencia"),
            NOTES => sql(self.notes),
            POSTING_DATE => sql(self.posting_date),
            DEBIT_LOCAL => sql("m.debito_local"),
            CREDIT_LOCAL => sql("m.credito_local"),
            DEBIT_FOREIGN => sql("m.debito_dolar"),
            CREDIT_FOREIGN => sql("m.credito_dolar"),
            AMOUNT_LOCAL => sql(signed_amount_sql("m.debito_local", "m.credito_local")),
            AMOUNT_FOREIGN => sql(signed_amount_sql("m.debito_dolar", "m.credito_dolar")),
            _ => return None,
        };
        Some(e)
    }
}

fn is_text(column: &str) -> bool {
    layout::ALL_COLUMNS
        .iter()
        .any(|c| c.name == column && c.kind == layout::ColumnType::Text)
}

// ---
// Builder
// ---

/// Monta o INSERT … SELECT de uma fonte. Combinações (tipo, fonte) que não
/// existem são erro interno: o gerador só pede as fontes do tipo.
pub fn populate_query(
    table: &StagingTable,
    source: SourceLedger,
    scope: &GenerationScope,
) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    if !table.kind.sources().contains(&source) {
        return Err(AppError::InternalServerError(anyhow::anyhow!(
            "La fuente {} no pertenece al reporte {}",
            source,
            table.kind
        )));
    }

    let schema = table.schema.quoted();
    let target = table.qualified_name();

    match source {
        SourceLedger::Posted | SourceLedger::Pending => {
            let movement = MovementSource::for_source(&schema, source).ok_or_else(|| {
                AppError::InternalServerError(anyhow::anyhow!("Fuente sin movimientos: {}", source))
            })?;
            Ok(movement_query(&target, &schema, table.kind, source, &movement, scope))
        }
        SourceLedger::OpeningBalance => Ok(opening_balance_query(&target, &schema, scope)),
        SourceLedger::AccountCatalog => Ok(catalog_query(&target, &schema, scope)),
        SourceLedger::AccountBalance => Ok(trial_balance_query(&target, &schema, scope)),
    }
}

fn push_insert(
    qb: &mut QueryBuilder<'static, Postgres>,
    target: &str,
    projection: Vec<(&'static str, Expr)>,
    source: SourceLedger,
    scope: &GenerationScope,
) {
    let names: Vec<&str> = projection.iter().map(|(c, _)| *c).collect();
    qb.push(format!("INSERT INTO {} ({}) SELECT ", target, names.join(", ")));

    for (i, (_, expr)) in projection.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        match expr {
            Expr::Sql(s) => {
                qb.push(s);
            }
            Expr::Owner => {
                qb.push_bind(scope.owner.clone());
            }
            Expr::Source => {
                qb.push_bind(source.code());
            }
            Expr::PeriodFrom => {
                qb.push_bind(scope.period.from);
            }
            Expr::PeriodTo => {
                qb.push_bind(scope.period.to);
            }
            Expr::Status => {
                qb.push_bind(scope.status.label());
            }
        }
    }
}

fn push_book_filter(qb: &mut QueryBuilder<'static, Postgres>, column: &str, scope: &GenerationScope) {
    let books: Vec<String> = scope.book.codes().iter().map(|c| c.to_string()).collect();
    qb.push(format!(" {} = ANY(", column)).push_bind(books).push(")");
}

fn movement_query(
    target: &str,
    schema: &str,
    kind: ReportKind,
    source: SourceLedger,
    movement: &MovementSource,
    scope: &GenerationScope,
) -> QueryBuilder<'static, Postgres> {
    let truncate = kind == ReportKind::GroupedMovements;

    // 1. Projeção: só as colunas que o tipo carrega.
    let projection: Vec<(&'static str, Expr)> = layout::columns(kind)
        .iter()
        .filter_map(|column| movement.expr(column).map(|e| (*column, e)))
        .map(|(column, expr)| match expr {
            Expr::Sql(s) if truncate && is_text(column) => {
                (column, sql(format!("LEFT({}, {})", s, GROUPED_TEXT_LIMIT)))
            }
            other => (column, other),
        })
        .collect();

    let mut qb = QueryBuilder::new("");
    push_insert(&mut qb, target, projection, source, scope);

    // 2. Origem + cadastros.
    qb.push(format!(
        " FROM {from} \
         LEFT JOIN {s}.cuenta_contable c ON c.cuenta_contable = m.cuenta_contable \
         LEFT JOIN {s}.nit n ON n.nit = m.nit \
         LEFT JOIN {s}.tipo_asiento t ON t.tipo_asiento = {entry_type}",
        from = movement.from,
        s = schema,
        entry_type = movement.entry_type,
    ));

    // 3. Contabilidade e período (fim exclusivo no dia seguinte).
    qb.push(" WHERE");
    push_book_filter(&mut qb, movement.book, scope);
    qb.push(format!(" AND {} >= ", movement.posting_date))
        .push_bind(scope.period.from);
    qb.push(format!(" AND {} < ", movement.posting_date))
        .push_bind(scope.period.end_exclusive());

    if kind == ReportKind::GeneralLedger {
        qb.push(format!(
            " AND COALESCE({}, '') <> '{}'",
            movement.entry_class, CLOSING_ENTRY_CLASS
        ));
    }

    // 4. A ordem do SELECT define a ordem das sequences.
    let order = match kind {
        ReportKind::GeneralLedger => format!("m.cuenta_contable, {}, m.asiento, m.consecutivo", movement.posting_date),
        ReportKind::GroupedMovements => format!("m.cuenta_contable, m.nit, {}, m.consecutivo", movement.posting_date),
        _ => format!("{}, m.asiento, m.consecutivo", movement.posting_date),
    };
    qb.push(format!(" ORDER BY {}", order));

    qb
}

/// Saldo anterior ao período, uma linha por conta/centro de custo.
fn opening_balance_query(target: &str, schema: &str, scope: &GenerationScope) -> QueryBuilder<'static, Postgres> {
    let net_local = format!("SUM({})", signed_amount_sql("m.debito_local", "m.credito_local"));
    let net_foreign = format!("SUM({})", signed_amount_sql("m.debito_dolar", "m.credito_dolar"));

    let projection = vec![
        (OWNER, Expr::Owner),
        (SOURCE_LEDGER, Expr::Source),
        (ACCOUNT_CODE, sql(MOVEMENT_ACCOUNT)),
        (ACCOUNT_DESCRIPTION, sql("MAX(c.descripcion)")),
        (COST_CENTER, sql("m.centro_costo")),
        (NOTES, sql(format!("'{}'", OPENING_BALANCE_NOTE))),
        (POSTING_DATE, Expr::PeriodFrom),
        (DEBIT_LOCAL, sql(format!("CASE WHEN {n} >= 0 THEN {n} END", n = net_local))),
        (CREDIT_LOCAL, sql(format!("CASE WHEN {n} < 0 THEN {n} * -1 END", n = net_local))),
        (DEBIT_FOREIGN, sql(format!("CASE WHEN {n} >= 0 THEN {n} END", n = net_foreign))),
        (CREDIT_FOREIGN, sql(format!("CASE WHEN {n} < 0 THEN {n} * -1 END", n = net_foreign))),
        (AMOUNT_LOCAL, sql(net_local.clone())),
        (AMOUNT_FOREIGN, sql(net_foreign.clone())),
        (PERIOD_FROM, Expr::PeriodFrom),
        (PERIOD_TO, Expr::PeriodTo),
        (REPORT_STATUS, Expr::Status),
    ];

    let mut qb = QueryBuilder::new("");
    push_insert(&mut qb, target, projection, SourceLedger::OpeningBalance, scope);

    qb.push(format!(
        " FROM {s}.mayor m LEFT JOIN {s}.cuenta_contable c ON c.cuenta_contable = m.cuenta_contable WHERE",
        s = schema
    ));
    push_book_filter(&mut qb, "m.contabilidad", scope);
    qb.push(" AND m.fecha < ").push_bind(scope.period.from);
    qb.push(format!(" AND COALESCE(m.clase_asiento, '') <> '{}'", CLOSING_ENTRY_CLASS));
    qb.push(" GROUP BY m.cuenta_contable, m.centro_costo ORDER BY m.cuenta_contable, m.centro_costo");

    qb
}

/// Catálogo completo, com a conta de consolidação (pai) e sua descrição.
fn catalog_query(target: &str, schema: &str, scope: &GenerationScope) -> QueryBuilder<'static, Postgres> {
    let projection = vec![
        (OWNER, Expr::Owner),
        (SOURCE_LEDGER, Expr::Source),
        (ACCOUNT_CODE, sql("c.cuenta_contable")),
        (ACCOUNT_DESCRIPTION, sql("c.descripcion")),
        (ACCOUNT_STATUS, sql("c.acepta_datos")),
        (PARENT_ACCOUNT, sql("c.sub_cta_de")),
        (PARENT_DESCRIPTION, sql("p.descripcion")),
        (PERIOD_FROM, Expr::PeriodFrom),
        (PERIOD_TO, Expr::PeriodTo),
        (REPORT_STATUS, Expr::Status),
    ];

    let mut qb = QueryBuilder::new("");
    push_insert(&mut qb, target, projection, SourceLedger::AccountCatalog, scope);
    qb.push(format!(
        " FROM {s}.cuenta_contable c \
         LEFT JOIN {s}.cuenta_contable p ON p.cuenta_contable = c.sub_cta_de \
         ORDER BY c.cuenta_contable",
        s = schema
    ));
    qb
}

/// Balance de comprobação: uma linha por conta do catálogo. O saldo anterior ao
/// período entra como débito (saldo devedor) ou crédito (credor), somado aos
/// movimentos do período; `amount_*` é `SUM(débito - crédito)`. Contas sem
/// movimento saem zeradas.
fn trial_balance_query(target: &str, schema: &str, scope: &GenerationScope) -> QueryBuilder<'static, Postgres> {
    let total = |column: &str| format!("COALESCE(SUM(b.{}), 0)", column);
    let projection = vec![
        (OWNER, Expr::Owner),
        (SOURCE_LEDGER, Expr::Source),
        (ACCOUNT_CODE, sql("c.cuenta_contable")),
        (ACCOUNT_DESCRIPTION, sql("c.descripcion")),
        (ACCOUNT_STATUS, sql("c.acepta_datos")),
        (PARENT_ACCOUNT, sql("c.sub_cta_de")),
        (PARENT_DESCRIPTION, sql("p.descripcion")),
        (DEBIT_LOCAL, sql(total("debito_local"))),
        (CREDIT_LOCAL, sql(total("credito_local"))),
        (DEBIT_FOREIGN, sql(total("debito_dolar"))),
        (CREDIT_FOREIGN, sql(total("credito_dolar"))),
        (AMOUNT_LOCAL, sql("COALESCE(SUM(b.debito_local - b.credito_local), 0)")),
        (AMOUNT_FOREIGN, sql("COALESCE(SUM(b.debito_dolar - b.credito_dolar), 0)")),
        (PERIOD_FROM, Expr::PeriodFrom),
        (PERIOD_TO, Expr::PeriodTo),
        (REPORT_STATUS, Expr::Status),
    ];

    let mut qb = QueryBuilder::new("");
    push_insert(&mut qb, target, projection, SourceLedger::AccountBalance, scope);
    qb.push(format!(
        " FROM {s}.cuenta_contable c \
         LEFT JOIN {s}.cuenta_contable p ON p.cuenta_contable = c.sub_cta_de \
         LEFT JOIN (",
        s = schema
    ));

    // 1. Saldo anterior, quebrado em débito/crédito.
    qb.push(
        "SELECT o.cuenta_contable, \
         CASE WHEN o.net_local > 0 THEN o.net_local ELSE 0 END AS debito_local, \
         CASE WHEN o.net_local < 0 THEN o.net_local * -1 ELSE 0 END AS credito_local, \
         CASE WHEN o.net_dolar > 0 THEN o.net_dolar ELSE 0 END AS debito_dolar, \
         CASE WHEN o.net_dolar < 0 THEN o.net_dolar * -1 ELSE 0 END AS credito_dolar \
         FROM (SELECT m.cuenta_contable, \
         SUM(COALESCE(m.debito_local, 0) - COALESCE(m.credito_local, 0)) AS net_local, \
         SUM(COALESCE(m.debito_dolar, 0) - COALESCE(m.credito_dolar, 0)) AS net_dolar ",
    );
    qb.push(format!("FROM {}.mayor m WHERE", schema));
    push_book_filter(&mut qb, "m.contabilidad", scope);
    qb.push(" AND m.fecha < ").push_bind(scope.period.from);
    qb.push(" GROUP BY m.cuenta_contable) o");

    // 2. Movimentos do período: mayor e, se o status permitir, o diário.
    let movements = |qb: &mut QueryBuilder<'static, Postgres>, from: String, date: &str, book: &str| {
        qb.push(format!(
            " UNION ALL SELECT m.cuenta_contable, \
             COALESCE(m.debito_local, 0), COALESCE(m.credito_local, 0), \
             COALESCE(m.debito_dolar, 0), COALESCE(m.credito_dolar, 0) \
             FROM {} WHERE",
            from
        ));
        push_book_filter(qb, book, scope);
        qb.push(format!(" AND {} >= ", date)).push_bind(scope.period.from);
        qb.push(format!(" AND {} < ", date)).push_bind(scope.period.end_exclusive());
    };
    movements(&mut qb, format!("{}.mayor m", schema), "m.fecha", "m.contabilidad");
    if scope.status.includes(SourceLedger::Pending) {
        movements(
            &mut qb,
            format!("{s}.asiento_de_diario h JOIN {s}.diario m ON m.asiento = h.asiento", s = schema),
            "h.fecha",
            "h.contabilidad",
        );
    }

    qb.push(
        ") b ON b.cuenta_contable = c.cuenta_contable \
         GROUP BY c.cuenta_contable, c.descripcion, c.acepta_datos, c.sub_cta_de, p.descripcion \
         ORDER BY c.cuenta_contable",
    );
    qb
}

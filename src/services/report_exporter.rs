// src/services/report_exporter.rs

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::layout,
    models::{
        export::{CellValue, ExportedWorkbook, SheetData},
        requests::{ExportLimits, ExportRequest, ReadFilter},
        staging::{columns::*, ReportKind, StagedRow},
    },
    services::{
        report_generator::ReportGenerator, report_reader::ReportReader, workbook::WorkbookWriter,
    },
};

pub const TOTAL_LABEL: &str = "TOTAL";

// Colunas técnicas que não vão para a planilha.
const HIDDEN: &[&str] = &[SEQUENCE, OWNER, PERIOD_FROM, PERIOD_TO, GENERATED_AT];

fn header(column: &str) -> &'static str {
    match column {
        SOURCE_LEDGER => "Origen",
        ACCOUNT_CODE => "Cuenta contable",
        ACCOUNT_DESCRIPTION => "Descripción cuenta",
        COST_CENTER => "Centro de costo",
        COUNTERPARTY_ID => "NIT",
        COUNTERPARTY_NAME => "Razón social",
        ENTRY_NUMBER => "Asiento",
        ENTRY_TYPE => "Tipo asiento",
        ENTRY_TYPE_DESCRIPTION => "Descripción tipo asiento",
        SOURCE_MODULE => "Módulo",
        DOCUMENT_TYPE => "Tipo documento",
        DOCUMENT_NUMBER => "Documento",
        SOURCE_REFERENCE => "Fuente",
        REFERENCE => "Referencia",
        NOTES => "Notas",
        POSTING_DATE => "Fecha",
        DEBIT_LOCAL => "Débito local",
        CREDIT_LOCAL => "Crédito local",
        DEBIT_FOREIGN => "Débito dólar",
        CREDIT_FOREIGN => "Crédito dólar",
        AMOUNT_LOCAL => "Monto local",
        AMOUNT_FOREIGN => "Monto dólar",
        ACCOUNT_STATUS => "Acepta datos",
        PARENT_ACCOUNT => "Cuenta padre",
        PARENT_DESCRIPTION => "Descripción cuenta padre",
        REPORT_STATUS => "Tipo de reporte",
        _ => "",
    }
}

/// Colunas exportadas do tipo, na ordem da tabela; a origem vai por último.
pub fn sheet_columns(kind: ReportKind) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = layout::columns(kind)
        .iter()
        .copied()
        .filter(|c| !HIDDEN.contains(c) && *c != SOURCE_LEDGER)
        .collect();
    columns.push(SOURCE_LEDGER);
    columns
}

/// Monta a aba: cabeçalhos, linhas e, para movimentos, uma linha em branco
/// seguida do TOTAL das colunas monetárias.
pub fn build_sheet(kind: ReportKind, rows: &[StagedRow]) -> SheetData {
    let columns = sheet_columns(kind);
    let money = layout::money_columns(kind);
    let headers = columns.iter().map(|c| header(c).to_string()).collect();

    let mut body: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.value(c)).collect())
        .collect();

    if kind.has_totals_row() && !rows.is_empty() {
        let totals = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                if money.contains(column) {
                    let total: Decimal = rows
                        .iter()
                        .filter_map(|row| match row.value(column) {
                            CellValue::Money(value) => Some(value),
                            _ => None,
                        })
                        .sum();
                    CellValue::Money(total)
                } else if i == 0 {
                    CellValue::Text(TOTAL_LABEL.to_string())
                } else {
                    CellValue::Empty
                }
            })
            .collect();

        body.push(vec![CellValue::Empty; columns.len()]);
        body.push(totals);
    }

    SheetData {
        name: kind.sheet_name().to_string(),
        headers,
        rows: body,
    }
}

#[derive(Clone)]
pub struct ReportExporter {
    generator: ReportGenerator,
    reader: ReportReader,
    writer: Arc<dyn WorkbookWriter>,
    limits: ExportLimits,
}

impl ReportExporter {
    pub fn new(
        generator: ReportGenerator,
        reader: ReportReader,
        writer: Arc<dyn WorkbookWriter>,
        limits: ExportLimits,
    ) -> Self {
        Self {
            generator,
            reader,
            writer,
            limits,
        }
    }

    /// Regenera e exporta as primeiras `maxRows` linhas. Sem linhas, a planilha
    /// sai só com os cabeçalhos.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportedWorkbook, AppError> {
        // 1. Validação
        let max_rows = self.limits.resolve(request.max_rows)?;
        let generation = &request.generation;
        let scope = generation.scope()?;

        // 2. Regeneração
        let summary = self.generator.regenerate(generation).await?;

        // 3. Leitura limitada, na ordem do relatório
        let filter = ReadFilter::for_owner(&generation.tenant, &scope.owner);
        let rows = self.reader.first_rows(generation.kind, &filter, max_rows).await?;

        // 4. Planilha
        let sheet = build_sheet(generation.kind, &rows);
        let bytes = self.writer.write(&sheet)?;

        tracing::info!(
            tenant = %generation.tenant,
            owner = %scope.owner,
            kind = %generation.kind,
            "📊 Exportação pronta: {} de {} linhas, {} bytes",
            rows.len(),
            summary.total_inserted,
            bytes.len()
        );

        Ok(ExportedWorkbook {
            file_name: format!(
                "{}_{}_{}_{}.xlsx",
                generation.kind, summary.tenant, scope.period.from, scope.period.to
            ),
            bytes,
            row_count: rows.len(),
        })
    }
}

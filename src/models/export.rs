// src/models/export.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Conteúdo de uma célula da planilha. Valores monetários seguem numéricos.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Money(Decimal),
    Date(NaiveDate),
    Integer(i64),
    Empty,
}

/// Uma aba pronta para serialização: cabeçalhos + linhas já mapeadas.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Planilha serializada, com o nome de arquivo sugerido para download.
#[derive(Debug, Clone)]
pub struct ExportedWorkbook {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

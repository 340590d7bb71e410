// src/services/workbook.rs

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    common::error::AppError,
    models::export::{CellValue, SheetData},
};

/// Serializa uma aba em bytes de planilha.
pub trait WorkbookWriter: Send + Sync {
    fn write(&self, sheet: &SheetData) -> Result<Vec<u8>, AppError>;
}

#[derive(Debug, Clone, Default)]
pub struct XlsxWorkbookWriter;

const MONEY_FORMAT: &str = "#,##0.00";
const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Data → número de série do Excel (dias desde 1899-12-30).
fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

impl WorkbookWriter for XlsxWorkbookWriter {
    fn write(&self, sheet: &SheetData) -> Result<Vec<u8>, AppError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let money_format = Format::new().set_num_format(MONEY_FORMAT);
        let date_format = Format::new().set_num_format(DATE_FORMAT);

        let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (i, row) in sheet.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let c = col as u16;
                match cell {
                    CellValue::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    // Valores monetários seguem numéricos para o usuário somar no Excel.
                    CellValue::Money(d) => {
                        worksheet.write_number_with_format(r, c, d.to_f64().unwrap_or(0.0), &money_format)?;
                    }
                    CellValue::Date(d) => {
                        worksheet.write_number_with_format(r, c, excel_serial(*d), &date_format)?;
                    }
                    CellValue::Integer(n) => {
                        worksheet.write_number(r, c, *n as f64)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }

        worksheet.autofit();

        Ok(workbook.save_to_buffer()?)
    }
}

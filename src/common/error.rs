// src/common/error.rs

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::staging::{ReportKind, SourceLedger};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validações do motor (datas, paginação, filtros) feitas antes de tocar no banco.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Conjunto inválido: '{0}'")]
    InvalidTenant(String),

    // Corrida de CREATE TABLE entre duas requisições. Nunca chega ao cliente:
    // o StagingTableManager absorve como sucesso.
    #[error("La tabla de staging {0} ya existe")]
    StagingTableExists(String),

    #[error("Tiempo de espera agotado después de {0:?}")]
    StoreTimeout(Duration),

    #[error("Generación parcial del reporte {kind}: falló la fuente {failed} (completadas: {completed:?})")]
    PartialGeneration {
        kind: ReportKind,
        failed: SourceLedger,
        completed: Vec<SourceLedger>,
        #[source]
        cause: Box<AppError>,
    },

    #[error("Error de base de datos: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Error al generar la hoja de cálculo: {0}")]
    WorkbookError(#[from] rust_xlsxwriter::XlsxError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Erros transitórios: o chamador pode repetir a operação inteira
    /// (nunca retomar a geração no meio do caminho).
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::StoreTimeout(_) => true,
            AppError::DatabaseError(e) => is_transient_sqlx(e),
            AppError::PartialGeneration { cause, .. } => cause.is_retryable(),
            _ => false,
        }
    }
}

fn is_transient_sqlx(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            // deadlock, serialization failure, query_canceled (statement_timeout), admin shutdown
            Some("40P01") | Some("40001") | Some("57014") | Some("57P01")
        ),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();

        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                    "retryable": false,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidTenant(tenant) => (
                StatusCode::BAD_REQUEST,
                format!("El conjunto '{}' no es un identificador válido.", tenant),
            ),
            AppError::StoreTimeout(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "La base de datos no respondió a tiempo. Vuelva a generar el reporte.".to_string(),
            ),
            ref e @ AppError::PartialGeneration { .. } => {
                tracing::error!("Generación parcial: {}", e);
                let status = if retryable {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    "El reporte quedó con datos parciales. Vuelva a generarlo.".to_string(),
                )
            }
            ref e @ AppError::DatabaseError(_) if retryable => {
                tracing::warn!("Error transitorio de base de datos: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "La base de datos no está disponible. Intente nuevamente.".to_string(),
                )
            }

            // Todos os outros erros viram 500. O `tracing` loga a mensagem detalhada.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message, "retryable": retryable }));
        (status, body).into_response()
    }
}

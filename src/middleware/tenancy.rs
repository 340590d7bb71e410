// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::common::error::AppError;

// Cabeçalhos preenchidos pelo gateway depois da autenticação
pub const TENANT_HEADER: &str = "x-conjunto";
pub const OWNER_HEADER: &str = "x-usuario";

fn required_header(parts: &Parts, name: &str) -> Result<String, AppError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::InvalidRequest(format!("El encabezado {} es obligatorio.", name)))?;

    let value = value.to_str().map_err(|_| {
        AppError::InvalidRequest(format!("El encabezado {} contiene caracteres inválidos.", name))
    })?;

    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "El encabezado {} no puede estar vacío.",
            name
        )));
    }
    Ok(value.to_string())
}

/// O conjunto (tenant) da requisição. A validação do identificador fica com o
/// `SchemaCatalog`.
#[derive(Debug, Clone)]
pub struct TenantContext(pub String);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        required_header(parts, TENANT_HEADER).map(TenantContext)
    }
}

/// O usuário dono das linhas de staging.
#[derive(Debug, Clone)]
pub struct OwnerContext(pub String);

impl<S> FromRequestParts<S> for OwnerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        required_header(parts, OWNER_HEADER).map(OwnerContext)
    }
}

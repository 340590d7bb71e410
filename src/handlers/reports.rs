// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    config::AppState,
    middleware::tenancy::{OwnerContext, TenantContext},
    models::{
        requests::{ExportRequest, GenerationRequest, ReadFilter, ReportPage},
        staging::{AccountingBook, AuditInfo, GenerationSummary, ReportKind, ReportStatus, SourceLedger},
    },
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportPayload {
    #[validate(required(message = "La fecha 'from' es obligatoria."))]
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub from: Option<NaiveDate>,

    #[validate(required(message = "La fecha 'to' es obligatoria."))]
    #[schema(value_type = String, format = Date, example = "2024-01-31")]
    pub to: Option<NaiveDate>,

    #[serde(default)]
    pub book: AccountingBook,

    #[serde(default)]
    pub status: ReportStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportReportPayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub generation: GenerateReportPayload,

    // O teto real (EXPORT_MAX_ROWS) é checado pelo motor.
    #[validate(range(min = 1, message = "maxRows debe ser mayor que cero."))]
    #[schema(example = 10000)]
    pub max_rows: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListReportQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
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

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub report_kind: ReportKind,
    pub removed_rows: u64,
}

fn generation_request(
    kind: ReportKind,
    tenant: TenantContext,
    owner: OwnerContext,
    payload: GenerateReportPayload,
) -> GenerationRequest {
    GenerationRequest {
        kind,
        tenant: tenant.0,
        owner: owner.0,
        from: payload.from,
        to: payload.to,
        book: payload.book,
        status: payload.status,
    }
}

// POST /api/reports/{kind}/generate
#[utoipa::path(
    post,
    path = "/api/reports/{kind}/generate",
    tag = "Reports",
    request_body = GenerateReportPayload,
    responses(
        (status = 200, description = "Staging regenerado para o usuário", body = GenerationSummary),
        (status = 400, description = "Pedido inválido"),
        (status = 503, description = "Falha transitória; repita a geração")
    ),
    params(
        ("kind" = ReportKind, Path, description = "Tipo de relatório"),
        ("x-conjunto" = String, Header, description = "Conjunto (empresa)"),
        ("x-usuario" = String, Header, description = "Usuário dono das linhas")
    )
)]
pub async fn generate_report(
    State(app_state): State<AppState>,
    Path(kind): Path<ReportKind>,
    tenant: TenantContext,
    owner: OwnerContext,
    Json(payload): Json<GenerateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = generation_request(kind, tenant, owner, payload);
    let summary = app_state.engine.ensure_and_regenerate(&request).await?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/reports/{kind}
#[utoipa::path(
    get,
    path = "/api/reports/{kind}",
    tag = "Reports",
    responses(
        (status = 200, description = "Página do relatório", body = ReportPage),
        (status = 400, description = "Paginação ou filtro inválido")
    ),
    params(
        ("kind" = ReportKind, Path, description = "Tipo de relatório"),
        ("x-conjunto" = String, Header, description = "Conjunto (empresa)"),
        ("x-usuario" = String, Header, description = "Usuário dono das linhas"),
        ListReportQuery
    )
)]
pub async fn list_report(
    State(app_state): State<AppState>,
    Path(kind): Path<ReportKind>,
    tenant: TenantContext,
    owner: OwnerContext,
    Query(query): Query<ListReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::validated(query.page, query.limit)?;
    let filter = ReadFilter {
        tenant: tenant.0,
        owner: Some(owner.0),
        account: query.account,
        account_description: query.account_description,
        cost_center: query.cost_center,
        counterparty_id: query.counterparty_id,
        entry_type: query.entry_type,
        entry_number: query.entry_number,
        source_module: query.source_module,
        source_ledger: query.source_ledger,
        account_status: query.account_status,
    };

    let result = app_state.engine.page(kind, &filter, page).await?;
    Ok((StatusCode::OK, Json(result)))
}

// POST /api/reports/{kind}/export
#[utoipa::path(
    post,
    path = "/api/reports/{kind}/export",
    tag = "Reports",
    request_body = ExportReportPayload,
    responses(
        (status = 200, description = "Planilha .xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Pedido inválido ou maxRows acima do limite")
    ),
    params(
        ("kind" = ReportKind, Path, description = "Tipo de relatório"),
        ("x-conjunto" = String, Header, description = "Conjunto (empresa)"),
        ("x-usuario" = String, Header, description = "Usuário dono das linhas")
    )
)]
pub async fn export_report(
    State(app_state): State<AppState>,
    Path(kind): Path<ReportKind>,
    tenant: TenantContext,
    owner: OwnerContext,
    Json(payload): Json<ExportReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = ExportRequest {
        generation: generation_request(kind, tenant, owner, payload.generation),
        max_rows: payload.max_rows,
    };
    let workbook = app_state.engine.export(&request).await?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", workbook.file_name),
        ),
    ];
    Ok((StatusCode::OK, headers, workbook.bytes))
}

// GET /api/reports/{kind}/audit
#[utoipa::path(
    get,
    path = "/api/reports/{kind}/audit",
    tag = "Reports",
    responses(
        (status = 200, description = "Resumo do staging do usuário", body = AuditInfo)
    ),
    params(
        ("kind" = ReportKind, Path, description = "Tipo de relatório"),
        ("x-conjunto" = String, Header, description = "Conjunto (empresa)"),
        ("x-usuario" = String, Header, description = "Usuário dono das linhas")
    )
)]
pub async fn audit_report(
    State(app_state): State<AppState>,
    Path(kind): Path<ReportKind>,
    tenant: TenantContext,
    owner: OwnerContext,
) -> Result<impl IntoResponse, AppError> {
    let info = app_state.engine.info(&tenant.0, kind, &owner.0).await?;
    Ok((StatusCode::OK, Json(info)))
}

// DELETE /api/reports/{kind}/rows
#[utoipa::path(
    delete,
    path = "/api/reports/{kind}/rows",
    tag = "Reports",
    responses(
        (status = 200, description = "Linhas do usuário removidas", body = CleanupResponse)
    ),
    params(
        ("kind" = ReportKind, Path, description = "Tipo de relatório"),
        ("x-conjunto" = String, Header, description = "Conjunto (empresa)"),
        ("x-usuario" = String, Header, description = "Usuário dono das linhas")
    )
)]
pub async fn cleanup_report(
    State(app_state): State<AppState>,
    Path(kind): Path<ReportKind>,
    tenant: TenantContext,
    owner: OwnerContext,
) -> Result<impl IntoResponse, AppError> {
    let removed_rows = app_state.engine.cleanup(&tenant.0, kind, &owner.0).await?;
    Ok((
        StatusCode::OK,
        Json(CleanupResponse {
            report_kind: kind,
            removed_rows,
        }),
    ))
}

// DELETE /api/reports/{kind}/table
#[utoipa::path(
    delete,
    path = "/api/reports/{kind}/table",
    tag = "Reports",
    responses(
        (status = 204, description = "Tabela de staging removida (todas as linhas, de todos os usuários)")
    ),
    params(
        ("kind" = ReportKind, Path, description = "Tipo de relatório"),
        ("x-conjunto" = String, Header, description = "Conjunto (empresa)")
    )
)]
pub async fn drop_report_table(
    State(app_state): State<AppState>,
    Path(kind): Path<ReportKind>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    app_state.engine.drop_table(&tenant.0, kind).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};

use crate::{
    db::PgStagingStore,
    models::requests::ExportLimits,
    services::{workbook::XlsxWorkbookWriter, ReportEngine},
};

/// Configuração lida do ambiente (`.env` incluso).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Duration,
    pub export_limits: ExportLimits,
    pub bind_addr: String,
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let export_limits = ExportLimits {
            default_rows: var_or("EXPORT_DEFAULT_ROWS", 10_000usize)?,
            hard_limit: var_or("EXPORT_MAX_ROWS", 50_000usize)?,
        };

        Ok(Self {
            database_url,
            max_connections: var_or("DB_MAX_CONNECTIONS", 5u32)?,
            acquire_timeout: Duration::from_secs(var_or("DB_ACQUIRE_TIMEOUT_SECS", 3u64)?),
            statement_timeout: Duration::from_secs(var_or("STORE_STATEMENT_TIMEOUT_SECS", 30u64)?),
            export_limits,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub engine: ReportEngine,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // O banco corta o comando um pouco depois do prazo do motor.
        let statement_timeout_ms = settings.statement_timeout.as_millis() + 1_000;

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(format!("SET statement_timeout = {}", statement_timeout_ms).as_str())
                        .await?;
                    Ok(())
                })
            })
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let store = Arc::new(PgStagingStore::new(db_pool.clone()));
        let engine = ReportEngine::new(
            store,
            Arc::new(XlsxWorkbookWriter),
            settings.statement_timeout,
            settings.export_limits,
        );

        Ok(Self { db_pool, engine })
    }
}

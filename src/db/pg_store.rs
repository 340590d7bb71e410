// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::{
        layout,
        predicate::Predicate,
        sources,
        staging_store::{StagingStore, StagingTable},
    },
    models::{
        requests::GenerationScope,
        staging::{columns::*, AuditInfo, SourceLedger, StagedRow},
    },
};

#[derive(Clone)]
pub struct PgStagingStore {
    pool: PgPool,
}

impl PgStagingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    total_rows: i64,
    first_posting_date: Option<NaiveDate>,
    last_posting_date: Option<NaiveDate>,
    period_from: Option<NaiveDate>,
    period_to: Option<NaiveDate>,
    last_generated_at: Option<DateTime<Utc>>,
}

// 42P07 = duplicate_table; 23505 em pg_type quando dois CREATE TABLE correm juntos.
fn is_already_exists(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("42P07") | Some("23505"))
        }
        _ => false,
    }
}

#[async_trait]
impl StagingStore for PgStagingStore {
    async fn table_exists(&self, table: &StagingTable) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM information_schema.tables
                WHERE table_schema = $1 AND table_name = $2
            )
            "#,
        )
        .bind(&table.schema.schema)
        .bind(table.kind.table_name())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_table(&self, table: &StagingTable) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for statement in layout::create_table_sql(&table.schema, table.kind) {
            if let Err(e) = sqlx::query(&statement).execute(&mut *tx).await {
                if is_already_exists(&e) {
                    return Err(AppError::StagingTableExists(table.qualified_name()));
                }
                return Err(e.into());
            }
        }

        tx.commit().await.map_err(|e| {
            if is_already_exists(&e) {
                AppError::StagingTableExists(table.qualified_name())
            } else {
                e.into()
            }
        })
    }

    async fn drop_table(&self, table: &StagingTable) -> Result<(), AppError> {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.qualified_name()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_rows(&self, table: &StagingTable, owner: &str) -> Result<u64, AppError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE owner = $1",
            table.qualified_name()
        ))
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn populate(
        &self,
        table: &StagingTable,
        source: SourceLedger,
        scope: &GenerationScope,
    ) -> Result<u64, AppError> {
        let mut qb = sources::populate_query(table, source, scope)?;
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count_rows(&self, table: &StagingTable, predicate: &Predicate) -> Result<i64, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table.qualified_name()));
        predicate.push_where(&mut qb);

        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn fetch_rows(
        &self,
        table: &StagingTable,
        predicate: &Predicate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StagedRow>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            layout::select_list(table.kind),
            table.qualified_name()
        ));
        predicate.push_where(&mut qb);
        qb.push(format!(" ORDER BY {}", layout::order_by(table.kind)));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb.build_query_as::<StagedRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn audit(&self, table: &StagingTable, owner: &str) -> Result<AuditInfo, AppError> {
        let kind = table.kind;
        let posting_date = layout::column_or_null(kind, POSTING_DATE);

        let row = sqlx::query_as::<_, AuditRow>(&format!(
            r#"
            SELECT
                COUNT(*) AS total_rows,
                MIN({posting}) AS first_posting_date,
                MAX({posting}) AS last_posting_date,
                MIN(period_from) AS period_from,
                MAX(period_to) AS period_to,
                MAX(generated_at) AS last_generated_at
            FROM {table}
            WHERE owner = $1
            "#,
            posting = posting_date,
            table = table.qualified_name(),
        ))
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(AuditInfo {
            report_kind: kind,
            tenant: table.schema.tenant.clone(),
            owner: owner.to_string(),
            total_rows: row.total_rows,
            first_posting_date: row.first_posting_date,
            last_posting_date: row.last_posting_date,
            period_from: row.period_from,
            period_to: row.period_to,
            last_generated_at: row.last_generated_at,
        })
    }
}

//! Direct PostgreSQL store for deployments that skip the REST layer.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{SalesStore, StoreError};
use crate::db;
use crate::models::report::NewReport;
use crate::models::sale::NormalizedSale;

/// Rows per INSERT statement; 10 binds per row stays far below the 65535 limit.
const INSERT_CHUNK_ROWS: usize = 1000;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect, then apply the embedded migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = db::create_pool(database_url, max_connections).await?;
        db::run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SalesStore for PgStore {
    async fn insert_sales(&self, sales: &[NormalizedSale]) -> Result<usize, StoreError> {
        if sales.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for chunk in sales.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO sales (date, order_id, sku, product_name, quantity, \
                 unit_price, total_amount, payment_type, staff, created_at) ",
            );
            builder.push_values(chunk, |mut row, sale| {
                row.push_bind(&sale.date)
                    .push_bind(&sale.order_id)
                    .push_bind(&sale.sku)
                    .push_bind(&sale.product_name)
                    .push_bind(sale.quantity)
                    .push_bind(sale.unit_price)
                    .push_bind(sale.total_amount)
                    .push_bind(&sale.payment_type)
                    .push_bind(&sale.staff)
                    .push_bind(sale.created_at);
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted as usize)
    }

    async fn insert_report(&self, report: &NewReport) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO reports (email, kpis, sample, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&report.email)
        .bind(&report.kpis)
        .bind(&report.sample)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

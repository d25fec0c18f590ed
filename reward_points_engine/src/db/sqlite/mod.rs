//! A durable [`ProcessedOrderStore`] backed by Sqlite.
//!
//! The memory ledger forgets everything on restart. This one survives restarts, so redeliveries that arrive after a
//! redeploy are still recognised as duplicates.
use std::{fmt::Debug, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{
    migrate,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow,
    SqlitePool,
};

use crate::{
    db_types::{AwardRecord, AwardTrigger, CustomerId, OrderId},
    traits::{LedgerError, ProcessedOrderStore},
};

#[derive(Clone)]
pub struct SqliteOrderLedger {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteOrderLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteOrderLedger ({})", self.url)
    }
}

#[derive(FromRow)]
struct ProcessedOrderRow {
    order_id: String,
    customer_id: String,
    trigger: String,
    points_earned: i64,
    points_redeemed: i64,
    balance: i64,
    awarded_at: DateTime<Utc>,
}

impl TryFrom<ProcessedOrderRow> for AwardRecord {
    type Error = LedgerError;

    fn try_from(row: ProcessedOrderRow) -> Result<Self, Self::Error> {
        let trigger = AwardTrigger::from_str(&row.trigger).map_err(|e| LedgerError::DatabaseError(e.to_string()))?;
        Ok(AwardRecord {
            order_id: OrderId(row.order_id),
            customer_id: CustomerId(row.customer_id),
            trigger,
            points_earned: row.points_earned,
            points_redeemed: row.points_redeemed,
            balance: row.balance,
            awarded_at: row.awarded_at,
        })
    }
}

impl SqliteOrderLedger {
    /// Opens (creating if necessary) the database at `url` and brings its schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
        migrate!("./src/db/sqlite/migrations").run(&pool).await.map_err(|e| LedgerError::DatabaseError(e.to_string()))?;
        info!("🗃️ Processed-order ledger opened at {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ProcessedOrderStore for SqliteOrderLedger {
    async fn contains(&self, order_id: &OrderId) -> Result<bool, LedgerError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM processed_orders WHERE order_id = $1")
            .bind(order_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn add(&self, record: AwardRecord) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_orders (
                order_id,
                customer_id,
                trigger,
                points_earned,
                points_redeemed,
                balance,
                awarded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO NOTHING;
            "#,
        )
        .bind(record.order_id.as_str())
        .bind(record.customer_id.as_str())
        .bind(record.trigger.to_string())
        .bind(record.points_earned)
        .bind(record.points_redeemed)
        .bind(record.balance)
        .bind(record.awarded_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::AlreadyRecorded(record.order_id));
        }
        trace!("🗃️ Inserted processed-order row for {}", record.order_id);
        Ok(())
    }

    async fn fetch(&self, order_id: &OrderId) -> Result<Option<AwardRecord>, LedgerError> {
        let row: Option<ProcessedOrderRow> = sqlx::query_as(
            r#"
            SELECT order_id, customer_id, trigger, points_earned, points_redeemed, balance, awarded_at
            FROM processed_orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(AwardRecord::try_from).transpose()
    }
}

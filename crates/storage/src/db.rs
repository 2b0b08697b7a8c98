use std::path::Path;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query::Query, Pool, Sqlite};
use thiserror::Error;

use facture_core::{CellValue, RowRecord};

pub type DbPool = Pool<Sqlite>;

/// Column order of the invoices schema; also the bind order for inserts.
const COLUMNS: [&str; 10] = [
    "invoice_id",
    "customer_name",
    "phone",
    "email",
    "date",
    "vendor",
    "item",
    "quantity",
    "price",
    "total",
];

const INSERT_SQL: &str = "INSERT INTO invoices \
    (invoice_id, customer_name, phone, email, date, vendor, item, quantity, price, total) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// A persisted invoice row, as read back for search and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct InvoiceRow {
    pub invoice_id: String,
    pub customer_name: String,
    pub phone: String,
    pub email: String,
    pub date: String,
    pub vendor: String,
    pub item: String,
    pub quantity: i64,
    pub price: f64,
    pub total: f64,
}

pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), StorageError> {
    // The schema, not the pipeline, is the gatekeeper: every field is
    // required and the numeric checks reject non-positive quantities and
    // amounts. A record that fails here fails its batch, never the process.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            invoice_id TEXT NOT NULL,
            customer_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL,
            date TEXT NOT NULL,
            vendor TEXT NOT NULL,
            item TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            price REAL NOT NULL CHECK (price > 0),
            total REAL NOT NULL CHECK (total > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invoice_date ON invoices(date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invoice_vendor ON invoices(vendor)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert all records of one document in a single transaction. Any record
/// that violates the schema constraints fails the whole batch; nothing from
/// a failed batch is persisted.
pub async fn insert_batch(pool: &DbPool, records: &[RowRecord]) -> Result<u64, StorageError> {
    let mut tx = pool.begin().await?;

    let mut inserted = 0u64;
    for record in records {
        let mut query = sqlx::query(INSERT_SQL);
        for column in COLUMNS {
            query = bind_cell(query, lookup(record, column));
        }
        query.execute(&mut *tx).await?;
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Single-record insert, same constraint behavior as [`insert_batch`].
pub async fn insert_invoice(pool: &DbPool, record: &RowRecord) -> Result<(), StorageError> {
    let mut query = sqlx::query(INSERT_SQL);
    for column in COLUMNS {
        query = bind_cell(query, lookup(record, column));
    }
    query.execute(pool).await?;
    Ok(())
}

/// Case-insensitive substring search over vendor, item, and date, most
/// recent date first.
pub async fn search(pool: &DbPool, query: &str) -> Result<Vec<InvoiceRow>, StorageError> {
    let pattern = format!("%{query}%");
    let rows = sqlx::query_as::<_, InvoiceRow>(
        "SELECT invoice_id, customer_name, phone, email, date, vendor, item, quantity, price, total \
         FROM invoices \
         WHERE vendor LIKE ? OR item LIKE ? OR date LIKE ? \
         ORDER BY date DESC",
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Flat snapshot of every stored invoice, in insertion order.
pub async fn export_all(pool: &DbPool) -> Result<Vec<InvoiceRow>, StorageError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(
        "SELECT invoice_id, customer_name, phone, email, date, vendor, item, quantity, price, total \
         FROM invoices ORDER BY rowid",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Find a record field by schema column name, folding detector-cased header
/// names ("Invoice ID", "Quantity") onto snake_case columns.
fn lookup<'r>(record: &'r RowRecord, column: &str) -> Option<&'r CellValue> {
    record
        .iter()
        .find(|(name, _)| fold_name(name) == column)
        .map(|(_, value)| value)
}

fn fold_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Bind one cell by its coerced type. A missing field or explicit empty
/// marker binds NULL, which the NOT NULL schema rejects — by contract the
/// adapter, not the pipeline, decides whether a record is acceptable.
fn bind_cell<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    cell: Option<&CellValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match cell {
        None | Some(CellValue::Empty) => query.bind(Option::<String>::None),
        Some(CellValue::Int(n)) => query.bind(*n),
        Some(CellValue::Number(d)) => query.bind(d.to_f64()),
        Some(CellValue::Date(d)) => query.bind(d.format("%Y-%m-%d").to_string()),
        Some(CellValue::Text(s)) => query.bind(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    async fn test_db() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("invoices.db")).await.unwrap();
        (dir, pool)
    }

    fn invoice(id: &str, vendor: &str, item: &str, date: &str, qty: i64) -> RowRecord {
        let mut r = RowRecord::new();
        r.insert("invoice_id", CellValue::Text(id.into()));
        r.insert("customer_name", CellValue::Text("Nicholas Murphy".into()));
        r.insert("phone", CellValue::Text("+1-741-505-87".into()));
        r.insert("email", CellValue::Text("nm@example.com".into()));
        r.insert(
            "date",
            CellValue::Date(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
        );
        r.insert("vendor", CellValue::Text(vendor.into()));
        r.insert("item", CellValue::Text(item.into()));
        r.insert("quantity", CellValue::Int(qty));
        r.insert("price", CellValue::Number(Decimal::new(1124, 2)));
        r.insert("total", CellValue::Number(Decimal::new(2248, 2)));
        r
    }

    // ── inserts ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn insert_batch_persists_all_records() {
        let (_dir, pool) = test_db().await;
        let records = vec![
            invoice("1", "Stripe", "Widget A", "2023-03-16", 2),
            invoice("1", "Stripe", "Widget B", "2023-03-16", 3),
        ];
        assert_eq!(insert_batch(&pool, &records).await.unwrap(), 2);
        assert_eq!(export_all(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn detector_cased_headers_bind_to_schema_columns() {
        let (_dir, pool) = test_db().await;
        let mut r = RowRecord::new();
        r.insert("Invoice ID", CellValue::Int(7));
        r.insert("Customer Name", CellValue::Text("Nicholas Murphy".into()));
        r.insert("Phone", CellValue::Text("+1-741-505-87".into()));
        r.insert("Email", CellValue::Text("nm@example.com".into()));
        r.insert("Date", CellValue::Date(NaiveDate::from_ymd_opt(2023, 3, 16).unwrap()));
        r.insert("Vendor", CellValue::Text("PayPal".into()));
        r.insert("Item", CellValue::Text("Widget C".into()));
        r.insert("Quantity", CellValue::Int(2));
        r.insert("Price", CellValue::Number(Decimal::new(1124, 2)));
        r.insert("Total", CellValue::Number(Decimal::new(2248, 2)));
        insert_invoice(&pool, &r).await.unwrap();

        let rows = export_all(&pool).await.unwrap();
        assert_eq!(rows[0].item, "Widget C");
        assert_eq!(rows[0].vendor, "PayPal");
        assert_eq!(rows[0].quantity, 2);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected_by_the_schema() {
        let (_dir, pool) = test_db().await;
        let records = vec![invoice("1", "Stripe", "Widget A", "2023-03-16", 0)];
        let err = insert_batch(&pool, &records).await.unwrap_err();
        assert!(matches!(err, StorageError::Sqlx(_)));
        assert!(export_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_required_field_fails_the_batch() {
        let (_dir, pool) = test_db().await;
        let full = invoice("1", "Stripe", "Widget A", "2023-03-16", 2);
        let incomplete: RowRecord = full
            .iter()
            .filter(|(name, _)| *name != "email")
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        assert!(insert_batch(&pool, &[incomplete]).await.is_err());
    }

    #[tokio::test]
    async fn failed_batch_persists_nothing() {
        let (_dir, pool) = test_db().await;
        let records = vec![
            invoice("1", "Stripe", "Widget A", "2023-03-16", 2),
            invoice("1", "Stripe", "Widget B", "2023-03-16", 0),
        ];
        assert!(insert_batch(&pool, &records).await.is_err());
        assert!(export_all(&pool).await.unwrap().is_empty());
    }

    // ── search ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn search_is_case_insensitive_over_vendor_item_date() {
        let (_dir, pool) = test_db().await;
        let records = vec![
            invoice("1", "Stripe", "Widget A", "2023-03-16", 2),
            invoice("2", "PayPal", "Widget B", "2023-05-25", 1),
        ];
        insert_batch(&pool, &records).await.unwrap();

        assert_eq!(search(&pool, "stripe").await.unwrap().len(), 1);
        assert_eq!(search(&pool, "widget").await.unwrap().len(), 2);
        assert_eq!(search(&pool, "2023-05").await.unwrap().len(), 1);
        assert!(search(&pool, "ebay").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_orders_most_recent_date_first() {
        let (_dir, pool) = test_db().await;
        let records = vec![
            invoice("1", "Stripe", "Widget A", "2023-03-16", 2),
            invoice("2", "Stripe", "Widget B", "2023-05-25", 1),
        ];
        insert_batch(&pool, &records).await.unwrap();

        let rows = search(&pool, "stripe").await.unwrap();
        assert_eq!(rows[0].date, "2023-05-25");
        assert_eq!(rows[1].date, "2023-03-16");
    }

    // ── name folding ─────────────────────────────────────────────────────────

    #[test]
    fn fold_name_normalizes_case_and_spaces() {
        assert_eq!(fold_name("Invoice ID"), "invoice_id");
        assert_eq!(fold_name("  Customer Name "), "customer_name");
        assert_eq!(fold_name("quantity"), "quantity");
    }
}

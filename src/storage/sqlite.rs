use crate::model::{
    AlignedRow, AlignedTable, ChangeRecord, Commodity, LatestPrice, SeriesSummary, StorageError,
};
use crate::storage::{FetchStatus, PriceRepository, StoredChange};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and runs migrations.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::init(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS commodity_prices (
                commodity TEXT NOT NULL,
                price_date TEXT NOT NULL,
                price_value REAL NOT NULL,
                updated_at TEXT,
                PRIMARY KEY (commodity, price_date)
            );

            CREATE INDEX IF NOT EXISTS idx_commodity_prices_date
                ON commodity_prices(price_date);

            CREATE TABLE IF NOT EXISTS change_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                summary TEXT NOT NULL,
                details TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS fetch_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commodity TEXT NOT NULL,
                status TEXT NOT NULL,
                records INTEGER NOT NULL,
                error TEXT,
                duration_ms INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;

        // Files created before updated_at was tracked
        Self::migrate_add_column_if_missing(&conn, "commodity_prices", "updated_at", "TEXT")?;

        Ok(Self { conn })
    }

    /// Adds a column to an existing table if an older schema lacks it.
    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    fn commodity(code: &str) -> Result<Commodity, StorageError> {
        Commodity::from_code(code)
            .ok_or_else(|| StorageError::Corrupt(format!("unknown commodity '{}'", code)))
    }

    fn timestamp(text: &str) -> Result<DateTime<Utc>, StorageError> {
        text.parse()
            .map_err(|e| StorageError::Corrupt(format!("invalid timestamp '{}': {}", text, e)))
    }
}

impl PriceRepository for SqliteStorage {
    fn load_table(&self, start: &str) -> Result<AlignedTable, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT commodity, price_date, price_value FROM commodity_prices
             WHERE price_date >= ?1
             ORDER BY price_date, commodity",
        )?;

        let rows = stmt.query_map(params![start], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut by_date: BTreeMap<String, AlignedRow> = BTreeMap::new();
        for row in rows {
            let (code, date, value) = row?;
            let commodity = Self::commodity(&code)?;
            by_date
                .entry(date.clone())
                .or_insert_with(|| AlignedRow::new(date))
                .set(commodity, value);
        }

        Ok(by_date.into_values().collect())
    }

    fn save_table(&self, table: &[AlignedRow]) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO commodity_prices (commodity, price_date, price_value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (commodity, price_date) DO UPDATE SET
                    price_value = excluded.price_value,
                    updated_at = excluded.updated_at",
            )?;
            for row in table {
                for commodity in Commodity::ALL {
                    if let Some(value) = row.get(commodity) {
                        stmt.execute(params![commodity.code(), &row.date, value, &now])?;
                        written += 1;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(written)
    }

    fn append_change(&self, record: &ChangeRecord) -> Result<(), StorageError> {
        let details = serde_json::to_string(&record.details)?;
        self.conn.execute(
            "INSERT INTO change_logs (summary, details, created_at) VALUES (?1, ?2, ?3)",
            params![&record.summary, details, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn recent_changes(&self, limit: usize) -> Result<Vec<StoredChange>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, summary, details, created_at FROM change_logs
             ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut changes = Vec::new();
        for row in rows {
            let (id, summary, details, created_at) = row?;
            let details: Vec<String> = serde_json::from_str(&details)?;
            changes.push(StoredChange {
                id,
                record: ChangeRecord {
                    summary,
                    details,
                    ..Default::default()
                },
                created_at: Self::timestamp(&created_at)?,
            });
        }

        Ok(changes)
    }

    fn log_fetch(
        &self,
        commodity: Commodity,
        status: FetchStatus,
        records: usize,
        error: Option<&str>,
        duration_ms: u64,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO fetch_logs (commodity, status, records, error, duration_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                commodity.code(),
                status.as_str(),
                records as i64,
                error,
                duration_ms as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn latest_prices(&self) -> Result<Vec<LatestPrice>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.commodity, p.price_date, p.price_value FROM commodity_prices p
             WHERE p.price_date = (
                SELECT MAX(price_date) FROM commodity_prices WHERE commodity = p.commodity
             )
             ORDER BY p.commodity",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut prices = Vec::new();
        for row in rows {
            let (code, date, value) = row?;
            prices.push(LatestPrice {
                commodity: Self::commodity(&code)?,
                date,
                value,
            });
        }

        Ok(prices)
    }

    fn summary(&self) -> Result<Vec<SeriesSummary>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT commodity, COUNT(*), MIN(price_date), MAX(price_date)
             FROM commodity_prices GROUP BY commodity ORDER BY commodity",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut summary = Vec::new();
        for row in rows {
            let (code, count, earliest, latest) = row?;
            summary.push(SeriesSummary {
                commodity: Self::commodity(&code)?,
                count: count as usize,
                earliest,
                latest,
            });
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SqliteStorage {
        SqliteStorage::open_in_memory().unwrap()
    }

    fn table() -> AlignedTable {
        vec![
            AlignedRow::new("2022-12-30").with(Commodity::Copper, 8300.0),
            AlignedRow::new("2026-02-01")
                .with(Commodity::Copper, 100.0)
                .with(Commodity::Zinc, 50.0),
            AlignedRow::new("2026-02-02").with(Commodity::Oil, 71.5),
        ]
    }

    #[test]
    fn round_trips_table_from_start_date() {
        let db = storage();
        assert_eq!(db.save_table(&table()).unwrap(), 4);

        let loaded = db.load_table("2023-01-01").unwrap();
        assert_eq!(loaded, table()[1..].to_vec());

        let everything = db.load_table("2000-01-01").unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn upserts_are_last_write_wins() {
        let db = storage();
        db.save_table(&table()).unwrap();
        db.save_table(&vec![AlignedRow::new("2026-02-01").with(Commodity::Copper, 105.0)])
            .unwrap();

        let loaded = db.load_table("2026-02-01").unwrap();
        assert_eq!(loaded[0].copper, Some(105.0));
        // Untouched commodity on the same date survives.
        assert_eq!(loaded[0].zinc, Some(50.0));
    }

    #[test]
    fn change_log_is_append_only_newest_first() {
        let db = storage();
        let first = ChangeRecord {
            summary: "Added 1 new, 0 updated".into(),
            details: vec!["New data points: 1".into(), "2026-02-02: Copper=101".into()],
            added: 1,
            updated: 0,
        };
        let second = ChangeRecord {
            summary: "Added 0 new, 1 updated".into(),
            details: vec!["Updated data points: 1".into()],
            added: 0,
            updated: 1,
        };
        db.append_change(&first).unwrap();
        db.append_change(&second).unwrap();

        let changes = db.recent_changes(10).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].record.summary, second.summary);
        assert_eq!(changes[1].record.details, first.details);
        assert!(changes[0].id > changes[1].id);

        assert_eq!(db.recent_changes(1).unwrap().len(), 1);
    }

    #[test]
    fn latest_prices_and_summary() {
        let db = storage();
        db.save_table(&table()).unwrap();

        let latest = db.latest_prices().unwrap();
        assert_eq!(latest.len(), 3);
        let copper = latest.iter().find(|p| p.commodity == Commodity::Copper).unwrap();
        assert_eq!(copper.date, "2026-02-01");
        assert_eq!(copper.value, 100.0);

        let summary = db.summary().unwrap();
        let copper = summary.iter().find(|s| s.commodity == Commodity::Copper).unwrap();
        assert_eq!(copper.count, 2);
        assert_eq!(copper.earliest, "2022-12-30");
        assert_eq!(copper.latest, "2026-02-01");
    }

    #[test]
    fn fetch_log_accepts_failures() {
        let db = storage();
        db.log_fetch(Commodity::Oil, FetchStatus::Failed, 0, Some("timeout"), 60_000)
            .unwrap();
        db.log_fetch(Commodity::Zinc, FetchStatus::Success, 812, None, 1_250)
            .unwrap();
    }

    #[test]
    fn migrates_tables_without_updated_at() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE commodity_prices (
                commodity TEXT NOT NULL,
                price_date TEXT NOT NULL,
                price_value REAL NOT NULL,
                PRIMARY KEY (commodity, price_date)
            );
            INSERT INTO commodity_prices VALUES ('ZINC', '2026-01-02', 2900.0);",
        )
        .unwrap();

        let db = SqliteStorage::init(conn).unwrap();
        db.save_table(&[AlignedRow::new("2026-01-02").with(Commodity::Copper, 9100.0)])
            .unwrap();

        let loaded = db.load_table("2026-01-01").unwrap();
        assert_eq!(loaded[0].zinc, Some(2900.0));
        assert_eq!(loaded[0].copper, Some(9100.0));
        let stamped: Option<String> = db
            .conn
            .query_row(
                "SELECT updated_at FROM commodity_prices WHERE commodity = 'COPPER'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(stamped.is_some());
    }

    #[test]
    fn reopening_runs_migrations_idempotently() {
        let path = std::env::temp_dir().join(format!("commodity-tracker-{}.db", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        {
            let db = SqliteStorage::new(&path_str).unwrap();
            db.save_table(&table()).unwrap();
        }
        let db = SqliteStorage::new(&path_str).unwrap();
        assert_eq!(db.load_table("2023-01-01").unwrap().len(), 2);
        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}

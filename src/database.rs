use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connection::conn;
use crate::error::Result;
use crate::types::{Draw, DrawRecord, PrizeTier, RunningNumberRule, StoredDraw, TICKET_WIDTH};
use crate::utils::pad_number;

const CREATE_DRAWS: &str = "
CREATE TABLE IF NOT EXISTS draws (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    draw_id TEXT NOT NULL UNIQUE,
    draw_date TEXT NOT NULL,
    endpoint TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_draws_created_at ON draws (created_at);
";

const CREATE_PRIZE_ROWS: &str = "
CREATE TABLE IF NOT EXISTS prize_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    draw_pk INTEGER NOT NULL,
    prize_id TEXT NOT NULL,
    prize_name TEXT NOT NULL,
    reward TEXT NOT NULL,
    amount INTEGER NOT NULL,
    number TEXT NOT NULL,
    FOREIGN KEY (draw_pk) REFERENCES draws (id)
);
-- Unrevealed numbers repeat the placeholder, so only revealed ones are unique.
CREATE UNIQUE INDEX IF NOT EXISTS idx_prize_rows_revealed
    ON prize_rows (draw_pk, prize_id, number)
    WHERE instr(lower(number), 'x') = 0;
";

const CREATE_RUNNING_ROWS: &str = "
CREATE TABLE IF NOT EXISTS running_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    draw_pk INTEGER NOT NULL,
    running_id TEXT NOT NULL,
    running_name TEXT NOT NULL,
    reward TEXT NOT NULL,
    amount INTEGER NOT NULL,
    number TEXT NOT NULL,
    FOREIGN KEY (draw_pk) REFERENCES draws (id)
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_running_rows_revealed
    ON running_rows (draw_pk, running_id, number)
    WHERE instr(lower(number), 'x') = 0;
";

const DRAW_COLUMNS: &str = "id, draw_id, draw_date, endpoint, created_at, updated_at";

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_DRAWS)?;
    conn.execute_batch(CREATE_PRIZE_ROWS)?;
    conn.execute_batch(CREATE_RUNNING_ROWS)?;
    Ok(())
}

/// Durable storage of draws over the one-row-per-winning-number schema.
///
/// Every call opens its own connection. Saves of the same `draw_id` are
/// serialized in-process by a keyed lock and across processes by the
/// IMMEDIATE transaction plus the unique `draw_id` column.
pub struct DrawRepository {
    database_url: PathBuf,
    busy_timeout: Duration,
    save_locks: KeyedLocks,
}

impl DrawRepository {
    pub fn new(database_url: impl AsRef<Path>, busy_timeout: Duration) -> Self {
        Self {
            database_url: database_url.as_ref().to_path_buf(),
            busy_timeout,
            save_locks: KeyedLocks::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.database_url, config.busy_timeout)
    }

    pub fn database_url(&self) -> &Path {
        &self.database_url
    }

    fn connection(&self) -> Result<Connection> {
        conn(&self.database_url, self.busy_timeout)
    }

    /// Creates or fully replaces the draw stored under `draw_id`.
    ///
    /// Runs as a single transaction: on any failure it is rolled back, the
    /// previously stored version stays intact and the error is returned.
    pub fn save(&self, draw_id: &str, draw: &Draw) -> Result<()> {
        let lock = self.save_locks.get(draw_id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.save_locked(draw_id, draw)
        };
        self.save_locks.release(draw_id, lock);
        result
    }

    fn save_locked(&self, draw_id: &str, draw: &Draw) -> Result<()> {
        let draw = normalize_draw(draw);
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        match replace_draw(&tx, draw_id, &draw) {
            Ok(draw_pk) => {
                tx.commit()?;
                info!(
                    draw_id,
                    draw_pk,
                    prizes = draw.prizes.len(),
                    running_numbers = draw.running_numbers.len(),
                    "saved draw"
                );
                Ok(())
            }
            Err(e) => {
                warn!(draw_id, error = %e, "rolling back draw save");
                if let Err(rollback_err) = tx.rollback() {
                    warn!(draw_id, error = %rollback_err, "rollback failed");
                }
                Err(e.into())
            }
        }
    }

    /// The most recently created draw, or `None` on an empty database.
    pub fn get_latest(&self) -> Result<Option<Draw>> {
        Ok(self.get_latest_record()?.map(|stored| stored.draw))
    }

    pub fn get_by_draw_id(&self, draw_id: &str) -> Result<Option<Draw>> {
        Ok(self.get_record_by_draw_id(draw_id)?.map(|stored| stored.draw))
    }

    pub fn get_latest_record(&self) -> Result<Option<StoredDraw>> {
        let conn = self.connection()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM draws ORDER BY created_at DESC, id DESC LIMIT 1",
                    DRAW_COLUMNS
                ),
                [],
                draw_record_from_row,
            )
            .optional()?;

        match record {
            Some(record) => Ok(Some(load_stored_draw(&conn, record)?)),
            None => Ok(None),
        }
    }

    pub fn get_record_by_draw_id(&self, draw_id: &str) -> Result<Option<StoredDraw>> {
        let conn = self.connection()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM draws WHERE draw_id = ?1", DRAW_COLUMNS),
                [draw_id],
                draw_record_from_row,
            )
            .optional()?;

        match record {
            Some(record) => Ok(Some(load_stored_draw(&conn, record)?)),
            None => Ok(None),
        }
    }

    /// Headers of every stored draw, most recent first.
    pub fn list_draws(&self) -> Result<Vec<DrawRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM draws ORDER BY created_at DESC, id DESC",
            DRAW_COLUMNS
        ))?;
        let draw_iter = stmt.query_map([], draw_record_from_row)?;

        let mut results = Vec::new();
        for record in draw_iter {
            results.push(record?);
        }
        Ok(results)
    }

    pub fn exists(&self, draw_id: &str) -> Result<bool> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM draws WHERE draw_id = ?1",
            [draw_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Header upsert followed by delete-all-children and re-insert. Returns the surrogate id.
fn replace_draw(tx: &Transaction<'_>, draw_id: &str, draw: &Draw) -> rusqlite::Result<i64> {
    let now = now_timestamp();
    let existing: Option<i64> = tx
        .query_row("SELECT id FROM draws WHERE draw_id = ?1", [draw_id], |row| {
            row.get(0)
        })
        .optional()?;

    let draw_pk = match existing {
        Some(draw_pk) => {
            tx.execute(
                "UPDATE draws SET draw_date = ?1, endpoint = ?2, updated_at = ?3 WHERE id = ?4",
                (&draw.date, &draw.endpoint, &now, draw_pk),
            )?;
            let prizes = tx.execute("DELETE FROM prize_rows WHERE draw_pk = ?1", [draw_pk])?;
            let running = tx.execute("DELETE FROM running_rows WHERE draw_pk = ?1", [draw_pk])?;
            debug!(draw_id, draw_pk, prizes, running, "cleared previous rows");
            draw_pk
        }
        None => {
            tx.execute(
                "INSERT INTO draws (draw_id, draw_date, endpoint, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                (draw_id, &draw.date, &draw.endpoint, &now),
            )?;
            tx.last_insert_rowid()
        }
    };

    insert_prize_rows(tx, draw_pk, &draw.prizes)?;
    insert_running_rows(tx, draw_pk, &draw.running_numbers)?;

    Ok(draw_pk)
}

fn insert_prize_rows(tx: &Transaction<'_>, draw_pk: i64, prizes: &[PrizeTier]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO prize_rows (draw_pk, prize_id, prize_name, reward, amount, number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for prize in prizes {
        for number in &prize.number {
            stmt.execute((draw_pk, &prize.id, &prize.name, &prize.reward, prize.amount, number))?;
        }
    }
    Ok(())
}

fn insert_running_rows(
    tx: &Transaction<'_>,
    draw_pk: i64,
    rules: &[RunningNumberRule],
) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO running_rows (draw_pk, running_id, running_name, reward, amount, number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for rule in rules {
        for number in &rule.number {
            stmt.execute((draw_pk, &rule.id, &rule.name, &rule.reward, rule.amount, number))?;
        }
    }
    Ok(())
}

/// Pads digit-only numbers to the width of their tier or rule.
fn normalize_draw(draw: &Draw) -> Draw {
    let prizes = draw
        .prizes
        .iter()
        .map(|prize| PrizeTier {
            number: prize.number.iter().map(|n| pad_number(n, TICKET_WIDTH)).collect(),
            ..prize.clone()
        })
        .collect();

    let running_numbers = draw
        .running_numbers
        .iter()
        .map(|rule| match rule.kind() {
            Some(kind) => RunningNumberRule {
                number: rule.number.iter().map(|n| pad_number(n, kind.width())).collect(),
                ..rule.clone()
            },
            None => rule.clone(),
        })
        .collect();

    Draw {
        date: draw.date.clone(),
        endpoint: draw.endpoint.clone(),
        prizes,
        running_numbers,
    }
}

fn draw_record_from_row(row: &Row<'_>) -> rusqlite::Result<DrawRecord> {
    Ok(DrawRecord {
        id: row.get(0)?,
        draw_id: row.get(1)?,
        draw_date: row.get(2)?,
        endpoint: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// One stored winning number, from either child table.
struct NumberRow {
    group_id: String,
    name: String,
    reward: String,
    amount: i64,
    number: String,
}

/// A tier or rule rebuilt from its rows.
struct NumberGroup {
    id: String,
    name: String,
    reward: String,
    amount: i64,
    number: Vec<String>,
}

impl From<NumberGroup> for PrizeTier {
    fn from(group: NumberGroup) -> Self {
        PrizeTier {
            id: group.id,
            name: group.name,
            reward: group.reward,
            amount: group.amount,
            number: group.number,
        }
    }
}

impl From<NumberGroup> for RunningNumberRule {
    fn from(group: NumberGroup) -> Self {
        RunningNumberRule {
            id: group.id,
            name: group.name,
            reward: group.reward,
            amount: group.amount,
            number: group.number,
        }
    }
}

fn load_stored_draw(conn: &Connection, record: DrawRecord) -> Result<StoredDraw> {
    let prize_rows = query_number_rows(
        conn,
        "SELECT prize_id, prize_name, reward, amount, number
         FROM prize_rows WHERE draw_pk = ?1 ORDER BY id",
        record.id,
    )?;
    let running_rows = query_number_rows(
        conn,
        "SELECT running_id, running_name, reward, amount, number
         FROM running_rows WHERE draw_pk = ?1 ORDER BY id",
        record.id,
    )?;

    debug!(
        draw_id = %record.draw_id,
        prize_rows = prize_rows.len(),
        running_rows = running_rows.len(),
        "reconstructing draw"
    );

    let draw = Draw {
        date: record.draw_date.clone(),
        endpoint: record.endpoint.clone(),
        prizes: group_rows(prize_rows).into_iter().map(PrizeTier::from).collect(),
        running_numbers: group_rows(running_rows)
            .into_iter()
            .map(RunningNumberRule::from)
            .collect(),
    };

    Ok(StoredDraw { record, draw })
}

fn query_number_rows(conn: &Connection, sql: &str, draw_pk: i64) -> Result<Vec<NumberRow>> {
    let mut stmt = conn.prepare(sql)?;
    let row_iter = stmt.query_map([draw_pk], |row| {
        Ok(NumberRow {
            group_id: row.get(0)?,
            name: row.get(1)?,
            reward: row.get(2)?,
            amount: row.get(3)?,
            number: row.get(4)?,
        })
    })?;

    let mut rows = Vec::new();
    for row in row_iter {
        rows.push(row?);
    }
    Ok(rows)
}

/// Groups rows by id in first-seen order. The first row of a group supplies
/// its metadata, and numbers keep row order.
fn group_rows(rows: Vec<NumberRow>) -> Vec<NumberGroup> {
    let mut groups: Vec<NumberGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.group_id) {
            Some(&position) => groups[position].number.push(row.number),
            None => {
                index.insert(row.group_id.clone(), groups.len());
                groups.push(NumberGroup {
                    id: row.group_id,
                    name: row.name,
                    reward: row.reward,
                    amount: row.amount,
                    number: vec![row.number],
                });
            }
        }
    }

    groups
}

/// One mutex per key, dropped again once nobody holds or waits on it.
#[derive(Default)]
struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    fn get(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release(&self, key: &str, lock: Arc<Mutex<()>>) {
        // The map and `lock` are the only owners left when nobody else is waiting.
        self.locks.remove_if(key, |_, held| Arc::ptr_eq(held, &lock) && Arc::strong_count(held) == 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(group_id: &str, number: &str) -> NumberRow {
        NumberRow {
            group_id: group_id.to_string(),
            name: format!("{} name", group_id),
            reward: "100".to_string(),
            amount: 1,
            number: number.to_string(),
        }
    }

    #[test]
    fn group_rows_keeps_first_seen_order() {
        let groups = group_rows(vec![
            row("prizeSecond", "222222"),
            row("prizeFirst", "111111"),
            row("prizeSecond", "000002"),
            row("prizeSecond", "999992"),
        ]);

        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["prizeSecond", "prizeFirst"]);
        assert_eq!(groups[0].number, vec!["222222", "000002", "999992"]);
        assert_eq!(groups[1].number, vec!["111111"]);
    }

    #[test]
    fn group_rows_empty() {
        assert!(group_rows(Vec::new()).is_empty());
    }

    #[test]
    fn normalize_draw_pads_by_width() {
        let draw = Draw {
            date: "d".to_string(),
            endpoint: "e".to_string(),
            prizes: vec![PrizeTier {
                id: "prizeFirst".to_string(),
                name: "first".to_string(),
                reward: "6000000".to_string(),
                amount: 1,
                number: vec!["12345".to_string(), "xxxxxx".to_string()],
            }],
            running_numbers: vec![
                RunningNumberRule {
                    id: crate::types::RULE_BACK_TWO.to_string(),
                    name: "back two".to_string(),
                    reward: "2000".to_string(),
                    amount: 1,
                    number: vec!["6".to_string()],
                },
                RunningNumberRule {
                    id: crate::types::RULE_FRONT_THREE.to_string(),
                    name: "front three".to_string(),
                    reward: "4000".to_string(),
                    amount: 2,
                    number: vec!["42".to_string()],
                },
                RunningNumberRule {
                    id: "somethingElse".to_string(),
                    name: "other".to_string(),
                    reward: "1".to_string(),
                    amount: 1,
                    number: vec!["7".to_string()],
                },
            ],
        };

        let normalized = normalize_draw(&draw);
        assert_eq!(normalized.prizes[0].number, vec!["012345", "xxxxxx"]);
        assert_eq!(normalized.running_numbers[0].number, vec!["06"]);
        assert_eq!(normalized.running_numbers[1].number, vec!["042"]);
        assert_eq!(normalized.running_numbers[2].number, vec!["7"]);
    }

    #[test]
    fn keyed_locks_are_released() {
        let locks = KeyedLocks::default();
        let lock = locks.get("draw-1");
        assert_eq!(locks.locks.len(), 1);
        locks.release("draw-1", lock);
        assert!(locks.locks.is_empty());
    }

    #[test]
    fn keyed_locks_survive_while_shared() {
        let locks = KeyedLocks::default();
        let first = locks.get("draw-1");
        let second = locks.get("draw-1");
        assert!(Arc::ptr_eq(&first, &second));
        locks.release("draw-1", first);
        assert_eq!(locks.locks.len(), 1);
        locks.release("draw-1", second);
        assert!(locks.locks.is_empty());
    }
}

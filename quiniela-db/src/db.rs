use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

use crate::models::DrawRecord;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    date      TEXT NOT NULL,
    position  INTEGER NOT NULL,
    number    INTEGER NOT NULL,
    prize     REAL,
    PRIMARY KEY (date, position)
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("quiniela.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Insère un tirage. Retourne false si le couple (date, position) existe déjà :
/// le doublon est ignoré, jamais compté deux fois.
pub fn insert_record(conn: &Connection, record: &DrawRecord) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO draws (date, position, number, prize)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![record.date, record.position, record.number, record.prize],
        )
        .context("Échec de l'insertion")?;
    Ok(changed > 0)
}

/// Insertion en lot dans une seule transaction. Retourne le nombre de tirages
/// réellement insérés (doublons exclus).
pub fn insert_records(conn: &Connection, records: &[DrawRecord]) -> Result<u32> {
    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    let mut inserted = 0;
    for record in records {
        if insert_record(&tx, record)? {
            inserted += 1;
        }
    }
    tx.commit().context("Échec du commit")?;
    Ok(inserted)
}

/// Les `limit` derniers tirages, du plus récent au plus ancien.
pub fn fetch_last_records(conn: &Connection, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, position, number, prize
         FROM draws ORDER BY date DESC, position DESC LIMIT ?1",
    )?;
    let records = stmt
        .query_map([limit], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Tirages entre deux dates incluses, du plus récent au plus ancien.
pub fn fetch_by_date_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, position, number, prize
         FROM draws WHERE date >= ?1 AND date <= ?2
         ORDER BY date DESC, position DESC",
    )?;
    let records = stmt
        .query_map(rusqlite::params![start, end], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn count_records(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

/// Le tirage le plus récent, support de l'empreinte d'historique du cache.
pub fn latest_record(conn: &Connection) -> Result<Option<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, position, number, prize
         FROM draws ORDER BY date DESC, position DESC LIMIT 1",
    )?;
    let mut rows = stmt.query_map([], row_to_record)?;
    match rows.next() {
        Some(record) => Ok(Some(record?)),
        None => Ok(None),
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrawRecord> {
    Ok(DrawRecord {
        date: row.get(0)?,
        position: row.get(1)?,
        number: row.get(2)?,
        prize: row.get(3)?,
    })
}

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use quiniela_db::db::insert_record;
use quiniela_db::models::{validate_record, DrawRecord};
use quiniela_db::rusqlite::Connection;

/// Format attendu : CSV avec en-tête, séparateur point-virgule,
/// colonnes date;position;numero;gain (gain optionnel).
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    // ISO d'abord, puis format JJ/MM/AAAA
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date);
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .with_context(|| format!("Format de date invalide : '{}'", raw))
}

pub fn parse_prize(raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let normalized = raw.replace(',', ".");
    let prize = normalized
        .parse::<f64>()
        .with_context(|| format!("Impossible de parser le gain : '{}'", raw))?;
    Ok(Some(prize))
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let date = parse_date(&get(0)?)?;
    let position: u8 = get(1)?
        .parse()
        .with_context(|| "Impossible de parser la position")?;
    let number: u8 = get(2)?
        .parse()
        .with_context(|| "Impossible de parser le numéro")?;
    let prize = parse_prize(&get(3).unwrap_or_default())?;

    let draw = DrawRecord {
        date,
        position,
        number,
        prize,
    };
    validate_record(&draw)?;
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => match insert_record(&tx, &draw) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("Erreur insertion ligne {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    eprintln!("Erreur parsing ligne {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date("2024-02-17").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 17).unwrap()
        );
    }

    #[test]
    fn test_parse_date_french() {
        assert_eq!(
            parse_date("17/02/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 17).unwrap()
        );
        assert!(parse_date("17-02-2024").is_err());
    }

    #[test]
    fn test_parse_prize() {
        assert_eq!(parse_prize("").unwrap(), None);
        assert_eq!(parse_prize("1500.50").unwrap(), Some(1500.50));
        assert_eq!(parse_prize("1500,50").unwrap(), Some(1500.50));
        assert!(parse_prize("abc").is_err());
    }

    #[test]
    fn test_parse_record_rejects_out_of_range() {
        let record = csv::StringRecord::from(vec!["2024-01-01", "1", "150", ""]);
        assert!(parse_record(&record).is_err());
    }

    #[test]
    fn test_parse_record_ok() {
        let record = csv::StringRecord::from(vec!["2024-01-01", "2", "42", "1000,00"]);
        let draw = parse_record(&record).unwrap();
        assert_eq!(draw.position, 2);
        assert_eq!(draw.number, 42);
        assert_eq!(draw.prize, Some(1000.0));
    }
}

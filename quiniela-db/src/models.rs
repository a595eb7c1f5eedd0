use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Taille du pool : numéros de 00 à 99.
pub const POOL_SIZE: usize = 100;

/// Un résultat de tirage : une date, une position de tirage dans la journée,
/// un numéro entre 0 et 99, et un gain éventuel. Immuable une fois stocké ;
/// l'unicité est garantie par le couple (date, position).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub date: NaiveDate,
    pub position: u8,
    pub number: u8,
    pub prize: Option<f64>,
}

pub fn validate_record(record: &DrawRecord) -> Result<()> {
    if record.number as usize >= POOL_SIZE {
        bail!("Numéro {} hors limites (0-99)", record.number);
    }
    if record.position == 0 {
        bail!("Position de tirage invalide (doit être >= 1)");
    }
    if let Some(prize) = record.prize {
        if prize < 0.0 {
            bail!("Gain négatif : {}", prize);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: u8, position: u8) -> DrawRecord {
        DrawRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            position,
            number,
            prize: None,
        }
    }

    #[test]
    fn test_validate_record_ok() {
        assert!(validate_record(&record(0, 1)).is_ok());
        assert!(validate_record(&record(99, 4)).is_ok());
    }

    #[test]
    fn test_validate_record_number_out_of_range() {
        assert!(validate_record(&record(100, 1)).is_err());
        assert!(validate_record(&record(255, 1)).is_err());
    }

    #[test]
    fn test_validate_record_position_zero() {
        assert!(validate_record(&record(7, 0)).is_err());
    }

    #[test]
    fn test_validate_record_negative_prize() {
        let mut r = record(7, 1);
        r.prize = Some(-10.0);
        assert!(validate_record(&r).is_err());
        r.prize = Some(1500.0);
        assert!(validate_record(&r).is_ok());
    }
}

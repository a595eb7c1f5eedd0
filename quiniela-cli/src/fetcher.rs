use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quiniela_db::models::DrawRecord;

/// Source de tirages en amont du magasin. Le scraping en direct est hors
/// périmètre ; seule la variante de secours (génération synthétique) est
/// fournie ici, derrière la même interface.
pub trait SourceFetcher {
    fn fetch(&mut self) -> Result<Vec<DrawRecord>>;
}

/// Générateur de secours : tirages uniformes sur 0-99, `draws_per_day`
/// positions par jour à partir de `start`. Reproductible avec une seed.
pub struct SyntheticFetcher {
    start: NaiveDate,
    days: u32,
    draws_per_day: u8,
    rng: StdRng,
}

impl SyntheticFetcher {
    pub fn new(start: NaiveDate, days: u32, draws_per_day: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            start,
            days,
            draws_per_day,
            rng,
        }
    }
}

impl SourceFetcher for SyntheticFetcher {
    fn fetch(&mut self) -> Result<Vec<DrawRecord>> {
        let mut records = Vec::with_capacity(self.days as usize * self.draws_per_day as usize);
        for day in 0..self.days {
            let date = self
                .start
                .checked_add_days(Days::new(day as u64))
                .context("Date hors plage")?;
            for position in 1..=self.draws_per_day {
                records.push(DrawRecord {
                    date,
                    position,
                    number: self.rng.random_range(0..=99),
                    prize: None,
                });
            }
        }
        Ok(records)
    }
}

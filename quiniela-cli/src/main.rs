mod display;
mod fetcher;
mod import;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Days, Utc};
use clap::{Parser, Subcommand};

use quiniela_db::db::{
    count_records, db_path, fetch_by_date_range, fetch_last_records, insert_record,
    insert_records, migrate, open_db,
};
use quiniela_db::models::{validate_record, DrawRecord};
use quiniela_engine::config::EngineConfig;
use quiniela_engine::types::AnalysisWindow;
use quiniela_engine::{frequency, run_prediction, trend};

use crate::display::{
    display_import_summary, display_predictions, display_records, display_stats, display_trends,
};
use crate::fetcher::{SourceFetcher, SyntheticFetcher};
use crate::import::parse_date;

#[derive(Parser)]
#[command(name = "quiniela", about = "Analyseur statistique de tirages Quiniela (00-99)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV (date;position;numero;gain)
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long, default_value = "assets/quiniela.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Afficher les fréquences et classifications (chaud/froid)
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "180")]
        window: u32,

        /// Restreindre aux tirages depuis cette date (JJ/MM/AAAA), prioritaire sur --window
        #[arg(long)]
        since: Option<String>,
    },

    /// Afficher les tendances (fenêtre courte contre fenêtre longue)
    Trends {
        /// Fenêtre courte (nombre de tirages)
        #[arg(short, long, default_value = "10")]
        short: usize,

        /// Fenêtre longue (nombre de tirages)
        #[arg(short, long, default_value = "50")]
        long: usize,
    },

    /// Produire le classement combiné des numéros
    Predict {
        /// Fenêtre de la vue fréquence (nombre de tirages, défaut : tout l'historique)
        #[arg(short, long)]
        window: Option<usize>,

        /// Fenêtre courte de la tendance
        #[arg(long, default_value = "10")]
        short: usize,

        /// Fenêtre longue de la tendance
        #[arg(long, default_value = "50")]
        long: usize,

        /// Poids du signal fréquence
        #[arg(long, default_value = "0.4")]
        frequency_weight: f64,

        /// Poids du signal tendance
        #[arg(long, default_value = "0.3")]
        trend_weight: f64,

        /// Nombre de prédictions retournées
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Sortie JSON complète (prédictions + vues fréquence et tendance)
        #[arg(long)]
        json: bool,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Remplir la base avec des tirages synthétiques (source de secours)
    Seed {
        /// Nombre de jours à générer
        #[arg(short, long, default_value = "120")]
        days: u32,

        /// Tirages par jour
        #[arg(short, long, default_value = "4")]
        per_day: u8,

        /// Date de départ (défaut : aujourd'hui moins `days`)
        #[arg(long)]
        start: Option<String>,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window, since } => cmd_stats(&conn, window, since),
        Command::Trends { short, long } => cmd_trends(&conn, short, long),
        Command::Predict {
            window,
            short,
            long,
            frequency_weight,
            trend_weight,
            top,
            json,
        } => cmd_predict(
            &conn,
            window,
            short,
            long,
            frequency_weight,
            trend_weight,
            top,
            json,
        ),
        Command::Add => cmd_add(&conn),
        Command::Seed {
            days,
            per_day,
            start,
            seed,
        } => cmd_seed(&conn, days, per_day, start, seed),
    }
}

fn fetch_full_history(conn: &quiniela_db::rusqlite::Connection) -> Result<Vec<DrawRecord>> {
    let n = count_records(conn)?;
    fetch_last_records(conn, n)
}

fn cmd_import(conn: &quiniela_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &quiniela_db::rusqlite::Connection, last: u32) -> Result<()> {
    let n = count_records(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : quiniela import (ou quiniela seed)");
        return Ok(());
    }
    let records = fetch_last_records(conn, last)?;
    display_records(&records);
    Ok(())
}

fn cmd_stats(
    conn: &quiniela_db::rusqlite::Connection,
    window: u32,
    since: Option<String>,
) -> Result<()> {
    let n = count_records(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : quiniela import (ou quiniela seed)");
        return Ok(());
    }
    let defaults = EngineConfig::default();

    let (history, analysis_window, label) = match since {
        Some(raw) => {
            let start = parse_date(&raw)?;
            let end = Utc::now().date_naive();
            let history = fetch_by_date_range(conn, start, end)?;
            (history, None, format!("depuis le {}", start))
        }
        None => {
            let history = fetch_full_history(conn)?;
            let effective = (window as usize).min(history.len());
            (
                history,
                Some(AnalysisWindow::LastDraws(window as usize)),
                format!("{} derniers tirages", effective),
            )
        }
    };

    let stats = frequency::compute_frequencies(
        &history,
        analysis_window.as_ref(),
        defaults.hot_threshold,
        defaults.cold_threshold,
    );
    display_stats(&stats, &label);
    Ok(())
}

fn cmd_trends(conn: &quiniela_db::rusqlite::Connection, short: usize, long: usize) -> Result<()> {
    let n = count_records(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : quiniela import (ou quiniela seed)");
        return Ok(());
    }
    let config = EngineConfig {
        short_window: short,
        long_window: long,
        ..EngineConfig::default()
    };
    config.validate()?;

    let history = fetch_full_history(conn)?;
    let report = trend::compute_trends(&history, short, long, config.trend_threshold);
    display_trends(&report);
    Ok(())
}

fn cmd_predict(
    conn: &quiniela_db::rusqlite::Connection,
    window: Option<usize>,
    short: usize,
    long: usize,
    frequency_weight: f64,
    trend_weight: f64,
    top: usize,
    json: bool,
) -> Result<()> {
    let n = count_records(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : quiniela import (ou quiniela seed)");
        return Ok(());
    }

    let config = EngineConfig {
        window: window.map(AnalysisWindow::LastDraws),
        short_window: short,
        long_window: long,
        frequency_weight,
        trend_weight,
        top_n: top,
        ..EngineConfig::default()
    };

    let history = fetch_full_history(conn)?;
    let output = run_prediction(&history, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    display_predictions(&output.predictions);
    if output.trends.insufficient_history {
        println!(
            "⚠ Historique insuffisant : tendance calculée sur {} tirages au lieu de {}.",
            output.trends.effective_long_window, long
        );
    }
    Ok(())
}

fn cmd_add(conn: &quiniela_db::rusqlite::Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let date = parse_date(&prompt("Date (JJ/MM/AAAA) : ")?)?;
    let position: u8 = prompt("Position du tirage (1-255) : ")?
        .parse()
        .context("Position invalide")?;
    let number: u8 = prompt("Numéro (0-99) : ")?
        .parse()
        .context("Numéro invalide")?;
    let prize = import::parse_prize(&prompt("Gain (optionnel) : ")?)?;

    let record = DrawRecord {
        date,
        position,
        number,
        prize,
    };
    validate_record(&record)?;

    println!("\nTirage à insérer :");
    display_records(&[record.clone()]);

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = insert_record(conn, &record)?;
        if inserted {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn cmd_seed(
    conn: &quiniela_db::rusqlite::Connection,
    days: u32,
    per_day: u8,
    start: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    if per_day == 0 {
        bail!("per_day doit être supérieur à 0");
    }
    let start = match start {
        Some(raw) => parse_date(&raw)?,
        None => Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(days as u64))
            .context("Date hors plage")?,
    };

    let mut fetcher = SyntheticFetcher::new(start, days, per_day, seed);
    let records = fetcher.fetch()?;
    let inserted = insert_records(conn, &records)?;

    println!("Génération synthétique terminée :");
    println!("  Tirages générés  : {}", records.len());
    println!("  Insérés          : {}", inserted);
    println!("  Doublons ignorés : {}", records.len() as u32 - inserted);
    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use quiniela_db::models::DrawRecord;
use quiniela_engine::types::{
    Classification, NumberStat, Prediction, TrendDirection, TrendReport,
};

use crate::import::ImportResult;

pub fn display_records(records: &[DrawRecord]) {
    if records.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Position", "Numéro", "Gain"]);

    for record in records {
        let prize = match record.prize {
            Some(p) if p > 0.0 => format!("{:.2} €", p),
            _ => "—".to_string(),
        };
        table.add_row(vec![
            record.date.to_string(),
            record.position.to_string(),
            format!("{:02}", record.number),
            prize,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(stats: &[NumberStat], window_label: &str) {
    println!("\n📊 Fréquences ({window_label})\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Apparitions", "Dernière sortie", "Ratio", "Tag"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.number.cmp(&b.number))
    });

    for stat in &sorted {
        let color = match stat.classification {
            Classification::Hot => Color::Green,
            Classification::Cold => Color::Red,
            Classification::Normal => Color::White,
        };
        let last_seen = stat
            .last_seen
            .map(|d| d.to_string())
            .unwrap_or_else(|| "jamais".to_string());
        table.add_row(vec![
            Cell::new(format!("{:02}", stat.number)),
            Cell::new(stat.occurrences.to_string()),
            Cell::new(last_seen),
            Cell::new(format!("{:.2}", stat.deviation_ratio)),
            Cell::new(stat.classification.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_trends(report: &TrendReport) {
    println!("\n📈 Tendances (fenêtre longue effective : {} tirages)\n", report.effective_long_window);
    if report.insufficient_history {
        println!("⚠ Historique insuffisant : la fenêtre longue a été réduite.\n");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Taux récent", "Taux de base", "Delta", "Direction"]);

    let mut sorted = report.scores.to_vec();
    sorted.sort_by(|a, b| {
        b.delta
            .partial_cmp(&a.delta)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.number.cmp(&b.number))
    });

    for score in &sorted {
        let color = match score.direction {
            TrendDirection::Rising => Color::Green,
            TrendDirection::Falling => Color::Red,
            TrendDirection::Flat => Color::White,
        };
        table.add_row(vec![
            Cell::new(format!("{:02}", score.number)),
            Cell::new(format!("{:.4}", score.recent_rate)),
            Cell::new(format!("{:.4}", score.baseline_rate)),
            Cell::new(format!("{:+.4}", score.delta)),
            Cell::new(score.direction.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_predictions(predictions: &[Prediction]) {
    println!("\n🎯 Prédictions\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rang", "Numéro", "Score", "Confiance", "Raisons"]);

    for (i, prediction) in predictions.iter().enumerate() {
        table.add_row(vec![
            Cell::new((i + 1).to_string()),
            Cell::new(format!("{:02}", prediction.number)),
            Cell::new(format!("{:.4}", prediction.combined_score)),
            Cell::new(format!("{:.0} %", prediction.confidence * 100.0)),
            Cell::new(prediction.reasoning.join("\n")),
        ]);
    }
    println!("{table}");
}

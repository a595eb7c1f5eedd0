use chrono::NaiveDate;

use quiniela_db::models::{DrawRecord, POOL_SIZE};

use crate::types::{AnalysisWindow, Classification, NumberStat};

/// Plancher du dénominateur, pour éviter la division par zéro sur une
/// fenêtre vide.
const MIN_EXPECTED: f64 = 1e-9;

/// Restreint l'historique (du plus récent au plus ancien) à la fenêtre
/// demandée. Les tirages hors fenêtre ne sont pas une erreur, ils sont
/// simplement exclus.
pub fn window_slice<'a>(
    history: &'a [DrawRecord],
    window: Option<&AnalysisWindow>,
) -> &'a [DrawRecord] {
    match window {
        None => history,
        Some(AnalysisWindow::LastDraws(n)) => &history[..(*n).min(history.len())],
        Some(AnalysisWindow::SinceDate(since)) => {
            let end = history
                .iter()
                .position(|r| r.date < *since)
                .unwrap_or(history.len());
            &history[..end]
        }
    }
}

/// Compte les apparitions de chaque numéro sur la fenêtre active et classe
/// chaque numéro par rapport au taux uniforme 1/100. Retourne exactement 100
/// entrées (indice = numéro), y compris les numéros jamais sortis. Fonction
/// pure : deux appels identiques donnent un résultat identique au bit près.
pub fn compute_frequencies(
    history: &[DrawRecord],
    window: Option<&AnalysisWindow>,
    hot_threshold: f64,
    cold_threshold: f64,
) -> Vec<NumberStat> {
    let active = window_slice(history, window);
    let draw_count = active.len();
    let expected_rate = 1.0 / POOL_SIZE as f64;

    let mut occurrences = vec![0u32; POOL_SIZE];
    let mut last_seen: Vec<Option<NaiveDate>> = vec![None; POOL_SIZE];

    for record in active {
        let idx = record.number as usize;
        if idx < POOL_SIZE {
            occurrences[idx] += 1;
            // Historique du plus récent au plus ancien : la première
            // apparition rencontrée est la plus récente.
            if last_seen[idx].is_none() {
                last_seen[idx] = Some(record.date);
            }
        }
    }

    let expected_per_number = (draw_count as f64 * expected_rate).max(MIN_EXPECTED);

    (0..POOL_SIZE)
        .map(|n| {
            let occ = occurrences[n];
            // Fenêtre vide : tous Normal, ratio neutre. Comportement défini,
            // pas un cas d'erreur.
            let (deviation_ratio, classification) = if draw_count == 0 {
                (1.0, Classification::Normal)
            } else {
                let ratio = occ as f64 / expected_per_number;
                let classification = if ratio >= hot_threshold {
                    Classification::Hot
                } else if ratio <= cold_threshold {
                    Classification::Cold
                } else {
                    Classification::Normal
                };
                (ratio, classification)
            };
            NumberStat {
                number: n as u8,
                occurrences: occ,
                last_seen: last_seen[n],
                expected_rate,
                deviation_ratio,
                classification,
            }
        })
        .collect()
}

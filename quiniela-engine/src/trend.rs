use quiniela_db::models::{DrawRecord, POOL_SIZE};

use crate::types::{TrendDirection, TrendReport, TrendScore};

/// Compare le taux d'apparition de chaque numéro sur une fenêtre courte au
/// taux de base sur une fenêtre longue (historique du plus récent au plus
/// ancien). Si l'historique est plus court que la fenêtre longue, tout
/// l'historique sert de fenêtre longue et le rapport porte le drapeau
/// `insufficient_history` au lieu d'échouer. Fonction pure, sans dépendance
/// sur la vue fréquence : les deux moteurs peuvent tourner en parallèle.
///
/// Précondition (validée par `EngineConfig::validate`) : short_window < long_window.
pub fn compute_trends(
    history: &[DrawRecord],
    short_window: usize,
    long_window: usize,
    trend_threshold: f64,
) -> TrendReport {
    debug_assert!(short_window < long_window);
    debug_assert!(trend_threshold > 0.0);

    let effective_long = long_window.min(history.len());
    let effective_short = short_window.min(history.len());
    let insufficient_history = history.len() < long_window;

    let recent_counts = count_occurrences(&history[..effective_short]);
    let baseline_counts = count_occurrences(&history[..effective_long]);

    let scores = (0..POOL_SIZE)
        .map(|n| {
            let recent_rate = rate(recent_counts[n], effective_short);
            let baseline_rate = rate(baseline_counts[n], effective_long);
            let delta = recent_rate - baseline_rate;
            let direction = if delta > trend_threshold {
                TrendDirection::Rising
            } else if delta < -trend_threshold {
                TrendDirection::Falling
            } else {
                TrendDirection::Flat
            };
            TrendScore {
                number: n as u8,
                recent_rate,
                baseline_rate,
                delta,
                direction,
            }
        })
        .collect();

    TrendReport {
        scores,
        insufficient_history,
        effective_long_window: effective_long,
    }
}

fn count_occurrences(records: &[DrawRecord]) -> Vec<u32> {
    let mut counts = vec![0u32; POOL_SIZE];
    for record in records {
        let idx = record.number as usize;
        if idx < POOL_SIZE {
            counts[idx] += 1;
        }
    }
    counts
}

fn rate(count: u32, window_len: usize) -> f64 {
    if window_len == 0 {
        0.0
    } else {
        count as f64 / window_len as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::make_test_records;

    const THRESHOLD: f64 = 0.005;

    #[test]
    fn test_100_entries_per_report() {
        let history = make_test_records(60);
        let report = compute_trends(&history, 10, 50, THRESHOLD);
        assert_eq!(report.scores.len(), 100);
        for (i, score) in report.scores.iter().enumerate() {
            assert_eq!(score.number as usize, i);
        }
    }

    #[test]
    fn test_sufficient_history_no_flag() {
        let history = make_test_records(60);
        let report = compute_trends(&history, 10, 50, THRESHOLD);
        assert!(!report.insufficient_history);
        assert_eq!(report.effective_long_window, 50);
    }

    #[test]
    fn test_insufficient_history_flagged() {
        // Fenêtre longue de 50 mais seulement 30 tirages : drapeau levé,
        // fenêtre longue effective ramenée à 30
        let history = make_test_records(30);
        let report = compute_trends(&history, 10, 50, THRESHOLD);
        assert!(report.insufficient_history);
        assert_eq!(report.effective_long_window, 30);
    }

    #[test]
    fn test_empty_history_all_flat() {
        let report = compute_trends(&[], 10, 50, THRESHOLD);
        assert!(report.insufficient_history);
        assert_eq!(report.effective_long_window, 0);
        for score in &report.scores {
            assert_eq!(score.recent_rate, 0.0);
            assert_eq!(score.baseline_rate, 0.0);
            assert_eq!(score.direction, TrendDirection::Flat);
        }
    }

    #[test]
    fn test_rising_number() {
        // Le numéro 5 sort à chacun des 10 tirages récents, jamais avant
        let mut history = make_test_records(50);
        for record in history.iter_mut() {
            if record.number == 5 {
                record.number = 6;
            }
        }
        for record in history.iter_mut().take(10) {
            record.number = 5;
        }

        let report = compute_trends(&history, 10, 50, THRESHOLD);
        let score = &report.scores[5];
        assert!((score.recent_rate - 1.0).abs() < 1e-9);
        assert!((score.baseline_rate - 0.2).abs() < 1e-9);
        assert_eq!(score.direction, TrendDirection::Rising);
    }

    #[test]
    fn test_falling_number() {
        // Le numéro 5 sort souvent dans le passé mais plus du tout récemment
        let mut history = make_test_records(50);
        for record in history.iter_mut() {
            record.number = if record.number == 5 { 6 } else { record.number };
        }
        for record in history.iter_mut().skip(20) {
            record.number = 5;
        }

        let report = compute_trends(&history, 10, 50, THRESHOLD);
        let score = &report.scores[5];
        assert_eq!(score.recent_rate, 0.0);
        assert!(score.baseline_rate > 0.0);
        assert_eq!(score.direction, TrendDirection::Falling);
    }

    #[test]
    fn test_flat_within_threshold() {
        // Même taux sur les deux fenêtres : delta nul, STABLE
        let mut history = make_test_records(50);
        for (i, record) in history.iter_mut().enumerate() {
            record.number = (i % 5) as u8;
        }
        let report = compute_trends(&history, 10, 50, THRESHOLD);
        for n in 0..5 {
            assert_eq!(report.scores[n].direction, TrendDirection::Flat);
            assert!(report.scores[n].delta.abs() < 1e-9);
        }
    }

    #[test]
    fn test_idempotent() {
        let history = make_test_records(70);
        let a = compute_trends(&history, 10, 50, THRESHOLD);
        let b = compute_trends(&history, 10, 50, THRESHOLD);
        assert_eq!(a, b);
    }
}

use std::cmp::Ordering;

use crate::types::{NumberStat, Prediction, TrendReport};

#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub frequency: f64,
    pub trend: f64,
}

/// Fusionne les deux signaux en un classement unique.
///
/// Normalisation : chaque signal (ratio de déviation, delta de tendance) est
/// ramené sur [0, 1] par min–max sur les 100 numéros du calcul courant ; un
/// signal constant sur tout le pool vaut 0.5 partout. Les poids sont des
/// réels positifs quelconques (un poids nul désactive son signal) ; ils n'ont
/// pas à sommer à 1.
///
/// Égalités : départagées par apparitions brutes décroissantes, puis numéro
/// croissant. Jamais par ordre d'insertion.
///
/// La confiance mesure l'écart du score au score moyen du pool, ramené sur
/// [0, 1]. C'est une confiance relative au calcul courant, pas une
/// probabilité calibrée ; chaque prédiction le rappelle dans `reasoning`.
///
/// Préconditions (validées par `EngineConfig::validate`) : top_n > 0, poids
/// positifs non tous nuls.
pub fn combine(
    stats: &[NumberStat],
    trends: &TrendReport,
    weights: &ScoreWeights,
    top_n: usize,
) -> Vec<Prediction> {
    debug_assert!(top_n > 0);
    debug_assert!(weights.frequency >= 0.0 && weights.trend >= 0.0);
    debug_assert!(weights.frequency + weights.trend > 0.0);
    debug_assert_eq!(stats.len(), trends.scores.len());

    let freq_signal: Vec<f64> = stats.iter().map(|s| s.deviation_ratio).collect();
    let trend_signal: Vec<f64> = trends.scores.iter().map(|t| t.delta).collect();
    let freq_norm = min_max_normalize(&freq_signal);
    let trend_norm = min_max_normalize(&trend_signal);

    let scores: Vec<f64> = (0..stats.len())
        .map(|i| weights.frequency * freq_norm[i] + weights.trend * trend_norm[i])
        .collect();

    let mean = scores.iter().sum::<f64>() / scores.len().max(1) as f64;
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let mut order: Vec<usize> = (0..stats.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| stats[b].occurrences.cmp(&stats[a].occurrences))
            .then_with(|| stats[a].number.cmp(&stats[b].number))
    });

    order
        .into_iter()
        .take(top_n)
        .map(|i| {
            let confidence = if max > mean {
                ((scores[i] - mean) / (max - mean)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Prediction {
                number: stats[i].number,
                combined_score: scores[i],
                confidence,
                reasoning: build_reasoning(&stats[i], trends, i),
            }
        })
        .collect()
}

fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() || (max - min) < 1e-12 {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

/// Texte explicatif déterministe : classification, tendance et les valeurs
/// numériques qui ont produit le score.
fn build_reasoning(stat: &NumberStat, trends: &TrendReport, index: usize) -> Vec<String> {
    let trend = &trends.scores[index];
    let mut lines = vec![
        format!(
            "Fréquence : {} ({} apparitions, ratio {:.2})",
            stat.classification, stat.occurrences, stat.deviation_ratio
        ),
        format!("Tendance : {} (delta {:+.4})", trend.direction, trend.delta),
    ];
    if trends.insufficient_history {
        lines.push(format!(
            "Historique insuffisant : fenêtre longue réduite à {} tirages",
            trends.effective_long_window
        ));
    }
    lines.push("Confiance relative à ce calcul, pas une probabilité calibrée".to_string());
    lines
}

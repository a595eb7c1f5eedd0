use chrono::NaiveDate;
use serde::Serialize;

use quiniela_db::models::DrawRecord;

/// Fenêtre d'analyse : les N derniers tirages, ou tous les tirages depuis une date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnalysisWindow {
    LastDraws(usize),
    SinceDate(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Hot,
    Cold,
    Normal,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Hot => write!(f, "HOT"),
            Classification::Cold => write!(f, "COLD"),
            Classification::Normal => write!(f, "-"),
        }
    }
}

/// Statistique de fréquence d'un numéro sur la fenêtre active. Recalculée à
/// chaque appel, jamais persistée : c'est une vue sur l'historique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberStat {
    pub number: u8,
    pub occurrences: u32,
    pub last_seen: Option<NaiveDate>,
    /// Taux attendu sous l'hypothèse uniforme : 1/100.
    pub expected_rate: f64,
    /// occurrences / occurrences attendues sur la fenêtre.
    pub deviation_ratio: f64,
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Rising => write!(f, "EN HAUSSE"),
            TrendDirection::Falling => write!(f, "EN BAISSE"),
            TrendDirection::Flat => write!(f, "STABLE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendScore {
    pub number: u8,
    /// Taux par tirage sur la fenêtre courte.
    pub recent_rate: f64,
    /// Taux par tirage sur la fenêtre longue.
    pub baseline_rate: f64,
    pub delta: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub scores: Vec<TrendScore>,
    /// Vrai si l'historique est plus court que la fenêtre longue demandée.
    /// La tendance est alors calculée sur tout l'historique disponible ;
    /// l'appelant choisit s'il lui fait confiance.
    pub insufficient_history: bool,
    pub effective_long_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub number: u8,
    pub combined_score: f64,
    /// Confiance relative au calcul courant, dans [0, 1]. Ce n'est pas une
    /// probabilité calibrée ; le texte de `reasoning` le rappelle.
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

/// Sortie complète d'un calcul : classement combiné plus les vues fréquence
/// et tendance, pour affichage et audit indépendants du classement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    pub predictions: Vec<Prediction>,
    pub stats: Vec<NumberStat>,
    pub trends: TrendReport,
}

/// Historique déterministe pour les tests : un tirage par jour, du plus
/// récent au plus ancien, numéros répartis sur tout le pool.
pub fn make_test_records(n: usize) -> Vec<DrawRecord> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|i| DrawRecord {
            date: base + chrono::Days::new((n - 1 - i) as u64),
            position: 1,
            number: ((i * 7) % 100) as u8,
            prize: None,
        })
        .collect()
}

use anyhow::{bail, Result};
use std::time::Duration;

use crate::types::AnalysisWindow;

/// Paramètres du moteur. Chaque champ a un défaut documenté et peut être
/// surchargé indépendamment à chaque appel. Les combinaisons invalides sont
/// rejetées par `validate` avant tout calcul, jamais corrigées en silence.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fenêtre de la vue fréquence. `None` = tout l'historique fourni.
    pub window: Option<AnalysisWindow>,
    /// Fenêtre courte de la tendance (défaut : 10 tirages).
    pub short_window: usize,
    /// Fenêtre longue de la tendance (défaut : 50 tirages).
    pub long_window: usize,
    /// Poids du signal fréquence (défaut : 0.4). Zéro désactive le signal.
    pub frequency_weight: f64,
    /// Poids du signal tendance (défaut : 0.3). Zéro désactive le signal.
    pub trend_weight: f64,
    /// Ratio de déviation au-dessus duquel un numéro est HOT (défaut : 1.2).
    pub hot_threshold: f64,
    /// Ratio de déviation en dessous duquel un numéro est COLD (défaut : 0.8).
    pub cold_threshold: f64,
    /// Delta de taux au-delà duquel la tendance est EN HAUSSE / EN BAISSE
    /// (défaut : 0.005, soit la moitié du taux de base 1/100).
    pub trend_threshold: f64,
    /// Nombre de prédictions retournées (défaut : 10).
    pub top_n: usize,
    /// Durée de vie d'une entrée du cache (défaut : une heure).
    pub cache_ttl: Duration,
    /// Nombre maximal d'entrées du cache avant éviction LRU (défaut : 64).
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: None,
            short_window: 10,
            long_window: 50,
            frequency_weight: 0.4,
            trend_weight: 0.3,
            hot_threshold: 1.2,
            cold_threshold: 0.8,
            trend_threshold: 0.005,
            top_n: 10,
            cache_ttl: Duration::from_secs(3600),
            cache_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 {
            bail!("Fenêtre courte nulle");
        }
        if self.short_window >= self.long_window {
            bail!(
                "Fenêtre courte ({}) doit être strictement inférieure à la fenêtre longue ({})",
                self.short_window,
                self.long_window
            );
        }
        if self.top_n == 0 {
            bail!("top_n doit être supérieur à 0");
        }
        if self.frequency_weight < 0.0 || self.trend_weight < 0.0 {
            bail!(
                "Poids négatif interdit (fréquence {}, tendance {})",
                self.frequency_weight,
                self.trend_weight
            );
        }
        if self.frequency_weight == 0.0 && self.trend_weight == 0.0 {
            bail!("Les deux poids sont nuls : rien à classer");
        }
        if self.hot_threshold <= self.cold_threshold {
            bail!(
                "Seuil chaud ({}) doit être supérieur au seuil froid ({})",
                self.hot_threshold,
                self.cold_threshold
            );
        }
        if self.trend_threshold <= 0.0 {
            bail!("Seuil de tendance doit être strictement positif");
        }
        if let Some(AnalysisWindow::LastDraws(0)) = self.window {
            bail!("Fenêtre d'analyse nulle");
        }
        if self.cache_capacity == 0 {
            bail!("Capacité de cache nulle");
        }
        Ok(())
    }
}

pub mod cache;
pub mod config;
pub mod frequency;
pub mod scorer;
pub mod trend;
pub mod types;

use anyhow::Result;
use std::sync::Arc;

use quiniela_db::models::DrawRecord;

use crate::cache::{CacheKey, PredictionCache};
use crate::config::EngineConfig;
use crate::scorer::ScoreWeights;
use crate::types::{Prediction, PredictionOutput};

/// Calcul complet sur un instantané d'historique (du plus récent au plus
/// ancien) : validation de la configuration, puis vues fréquence et tendance
/// en parallèle (elles sont indépendantes), puis fusion. Tout ou rien : une
/// configuration invalide est rejetée avant le moindre calcul et aucune
/// sortie partielle n'est produite.
pub fn run_prediction(history: &[DrawRecord], config: &EngineConfig) -> Result<PredictionOutput> {
    config.validate()?;

    let (stats, trends) = rayon::join(
        || {
            frequency::compute_frequencies(
                history,
                config.window.as_ref(),
                config.hot_threshold,
                config.cold_threshold,
            )
        },
        || {
            trend::compute_trends(
                history,
                config.short_window,
                config.long_window,
                config.trend_threshold,
            )
        },
    );

    let weights = ScoreWeights {
        frequency: config.frequency_weight,
        trend: config.trend_weight,
    };
    let predictions = scorer::combine(&stats, &trends, &weights, config.top_n);

    Ok(PredictionOutput {
        predictions,
        stats,
        trends,
    })
}

/// Moteur avec mémoïsation : le classement est mis en cache sous une clé
/// dérivée des paramètres et d'une empreinte de l'historique. Des appels
/// répétés sur un historique inchangé ne recalculent rien avant l'expiration
/// du TTL ; tout nouveau tirage déplace l'empreinte et force le recalcul.
///
/// Point d'entrée pour les hôtes de longue durée (service, REPL) qui
/// enchaînent les requêtes : le cache n'a de valeur que si le `Predictor`
/// survit entre les appels. Pour un calcul ponctuel, comme dans le binaire
/// en ligne de commande, [`run_prediction`] suffit.
pub struct Predictor {
    cache: PredictionCache,
}

impl Predictor {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: PredictionCache::new(cache_capacity),
        }
    }

    pub fn predict(
        &self,
        history: &[DrawRecord],
        config: &EngineConfig,
    ) -> Result<Arc<Vec<Prediction>>> {
        config.validate()?;

        let key = CacheKey::new(config, history);
        let weights = ScoreWeights {
            frequency: config.frequency_weight,
            trend: config.trend_weight,
        };
        Ok(self.cache.get_or_compute(key, config.cache_ttl, || {
            let (stats, trends) = rayon::join(
                || {
                    frequency::compute_frequencies(
                        history,
                        config.window.as_ref(),
                        config.hot_threshold,
                        config.cold_threshold,
                    )
                },
                || {
                    trend::compute_trends(
                        history,
                        config.short_window,
                        config.long_window,
                        config.trend_threshold,
                    )
                },
            );
            scorer::combine(&stats, &trends, &weights, config.top_n)
        }))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

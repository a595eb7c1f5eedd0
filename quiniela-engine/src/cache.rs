use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use quiniela_db::models::DrawRecord;

use crate::config::EngineConfig;
use crate::types::{AnalysisWindow, Prediction};

/// Clé de cache : paramètres de fenêtres, de seuils et de pondération, plus
/// une empreinte de l'historique (nombre de tirages + identité du plus
/// récent). Tout changement d'historique ou de paramètre donne une clé
/// différente, donc un cache miss. Les valeurs f64 sont stockées par leurs
/// bits pour rester hachables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    window: Option<AnalysisWindow>,
    short_window: usize,
    long_window: usize,
    frequency_weight_bits: u64,
    trend_weight_bits: u64,
    hot_threshold_bits: u64,
    cold_threshold_bits: u64,
    trend_threshold_bits: u64,
    top_n: usize,
    history_len: usize,
    latest: Option<(NaiveDate, u8)>,
}

impl CacheKey {
    pub fn new(config: &EngineConfig, history: &[DrawRecord]) -> Self {
        Self {
            window: config.window,
            short_window: config.short_window,
            long_window: config.long_window,
            frequency_weight_bits: config.frequency_weight.to_bits(),
            trend_weight_bits: config.trend_weight.to_bits(),
            hot_threshold_bits: config.hot_threshold.to_bits(),
            cold_threshold_bits: config.cold_threshold.to_bits(),
            trend_threshold_bits: config.trend_threshold.to_bits(),
            top_n: config.top_n,
            history_len: history.len(),
            // Historique du plus récent au plus ancien
            latest: history.first().map(|r| (r.date, r.position)),
        }
    }
}

struct Slot {
    value: Arc<OnceLock<Arc<Vec<Prediction>>>>,
    inserted_at: Instant,
    last_used: Instant,
}

/// Cache borné en mémoire des sorties du scoreur combiné. Expiration TTL
/// mesurée depuis l'insertion, éviction LRU au-delà de la capacité. Peut être
/// vidé à tout moment sans autre coût qu'un recalcul.
pub struct PredictionCache {
    capacity: usize,
    entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl PredictionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Retourne la valeur en cache pour `key` si elle n'a pas expiré, sinon
    /// exécute `compute` et mémorise son résultat. Garantie : au plus un
    /// calcul en vol par clé ; les appelants concurrents sur la même clé
    /// attendent ce calcul et partagent son résultat (via `OnceLock`).
    pub fn get_or_compute<F>(&self, key: CacheKey, ttl: Duration, compute: F) -> Arc<Vec<Prediction>>
    where
        F: FnOnce() -> Vec<Prediction>,
    {
        let cell = {
            let mut entries = self.lock_entries();
            let now = Instant::now();

            let live = match entries.get_mut(&key) {
                Some(slot) if now.duration_since(slot.inserted_at) < ttl => {
                    slot.last_used = now;
                    Some(slot.value.clone())
                }
                _ => None,
            };

            match live {
                Some(cell) => cell,
                None => {
                    // Entrée absente ou expirée : une entrée expirée est
                    // traitée comme absente, jamais servie telle quelle
                    let slot = Slot {
                        value: Arc::new(OnceLock::new()),
                        inserted_at: now,
                        last_used: now,
                    };
                    let cell = slot.value.clone();
                    entries.insert(key.clone(), slot);
                    Self::evict_lru(&mut entries, self.capacity, &key);
                    cell
                }
            }
        };
        // Le verrou de la table est relâché : le calcul ne bloque que les
        // appelants de la même clé
        cell.get_or_init(|| Arc::new(compute())).clone()
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn evict_lru(entries: &mut HashMap<CacheKey, Slot>, capacity: usize, protected: &CacheKey) {
        while entries.len() > capacity {
            let oldest = entries
                .iter()
                .filter(|(key, _)| *key != protected)
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use crate::types::make_test_records;

    fn key_for(top_n: usize, history_len: usize) -> CacheKey {
        let mut config = EngineConfig::default();
        config.top_n = top_n;
        let history = make_test_records(history_len);
        CacheKey::new(&config, &history)
    }

    fn prediction(number: u8) -> Prediction {
        Prediction {
            number,
            combined_score: 1.0,
            confidence: 0.5,
            reasoning: vec![],
        }
    }

    #[test]
    fn test_second_call_hits_cache() {
        let cache = PredictionCache::new(8);
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(3600);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![prediction(7)]
        };
        let a = cache.get_or_compute(key_for(10, 50), ttl, compute);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![prediction(7)]
        };
        let b = cache.get_or_compute(key_for(10, 50), ttl, compute);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_key_recomputes() {
        let cache = PredictionCache::new(8);
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(3600);

        cache.get_or_compute(key_for(10, 50), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });
        // top_n différent
        cache.get_or_compute(key_for(5, 50), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });
        // historique différent (empreinte : longueur + dernier tirage)
        cache.get_or_compute(key_for(10, 51), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_threshold_change_yields_new_key() {
        let history = make_test_records(50);
        let base = CacheKey::new(&EngineConfig::default(), &history);

        let mut config = EngineConfig::default();
        config.hot_threshold = 10.0;
        assert_ne!(base, CacheKey::new(&config, &history));

        let mut config = EngineConfig::default();
        config.cold_threshold = 0.1;
        assert_ne!(base, CacheKey::new(&config, &history));

        let mut config = EngineConfig::default();
        config.trend_threshold = 0.05;
        assert_ne!(base, CacheKey::new(&config, &history));
    }

    #[test]
    fn test_expired_entry_recomputed() {
        let cache = PredictionCache::new(8);
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_millis(30);

        cache.get_or_compute(key_for(10, 50), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });
        thread::sleep(Duration::from_millis(60));
        cache.get_or_compute(key_for(10, 50), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lru_eviction_past_capacity() {
        let cache = PredictionCache::new(2);
        let ttl = Duration::from_secs(3600);

        cache.get_or_compute(key_for(1, 10), ttl, Vec::new);
        thread::sleep(Duration::from_millis(5));
        cache.get_or_compute(key_for(2, 10), ttl, Vec::new);
        thread::sleep(Duration::from_millis(5));
        // Rafraîchit la clé 1, la clé 2 devient la moins récemment utilisée
        cache.get_or_compute(key_for(1, 10), ttl, Vec::new);
        thread::sleep(Duration::from_millis(5));
        cache.get_or_compute(key_for(3, 10), ttl, Vec::new);

        assert_eq!(cache.len(), 2);
        let calls = AtomicUsize::new(0);
        cache.get_or_compute(key_for(1, 10), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });
        cache.get_or_compute(key_for(2, 10), ttl, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![]
        });
        // 1 était encore en cache, 2 avait été évincée
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let cache = Arc::new(PredictionCache::new(8));
        let calls = Arc::new(AtomicUsize::new(0));
        let ttl = Duration::from_secs(3600);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache.get_or_compute(key_for(10, 50), ttl, move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(40));
                        vec![prediction(7)]
                    })
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in &results {
            assert!(Arc::ptr_eq(result, &results[0]));
        }
    }

    #[test]
    fn test_clear() {
        let cache = PredictionCache::new(8);
        let ttl = Duration::from_secs(3600);
        cache.get_or_compute(key_for(10, 50), ttl, Vec::new);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}

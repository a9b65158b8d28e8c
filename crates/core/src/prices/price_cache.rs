use super::prices_model::{normalize_symbol, CurrencyRecord};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory read view of the current-price table.
///
/// The map is never edited in place. A reload builds a new map and swaps the
/// shared pointer, so a reader holding a snapshot sees either the old or the
/// new table in full.
#[derive(Debug, Default)]
pub struct PriceCache {
    snapshot: RwLock<Arc<HashMap<String, CurrencyRecord>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. The read guard is held only long enough to clone
    /// the pointer.
    pub fn snapshot(&self) -> Arc<HashMap<String, CurrencyRecord>> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swaps in a freshly loaded table and returns its size.
    pub fn replace(&self, prices: HashMap<String, CurrencyRecord>) -> usize {
        let len = prices.len();
        let next = Arc::new(prices);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        len
    }

    /// Case-insensitive lookup.
    pub fn get(&self, currency_type: &str) -> Option<CurrencyRecord> {
        self.snapshot()
            .get(&normalize_symbol(currency_type))
            .cloned()
    }

    pub fn contains(&self, currency_type: &str) -> bool {
        self.snapshot()
            .contains_key(&normalize_symbol(currency_type))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> HashMap<String, CurrencyRecord> {
        entries
            .iter()
            .map(|(s, p)| {
                (
                    s.to_string(),
                    CurrencyRecord::from_store(s.to_string(), p.to_string()),
                )
            })
            .collect()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let cache = PriceCache::new();
        cache.replace(table(&[("ETH", "1234.5")]));
        assert_eq!(cache.get("eth").unwrap().currency_price, "1234.5");
        assert!(cache.contains("Eth"));
        assert!(cache.get("btc").is_none());
    }

    #[test]
    fn replace_drops_entries_missing_from_new_table() {
        let cache = PriceCache::new();
        cache.replace(table(&[("ETH", "1"), ("BTC", "2")]));
        assert_eq!(cache.replace(table(&[("BTC", "3")])), 1);
        assert!(!cache.contains("ETH"));
        assert_eq!(cache.get("BTC").unwrap().currency_price, "3");
    }

    #[test]
    fn held_snapshot_survives_replace() {
        let cache = PriceCache::new();
        cache.replace(table(&[("ETH", "1")]));
        let before = cache.snapshot();
        cache.replace(table(&[("BTC", "2")]));
        assert!(before.contains_key("ETH"));
        assert!(!before.contains_key("BTC"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn new_cache_is_empty() {
        assert!(PriceCache::new().is_empty());
    }
}

//! Process-wide watch-list and mode state.
//!
//! One lock guards the whole state object, so every read observes a
//! fully applied write. Critical sections never await; callers take a
//! [`WatchListSnapshot`] and release the lock before doing slow work.

use crate::domain::errors::WatchListError;
use crate::domain::market::{Interval, Symbol};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Immutable copy of the state taken at the start of a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchListSnapshot {
    pub symbols: Vec<Symbol>,
    pub interval: Interval,
    pub active: bool,
}

#[derive(Debug)]
struct WatchListState {
    // Insertion-ordered set; uniqueness is enforced by `add`
    symbols: Vec<Symbol>,
    interval: Interval,
    active: bool,
}

#[derive(Debug)]
pub struct WatchList {
    state: RwLock<WatchListState>,
}

impl WatchList {
    /// Creates the state with the given defaults, paused.
    /// Duplicate symbols in `symbols` are collapsed, keeping first position.
    pub fn new(symbols: impl IntoIterator<Item = Symbol>, interval: Interval) -> Self {
        let mut unique: Vec<Symbol> = Vec::new();
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }

        Self {
            state: RwLock::new(WatchListState {
                symbols: unique,
                interval,
                active: false,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, WatchListState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, WatchListState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, symbol: Symbol) -> Result<(), WatchListError> {
        let mut state = self.write();
        if state.symbols.contains(&symbol) {
            return Err(WatchListError::AlreadyPresent(symbol));
        }
        info!("WatchList: Added {}", symbol);
        state.symbols.push(symbol);
        Ok(())
    }

    pub fn remove(&self, symbol: &Symbol) -> Result<(), WatchListError> {
        let mut state = self.write();
        let position = state
            .symbols
            .iter()
            .position(|s| s == symbol)
            .ok_or_else(|| WatchListError::NotFound(symbol.clone()))?;
        state.symbols.remove(position);
        info!("WatchList: Removed {}", symbol);
        Ok(())
    }

    pub fn list(&self) -> Vec<Symbol> {
        self.read().symbols.clone()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.read().symbols.contains(symbol)
    }

    /// Replaces the active interval and returns the previous one
    pub fn set_interval(&self, interval: Interval) -> Interval {
        let mut state = self.write();
        let previous = std::mem::replace(&mut state.interval, interval);
        info!("WatchList: Interval changed {} -> {}", previous, interval);
        previous
    }

    /// Parses `raw` before taking the lock; on rejection the state is untouched.
    pub fn set_interval_str(&self, raw: &str) -> Result<Interval, WatchListError> {
        let interval: Interval = raw.parse()?;
        self.set_interval(interval);
        Ok(interval)
    }

    pub fn get_interval(&self) -> Interval {
        self.read().interval
    }

    /// Returns the previous flag value
    pub fn set_active(&self, active: bool) -> bool {
        let mut state = self.write();
        let previous = std::mem::replace(&mut state.active, active);
        if previous != active {
            info!(
                "WatchList: Automatic mode {}",
                if active { "enabled" } else { "paused" }
            );
        }
        previous
    }

    pub fn is_active(&self) -> bool {
        self.read().active
    }

    pub fn snapshot(&self) -> WatchListSnapshot {
        let state = self.read();
        WatchListSnapshot {
            symbols: state.symbols.clone(),
            interval: state.interval,
            active: state.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::InvalidInterval;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn default_list() -> WatchList {
        WatchList::new(vec![sym("BTC-USDT"), sym("ETH-USDT")], Interval::OneHour)
    }

    #[test]
    fn test_new_dedups_and_starts_paused() {
        let list = WatchList::new(
            vec![sym("BTC-USDT"), sym("ETH-USDT"), sym("btc-usdt")],
            Interval::OneHour,
        );
        assert_eq!(list.list(), vec![sym("BTC-USDT"), sym("ETH-USDT")]);
        assert!(!list.is_active());
    }

    #[test]
    fn test_add_is_idempotent_in_effect() {
        let list = default_list();
        assert_eq!(list.add(sym("SOL-USDT")), Ok(()));
        for _ in 0..3 {
            assert_eq!(
                list.add(sym("SOL-USDT")),
                Err(WatchListError::AlreadyPresent(sym("SOL-USDT")))
            );
        }

        let symbols = list.list();
        assert_eq!(symbols.iter().filter(|s| **s == sym("SOL-USDT")).count(), 1);
        // Insertion order preserved
        assert_eq!(symbols.last(), Some(&sym("SOL-USDT")));
    }

    #[test]
    fn test_remove_missing_leaves_list_unchanged() {
        let list = default_list();
        let before = list.list();
        assert_eq!(
            list.remove(&sym("DOGE-USDT")),
            Err(WatchListError::NotFound(sym("DOGE-USDT")))
        );
        assert_eq!(list.list(), before);

        assert_eq!(list.remove(&sym("BTC-USDT")), Ok(()));
        assert_eq!(list.list(), vec![sym("ETH-USDT")]);
    }

    #[test]
    fn test_invalid_interval_keeps_previous_value() {
        let list = default_list();
        assert_eq!(
            list.set_interval_str("bogus"),
            Err(WatchListError::InvalidInterval(InvalidInterval(
                "bogus".to_string()
            )))
        );
        assert_eq!(list.get_interval(), Interval::OneHour);

        assert_eq!(list.set_interval_str("1day"), Ok(Interval::OneDay));
        assert_eq!(list.get_interval(), Interval::OneDay);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_writes() {
        let list = default_list();
        list.set_active(true);
        let snapshot = list.snapshot();

        list.add(sym("SOL-USDT")).unwrap();
        list.set_interval(Interval::FiveMin);
        list.set_active(false);

        assert_eq!(snapshot.symbols.len(), 2);
        assert_eq!(snapshot.interval, Interval::OneHour);
        assert!(snapshot.active);
    }

    #[test]
    fn test_concurrent_writers_never_duplicate() {
        let list = std::sync::Arc::new(default_list());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let list = list.clone();
                std::thread::spawn(move || list.add(sym("SOL-USDT")).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(list.list().len(), 3);
    }
}

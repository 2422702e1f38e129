use marketwatch::domain::errors::WatchListError;
use marketwatch::domain::market::{Interval, Symbol};
use marketwatch::domain::watchlist::WatchList;
use std::sync::Arc;

fn sym(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

#[test]
fn test_rejected_interval_leaves_state_untouched() {
    let list = WatchList::new(vec![sym("BTC-USDT")], Interval::FifteenMin);
    let before = list.snapshot();

    for raw in ["bogus", "", "2hours", "1 hour"] {
        assert!(matches!(
            list.set_interval_str(raw),
            Err(WatchListError::InvalidInterval(_))
        ));
    }
    assert_eq!(list.snapshot(), before);

    assert_eq!(list.set_interval_str(" 1WEEK "), Ok(Interval::OneWeek));
    assert_eq!(list.get_interval(), Interval::OneWeek);
}

#[test]
fn test_add_remove_roundtrip_preserves_order() {
    let list = WatchList::new(vec![sym("BTC-USDT"), sym("ETH-USDT")], Interval::OneHour);

    list.add(sym("SOL-USDT")).unwrap();
    list.add(sym("LDO-USDT")).unwrap();
    list.remove(&sym("ETH-USDT")).unwrap();

    assert_eq!(
        list.list(),
        vec![sym("BTC-USDT"), sym("SOL-USDT"), sym("LDO-USDT")]
    );
    assert_eq!(
        list.remove(&sym("ETH-USDT")),
        Err(WatchListError::NotFound(sym("ETH-USDT")))
    );
}

#[test]
fn test_snapshot_is_isolated_from_later_writes() {
    let list = WatchList::new(vec![sym("BTC-USDT")], Interval::OneHour);
    let snapshot = list.snapshot();

    list.add(sym("ETH-USDT")).unwrap();
    list.set_interval(Interval::OneDay);
    list.set_active(true);

    assert_eq!(snapshot.symbols, vec![sym("BTC-USDT")]);
    assert_eq!(snapshot.interval, Interval::OneHour);
    assert!(!snapshot.active);
}

#[test]
fn test_concurrent_adds_of_same_symbol_keep_one_entry() {
    let list = Arc::new(WatchList::new(Vec::<Symbol>::new(), Interval::OneHour));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let list = list.clone();
            std::thread::spawn(move || list.add(sym("AAVE-USDT")).is_ok())
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(list.list(), vec![sym("AAVE-USDT")]);
}

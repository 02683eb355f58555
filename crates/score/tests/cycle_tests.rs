use chrono::Utc;
use kizashi_core::common::Symbol;
use kizashi_core::score::entity::{AlertEvent, CompositeScore};
use kizashi_core::signal::entity::{SignalContribution, SourceKind};
use kizashi_score::{AlertTracker, ScoreAggregator};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn contrib(source: SourceKind, symbol: &str, value: Decimal) -> SignalContribution {
    SignalContribution {
        source,
        symbol: Symbol::from(symbol),
        value,
        as_of: Utc::now(),
    }
}

/// 按调度器的顺序跑一个周期：聚合 -> 比对 -> 提交
fn run_cycle(
    tracker: &mut AlertTracker,
    cycle: u64,
    symbols: &[&str],
    contribs: &[SignalContribution],
) -> (Vec<CompositeScore>, Vec<AlertEvent>) {
    let scores: Vec<CompositeScore> = symbols
        .iter()
        .map(|s| {
            let symbol = Symbol::from(*s);
            let previous = tracker.previous(&symbol);
            ScoreAggregator.aggregate(&symbol, contribs, previous, cycle)
        })
        .collect();
    let alerts = tracker.diff(cycle, &scores);
    tracker.commit(&scores);
    (scores, alerts)
}

#[test]
fn test_score_change_between_cycles_raises_alert() {
    let mut tracker = AlertTracker::new();

    let (scores, alerts) = run_cycle(
        &mut tracker,
        1,
        &["AAA"],
        &[
            contrib(SourceKind::News, "AAA", dec!(1)),
            contrib(SourceKind::Earnings, "AAA", dec!(1)),
            contrib(SourceKind::Ipo, "AAA", dec!(0)),
        ],
    );
    assert_eq!(scores[0].total, dec!(2));
    assert!(alerts.is_empty());

    let (scores, alerts) = run_cycle(
        &mut tracker,
        2,
        &["AAA"],
        &[
            contrib(SourceKind::News, "AAA", dec!(1)),
            contrib(SourceKind::Earnings, "AAA", dec!(-1)),
            contrib(SourceKind::Ipo, "AAA", dec!(0)),
        ],
    );
    assert_eq!(scores[0].total, dec!(0));
    assert_eq!(
        alerts,
        vec![AlertEvent {
            symbol: Symbol::from("AAA"),
            previous: dec!(2),
            current: dec!(0),
            cycle: 2,
        }]
    );
}

#[test]
fn test_alert_previous_equals_last_committed_total() {
    let mut tracker = AlertTracker::new();
    let totals = [dec!(1), dec!(-0.5), dec!(2), dec!(2), dec!(-1)];
    let mut last: Option<Decimal> = None;

    for (i, total) in totals.iter().enumerate() {
        let cycle = u64::try_from(i).unwrap() + 1;
        let (_, alerts) = run_cycle(
            &mut tracker,
            cycle,
            &["XYZ"],
            &[contrib(SourceKind::Cot, "XYZ", *total)],
        );
        match last {
            Some(prev) if prev != *total => {
                assert_eq!(alerts.len(), 1);
                assert_eq!(alerts[0].previous, prev);
                assert_eq!(alerts[0].current, *total);
            }
            _ => assert!(alerts.is_empty()),
        }
        last = Some(*total);
    }
}

#[test]
fn test_replaying_identical_contributions_is_quiet() {
    let mut tracker = AlertTracker::new();
    let contribs = [
        contrib(SourceKind::News, "AAPL", dec!(1)),
        contrib(SourceKind::Macro, "AAPL", dec!(-0.5)),
        contrib(SourceKind::Macro, "MSFT", dec!(-0.5)),
    ];
    run_cycle(&mut tracker, 1, &["AAPL", "MSFT"], &contribs);
    let (_, alerts) = run_cycle(&mut tracker, 2, &["AAPL", "MSFT"], &contribs);
    assert!(alerts.is_empty());
}

#[test]
fn test_total_outage_carries_forward_without_alert() {
    let mut tracker = AlertTracker::new();
    run_cycle(
        &mut tracker,
        1,
        &["BBB"],
        &[contrib(SourceKind::Earnings, "BBB", dec!(1))],
    );

    let (scores, alerts) = run_cycle(&mut tracker, 2, &["BBB"], &[]);
    assert_eq!(scores[0].total, dec!(1));
    assert_eq!(scores[0].cycle, 2);
    assert!(alerts.is_empty());
}

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use kizashi_cache::fetcher::CachedFetcher;
use kizashi_cache::mem::MemCache;
use kizashi_core::common::Symbol;
use kizashi_core::common::time::{FakeClockProvider, TimeProvider};
use kizashi_core::config::ScannerConfig;
use kizashi_core::score::entity::{AlertEvent, ScoreStatus, Sentiment};
use kizashi_core::signal::entity::{SourceKind, SourceScope};
use kizashi_core::signal::error::FetchError;
use kizashi_core::signal::mock::{MockFeed, MockResponse, MockSource};
use kizashi_core::signal::port::SignalSource;
use kizashi_scanner::{CyclePhase, Scheduler, SnapshotStore, SourceBinding};
use kizashi_signal::quote::QuoteSource;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    clock: Arc<FakeClockProvider>,
    store: Arc<SnapshotStore>,
    bindings: Vec<SourceBinding>,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2025, 7, 16, 14, 0, 0).unwrap(),
        ));
        Self {
            store: Arc::new(SnapshotStore::new(clock.now())),
            clock,
            bindings: Vec::new(),
        }
    }

    /// 挂载一个脚本化来源，ttl 为 0 时每周期都调用上游
    fn mock(&mut self, kind: SourceKind, scope: SourceScope, ttl_secs: u64) -> Arc<MockFeed> {
        self.with_source(kind, scope, ttl_secs, Arc::new(MockSource::new(kind)))
    }

    fn with_source(
        &mut self,
        kind: SourceKind,
        scope: SourceScope,
        ttl_secs: u64,
        source: Arc<dyn SignalSource>,
    ) -> Arc<MockFeed> {
        let feed = Arc::new(MockFeed::new(kind, scope));
        let fetcher = Arc::new(CachedFetcher::new(
            Arc::new(MemCache::new()),
            self.clock.clone(),
            Duration::from_secs(ttl_secs),
        ));
        self.bindings
            .push(SourceBinding::new(feed.clone(), source, fetcher).unwrap());
        feed
    }

    fn scheduler(
        self,
        watchlist: &[&str],
    ) -> (Scheduler, Arc<SnapshotStore>, Arc<FakeClockProvider>) {
        let config = ScannerConfig {
            watchlist: watchlist.iter().map(|s| s.to_string()).collect(),
            ..ScannerConfig::default()
        };
        let scheduler =
            Scheduler::new(&config, self.bindings, self.store.clone(), self.clock.clone())
                .with_timeouts(Duration::from_millis(100), Duration::from_secs(2));
        (scheduler, self.store, self.clock)
    }
}

fn pay(v: serde_json::Value) -> MockResponse {
    MockResponse::Payload(v)
}

/// 报价 + 公司资料的组合载荷，收盘价走高
fn nvda_quote() -> serde_json::Value {
    json!({
        "chart": {"chart": {"result": [{
            "meta": {"regularMarketPrice": 172.35, "regularMarketVolume": 12_340_000.0},
            "indicators": {"quote": [{"close": [160.0, 172.35], "volume": [10.0, 12_340_000.0]}]}
        }]}},
        "profile": {"shareOutstanding": 24_400.0, "marketCapitalization": 4_210_000.0}
    })
}

/// # Summary
/// 两个周期之间总分变化时产生一条告警，首个周期不告警。
#[tokio::test]
async fn test_score_change_alerts_on_second_cycle() {
    let mut h = Harness::new();
    let news = h.mock(SourceKind::News, SourceScope::PerSymbol, 0);
    let earnings = h.mock(SourceKind::Earnings, SourceScope::PerSymbol, 0);
    let ipo = h.mock(SourceKind::Ipo, SourceScope::Global, 0);
    news.respond(Some("AAA"), pay(json!(1)));
    earnings.respond(Some("AAA"), pay(json!(1)));
    ipo.respond(None, pay(json!({"AAA": 0})));
    let (mut scheduler, store, _) = h.scheduler(&["AAA"]);

    let first = scheduler.run_cycle().await;
    assert_eq!(first.cycle, 1);
    assert_eq!(first.rows[0].score.total, dec!(2));
    assert_eq!(first.rows[0].score.driver, Some(SourceKind::News));
    assert!(first.alerts.is_empty());

    earnings.respond(Some("AAA"), pay(json!(-1)));
    let second = scheduler.run_cycle().await;
    assert_eq!(second.rows[0].score.total, dec!(0));
    assert_eq!(
        second.alerts,
        vec![AlertEvent {
            symbol: Symbol::from("AAA"),
            previous: dec!(2),
            current: dec!(0),
            cycle: 2,
        }]
    );
    assert_eq!(store.latest().cycle, 2);
    assert_eq!(scheduler.cycle(), 3);
    assert_eq!(scheduler.phase(), CyclePhase::Idle);
}

/// # Summary
/// 单个来源超时不被当作零票，其余来源照常计分。
#[tokio::test]
async fn test_timed_out_source_is_omitted_not_zero() {
    let mut h = Harness::new();
    let news = h.mock(SourceKind::News, SourceScope::PerSymbol, 0);
    let earnings = h.mock(SourceKind::Earnings, SourceScope::PerSymbol, 0);
    news.respond(
        Some("BBB"),
        MockResponse::Delayed(Duration::from_millis(500), json!(-1)),
    );
    earnings.respond(Some("BBB"), pay(json!(1)));
    let (mut scheduler, _, _) = h.scheduler(&["BBB"]);

    let snapshot = scheduler.run_cycle().await;
    let row = snapshot.row("BBB").unwrap();
    assert_eq!(row.score.total, dec!(1));
    assert_eq!(row.score.driver, Some(SourceKind::Earnings));
    assert_eq!(row.score.status, ScoreStatus::Fresh);
}

/// # Summary
/// 宏观日历整体失败时所有标的只是缺少宏观贡献，周期正常发布。
#[tokio::test]
async fn test_macro_failure_does_not_abort_cycle() {
    let mut h = Harness::new();
    let macro_feed = h.mock(SourceKind::Macro, SourceScope::Global, 0);
    let news = h.mock(SourceKind::News, SourceScope::PerSymbol, 0);
    macro_feed.respond(None, MockResponse::Fail(FetchError::Status(503)));
    news.respond(Some("AAPL"), pay(json!(1)));
    news.respond(Some("MSFT"), pay(json!(-1)));
    let (mut scheduler, _, _) = h.scheduler(&["AAPL", "MSFT"]);

    let snapshot = scheduler.run_cycle().await;
    assert_eq!(snapshot.row("AAPL").unwrap().score.total, dec!(1));
    assert_eq!(snapshot.row("MSFT").unwrap().score.total, dec!(-1));
    assert!(snapshot.macro_events.is_empty());
    // 全局来源每周期只抓取一次
    assert_eq!(macro_feed.calls(), 1);
}

/// # Summary
/// 全局来源的载荷对每个标的分别求值。
#[tokio::test]
async fn test_global_payload_applies_to_every_symbol() {
    let mut h = Harness::new();
    let macro_feed = h.mock(SourceKind::Macro, SourceScope::Global, 0);
    macro_feed.respond(None, pay(json!(-1.5)));
    let (mut scheduler, _, _) = h.scheduler(&["AAPL", "MSFT", "NVDA"]);

    let snapshot = scheduler.run_cycle().await;
    for row in &snapshot.rows {
        assert_eq!(row.score.total, dec!(-1.5));
        assert_eq!(row.score.driver, Some(SourceKind::Macro));
    }
    let order: Vec<&str> = snapshot.rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["AAPL", "MSFT", "NVDA"]);
}

/// # Summary
/// 完全抓取失败的标的沿用上一周期总分且不告警；从未成功的标的显示为不可用。
#[tokio::test]
async fn test_total_outage_carries_forward_and_never_seen_is_unavailable() {
    let mut h = Harness::new();
    let news = h.mock(SourceKind::News, SourceScope::PerSymbol, 0);
    news.respond(Some("AAPL"), pay(json!(1)));
    let (mut scheduler, _, _) = h.scheduler(&["AAPL", "MSFT"]);

    let first = scheduler.run_cycle().await;
    let msft = first.row("MSFT").unwrap();
    assert_eq!(msft.score.status, ScoreStatus::Unavailable);
    assert_eq!(msft.sentiment, Sentiment::Unavailable);
    assert_eq!(msft.price, "-");

    news.respond(Some("AAPL"), MockResponse::Fail(FetchError::Network("reset".into())));
    let second = scheduler.run_cycle().await;
    let aapl = second.row("AAPL").unwrap();
    assert_eq!(aapl.score.status, ScoreStatus::CarriedForward);
    assert_eq!(aapl.score.total, dec!(1));
    assert_eq!(aapl.score.cycle, 2);
    assert!(second.alerts.is_empty());
}

/// # Summary
/// 周期超时后以已到达的结果发布，不等待慢上游。
#[tokio::test]
async fn test_cycle_timeout_publishes_partial_results() {
    let mut h = Harness::new();
    let news = h.mock(SourceKind::News, SourceScope::PerSymbol, 0);
    let earnings = h.mock(SourceKind::Earnings, SourceScope::PerSymbol, 0);
    news.respond(
        Some("AAA"),
        MockResponse::Delayed(Duration::from_secs(5), json!(1)),
    );
    earnings.respond(Some("AAA"), pay(json!(-1)));
    let (scheduler, _, _) = h.scheduler(&["AAA"]);
    let mut scheduler =
        scheduler.with_timeouts(Duration::from_secs(10), Duration::from_millis(200));

    let started = tokio::time::Instant::now();
    let snapshot = scheduler.run_cycle().await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(snapshot.rows[0].score.total, dec!(-1));
}

/// # Summary
/// TTL 内跨周期复用缓存，上游只被调用一次。
#[tokio::test]
async fn test_cache_is_reused_across_cycles() {
    let mut h = Harness::new();
    let earnings = h.mock(SourceKind::Earnings, SourceScope::PerSymbol, 3600);
    earnings.respond(Some("MSFT"), pay(json!(1)));
    let (mut scheduler, _, clock) = h.scheduler(&["MSFT"]);

    scheduler.run_cycle().await;
    clock.advance(ChronoDuration::minutes(1));
    let second = scheduler.run_cycle().await;

    assert_eq!(earnings.calls(), 1);
    assert_eq!(second.rows[0].score.total, dec!(1));
}

/// # Summary
/// 报价抓取失败时展示字段回退到最后一次成功的载荷，但不产生贡献。
#[tokio::test]
async fn test_stale_quote_fills_presentation_only() {
    let mut h = Harness::new();
    let quote = h.with_source(
        SourceKind::Quote,
        SourceScope::PerSymbol,
        60,
        Arc::new(QuoteSource::new(1.0)),
    );
    quote.respond(Some("NVDA"), pay(nvda_quote()));
    let (mut scheduler, _, clock) = h.scheduler(&["NVDA"]);

    let first = scheduler.run_cycle().await;
    let row = first.row("NVDA").unwrap();
    assert_eq!(row.score.total, dec!(1));
    assert_eq!(row.price, "172.35");
    assert_eq!(row.volume, "12.34M");
    assert_eq!(row.float, "24400.00M");
    assert_eq!(row.market_cap, "4.21T");

    quote.respond(Some("NVDA"), MockResponse::Fail(FetchError::Status(429)));
    clock.advance(ChronoDuration::minutes(5));
    let second = scheduler.run_cycle().await;
    let row = second.row("NVDA").unwrap();
    assert_eq!(row.score.status, ScoreStatus::CarriedForward);
    assert_eq!(row.price, "172.35");
    assert!(row.quote.is_some());
}

/// # Summary
/// 被周期截止时间中止的报价抓取同样回退到旧载荷填充展示字段。
#[tokio::test]
async fn test_cycle_deadline_still_uses_stale_quote() {
    let mut h = Harness::new();
    let quote = h.with_source(
        SourceKind::Quote,
        SourceScope::PerSymbol,
        60,
        Arc::new(QuoteSource::new(1.0)),
    );
    quote.respond(Some("NVDA"), pay(nvda_quote()));
    let (scheduler, _, clock) = h.scheduler(&["NVDA"]);
    let mut scheduler =
        scheduler.with_timeouts(Duration::from_secs(10), Duration::from_millis(200));

    let first = scheduler.run_cycle().await;
    assert_eq!(first.row("NVDA").unwrap().price, "172.35");

    quote.respond(
        Some("NVDA"),
        MockResponse::Delayed(Duration::from_secs(5), nvda_quote()),
    );
    clock.advance(ChronoDuration::minutes(5));
    let second = scheduler.run_cycle().await;
    let row = second.row("NVDA").unwrap();
    assert_eq!(row.score.status, ScoreStatus::CarriedForward);
    assert_eq!(row.price, "172.35");
    assert_eq!(row.market_cap, "4.21T");
    assert!(row.quote.is_some());
}

#[test]
fn test_binding_rejects_mismatched_kinds() {
    let feed = Arc::new(MockFeed::new(SourceKind::News, SourceScope::PerSymbol));
    let fetcher = Arc::new(CachedFetcher::new(
        Arc::new(MemCache::new()),
        Arc::new(FakeClockProvider::new(Utc::now())),
        Duration::from_secs(60),
    ));
    let result = SourceBinding::new(feed, Arc::new(MockSource::new(SourceKind::Geo)), fetcher);
    assert!(result.is_err());
}

use crate::binding::SourceBinding;
use crate::format;
use crate::snapshot::SnapshotStore;
use chrono::{DateTime, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::common::time::TimeProvider;
use kizashi_core::config::ScannerConfig;
use kizashi_core::score::entity::{CompositeScore, Sentiment, Snapshot, SnapshotRow};
use kizashi_core::signal::entity::{
    MacroEvent, QuoteSummary, RawPayload, SignalContribution, SourceDetail, SourceScope,
};
use kizashi_core::signal::error::FetchError;
use kizashi_score::{AlertTracker, ScoreAggregator};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, timeout, timeout_at};
use tracing::{debug, info, warn};

/// # Summary
/// 评估周期所处阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Aggregating,
    Published,
}

/// 单个抓取任务的结果
struct FetchOutcome {
    // 在 bindings 中的下标
    binding: usize,
    // 全局来源为 None
    symbol: Option<Symbol>,
    result: Result<RawPayload, FetchError>,
    // 失败时最后一次成功的载荷，只用于展示字段
    stale: Option<RawPayload>,
}

/// 一个周期的求值产物
#[derive(Default)]
struct Evaluation {
    contributions: Vec<SignalContribution>,
    quotes: HashMap<Symbol, QuoteSummary>,
    macro_events: Vec<MacroEvent>,
}

/// # Summary
/// 周期调度器，独占周期计数与变动检测状态。
///
/// # Invariants
/// - 周期编号从 1 开始，发布后递增。
/// - 任一 (标的, 来源) 的抓取失败或超时只影响它自己。
/// - 比对与提交只在全部抓取结算 (或周期超时) 之后进行，快照整体发布。
pub struct Scheduler {
    watchlist: Vec<Symbol>,
    bindings: Vec<Arc<SourceBinding>>,
    aggregator: ScoreAggregator,
    tracker: AlertTracker,
    store: Arc<SnapshotStore>,
    clock: Arc<dyn TimeProvider>,
    semaphore: Arc<Semaphore>,
    interval: Duration,
    cycle_timeout: Duration,
    fetch_timeout: Duration,
    cycle: u64,
    phase: CyclePhase,
}

impl Scheduler {
    /// # Summary
    /// 创建调度器。
    ///
    /// # Arguments
    /// * `config`: 观察列表、间隔、超时与并发宽度。
    /// * `bindings`: 已装配的来源，每个类别至多一个。
    /// * `store`: 快照发布目标。
    /// * `clock`: 评估时间与发布时间的来源。
    pub fn new(
        config: &ScannerConfig,
        bindings: Vec<SourceBinding>,
        store: Arc<SnapshotStore>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            watchlist: config.watchlist.iter().map(|s| Symbol::new(s.as_str())).collect(),
            bindings: bindings.into_iter().map(Arc::new).collect(),
            aggregator: ScoreAggregator::new(),
            tracker: AlertTracker::new(),
            store,
            clock,
            semaphore: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            interval: config.interval(),
            cycle_timeout: config.cycle_timeout(),
            fetch_timeout: config.fetch_timeout(),
            cycle: 1,
            phase: CyclePhase::Idle,
        }
    }

    /// 覆盖配置中以秒计的超时
    pub fn with_timeouts(mut self, fetch_timeout: Duration, cycle_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self.cycle_timeout = cycle_timeout;
        self
    }

    /// 下一个将要运行的周期编号
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// # Summary
    /// 按固定间隔无限循环运行周期。首个周期立即开始。
    ///
    /// # Logic
    /// 1. 周期耗时超过间隔时顺延下一次触发，不追赶。
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "scheduler started: {} symbols, {} sources, every {:?}",
            self.watchlist.len(),
            self.bindings.len(),
            self.interval
        );
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// # Summary
    /// 运行一个完整周期：Fetching -> Aggregating -> Published -> Idle。
    ///
    /// # Logic
    /// 1. 并发抓取全部 (标的, 来源) 组合，受周期超时约束。
    /// 2. 对到达的载荷求值，失败与超时的组合不产生贡献。
    /// 3. 逐标的聚合；先整体比对再提交。
    /// 4. 组装快照并原子发布，周期计数加一。
    ///
    /// # Returns
    /// 本周期发布的快照。
    pub async fn run_cycle(&mut self) -> Arc<Snapshot> {
        let cycle = self.cycle;
        let started = Instant::now();

        self.phase = CyclePhase::Fetching;
        let outcomes = self.fetch_all(started + self.cycle_timeout).await;

        self.phase = CyclePhase::Aggregating;
        let as_of = self.clock.now();
        let evaluation = self.evaluate(&outcomes, as_of);

        let scores: Vec<CompositeScore> = self
            .watchlist
            .iter()
            .map(|symbol| {
                let previous = self.tracker.previous(symbol);
                self.aggregator
                    .aggregate(symbol, &evaluation.contributions, previous, cycle)
            })
            .collect();
        let alerts = self.tracker.diff(cycle, &scores);
        self.tracker.commit(&scores);

        let rows: Vec<SnapshotRow> = scores
            .into_iter()
            .map(|score| {
                let quote = evaluation.quotes.get(&score.symbol).cloned();
                build_row(score, quote)
            })
            .collect();

        let snapshot = Arc::new(Snapshot {
            cycle,
            published_at: self.clock.now(),
            rows,
            alerts,
            macro_events: evaluation.macro_events,
        });
        self.store.publish(snapshot.clone());
        self.phase = CyclePhase::Published;

        info!(
            "cycle {} published: {} rows, {} alerts, {} contributions in {:?}",
            cycle,
            snapshot.rows.len(),
            snapshot.alerts.len(),
            evaluation.contributions.len(),
            started.elapsed()
        );
        self.cycle += 1;
        self.phase = CyclePhase::Idle;
        snapshot
    }

    /// # Summary
    /// 并发抓取全部组合。
    ///
    /// # Logic
    /// 1. 全局来源每周期只抓一次，逐标的来源对观察列表中每个标的各抓一次。
    /// 2. 每个任务先取得并发许可，再在抓取超时内执行；超时视为失败，不在本周期重试。
    /// 3. 失败的任务附带缓存中最后一次成功的载荷。
    /// 4. 到达周期截止时间后中止剩余任务；未结算的组合按超时失败处理，同样附带旧载荷。
    async fn fetch_all(&self, deadline: Instant) -> Vec<FetchOutcome> {
        let mut tasks = JoinSet::new();
        let mut pending: HashSet<(usize, Option<Symbol>)> = HashSet::new();

        for (index, binding) in self.bindings.iter().enumerate() {
            let targets: Vec<Option<Symbol>> = match binding.scope() {
                SourceScope::Global => vec![None],
                SourceScope::PerSymbol => self.watchlist.iter().cloned().map(Some).collect(),
            };

            for symbol in targets {
                pending.insert((index, symbol.clone()));
                let binding = binding.clone();
                let semaphore = self.semaphore.clone();
                let fetch_timeout = self.fetch_timeout;

                tasks.spawn(async move {
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => {
                            match timeout(fetch_timeout, binding.fetch(symbol.as_ref())).await {
                                Ok(result) => result,
                                Err(_) => Err(FetchError::Timeout(fetch_timeout)),
                            }
                        }
                        Err(_) => Err(FetchError::Unavailable("fetch pool closed".into())),
                    };
                    let stale = match &result {
                        Ok(_) => None,
                        Err(_) => binding.last_known(symbol.as_ref()).await,
                    };
                    FetchOutcome {
                        binding: index,
                        symbol,
                        result,
                        stale,
                    }
                });
            }
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut timed_out = false;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(outcome))) => {
                    pending.remove(&(outcome.binding, outcome.symbol.clone()));
                    outcomes.push(outcome);
                }
                Ok(Some(Err(e))) => warn!("fetch task aborted: {}", e),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "cycle {} timed out, abandoning {} pending fetches",
                        self.cycle,
                        tasks.len()
                    );
                    tasks.abort_all();
                    timed_out = true;
                    break;
                }
            }
        }

        // 未结算的组合同样视为失败，并带上旧载荷
        for (index, symbol) in pending {
            let Some(binding) = self.bindings.get(index) else {
                continue;
            };
            let result = if timed_out {
                Err(FetchError::Timeout(self.cycle_timeout))
            } else {
                Err(FetchError::Unavailable("fetch task aborted".into()))
            };
            let stale = binding.last_known(symbol.as_ref()).await;
            outcomes.push(FetchOutcome {
                binding: index,
                symbol,
                result,
                stale,
            });
        }
        outcomes
    }

    /// # Summary
    /// 对到达的载荷逐标的求值，并收集展示信息。
    ///
    /// # Logic
    /// 1. 成功的全局载荷对观察列表中每个标的分别求值。
    /// 2. `SourceError` 只记录日志，该组合本周期无贡献。
    /// 3. 失败的组合若有旧载荷，只用于提取展示信息，绝不产生贡献。
    fn evaluate(&self, outcomes: &[FetchOutcome], as_of: DateTime<Utc>) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for outcome in outcomes {
            let Some(binding) = self.bindings.get(outcome.binding) else {
                continue;
            };
            let label = outcome.symbol.as_ref().map_or("*", Symbol::as_str);

            let payload = match &outcome.result {
                Ok(payload) => {
                    let targets: Vec<&Symbol> = match &outcome.symbol {
                        Some(symbol) => vec![symbol],
                        None => self.watchlist.iter().collect(),
                    };
                    for symbol in targets {
                        match binding.source().evaluate(symbol, payload, as_of) {
                            Ok(c) => evaluation.contributions.push(c),
                            Err(e) => debug!(
                                "{} gave no contribution for {}: {}",
                                binding.kind(),
                                symbol,
                                e
                            ),
                        }
                    }
                    payload
                }
                Err(e) => {
                    warn!("{} fetch failed for {}: {}", binding.kind(), label, e);
                    match &outcome.stale {
                        Some(stale) => stale,
                        None => continue,
                    }
                }
            };

            match binding.source().detail(payload, as_of) {
                Some(SourceDetail::Quote(quote)) => {
                    if let Some(symbol) = &outcome.symbol {
                        evaluation.quotes.insert(symbol.clone(), quote);
                    }
                }
                Some(SourceDetail::MacroCalendar(events)) => evaluation.macro_events = events,
                None => {}
            }
        }
        evaluation
    }
}

/// 组装快照行，报价缺失时展示字段为 `-`
fn build_row(score: CompositeScore, quote: Option<QuoteSummary>) -> SnapshotRow {
    let field = |f: fn(&QuoteSummary) -> Option<f64>| quote.as_ref().and_then(f);
    SnapshotRow {
        symbol: score.symbol.clone(),
        sentiment: Sentiment::of(&score),
        price: format::price(field(|q| q.price)),
        volume: format::millions(field(|q| q.volume)),
        float: format::millions(field(|q| q.shares_outstanding)),
        market_cap: format::market_cap(field(|q| q.market_cap)),
        quote,
        score,
    }
}

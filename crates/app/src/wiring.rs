use std::error::Error;
use std::sync::Arc;

use kizashi_cache::fetcher::CachedFetcher;
use kizashi_core::cache::port::Cache;
use kizashi_core::common::time::TimeProvider;
use kizashi_core::config::{AppConfig, NotifyConfig};
use kizashi_core::notify::port::Notifier;
use kizashi_core::signal::entity::SourceKind;
use kizashi_core::signal::port::SignalFeed;
use kizashi_feed::finnhub::{FinnhubClient, FinnhubEarningsFeed, FinnhubIpoFeed, FinnhubNewsFeed};
use kizashi_feed::static_feed::StaticFeed;
use kizashi_feed::trading_economics::TradingEconomicsFeed;
use kizashi_feed::yahoo::YahooQuoteFeed;
use kizashi_notify::email::EmailNotifier;
use kizashi_notify::telegram::TelegramNotifier;
use kizashi_scanner::SourceBinding;
use tracing::{info, warn};

/// # Summary
/// 依据凭证装配全部来源绑定。
///
/// # Logic
/// 1. 有 Finnhub key 时装配 News、Earnings、IPO。
/// 2. 有 TradingEconomics 账号时装配 Macro。
/// 3. Quote 始终装配；有 Finnhub key 时用其补充股本与市值。
/// 4. 人工偏向按类别各装配一个静态源，没有条目的类别跳过。
///
/// # Arguments
/// * `cache`: 所有来源共用的缓存存储，TTL 按类别区分。
pub fn build_bindings(
    config: &AppConfig,
    cache: Arc<dyn Cache>,
    clock: Arc<dyn TimeProvider>,
) -> Result<Vec<SourceBinding>, Box<dyn Error>> {
    let creds = &config.credentials;
    let sources = &config.sources;
    let mut feeds: Vec<Arc<dyn SignalFeed>> = Vec::new();

    let finnhub = creds.finnhub_key.as_deref().filter(|k| !k.is_empty());
    match finnhub {
        Some(key) => {
            feeds.push(Arc::new(FinnhubNewsFeed::new(FinnhubClient::new(key)?)));
            feeds.push(Arc::new(FinnhubEarningsFeed::new(
                FinnhubClient::new(key)?,
                clock.clone(),
                sources.earnings_lookback_days,
            )));
            feeds.push(Arc::new(FinnhubIpoFeed::new(
                FinnhubClient::new(key)?,
                clock.clone(),
                sources.ipo_window_days,
            )));
        }
        None => warn!("credentials.finnhub_key not set: news, earnings and ipo sources disabled"),
    }

    match (&creds.trading_economics_user, &creds.trading_economics_pass) {
        (Some(user), Some(pass)) => feeds.push(Arc::new(TradingEconomicsFeed::new(
            user.as_str(),
            pass.as_str(),
            sources.macro_countries.clone(),
            clock.clone(),
            sources.macro_window_days,
        )?)),
        _ => warn!("TradingEconomics credentials not set: macro source disabled"),
    }

    let profile = finnhub.map(FinnhubClient::new).transpose()?;
    feeds.push(Arc::new(YahooQuoteFeed::new(
        profile,
        clock.clone(),
        config.scanner.quote_interval,
        config.scanner.quote_lookback_bars,
    )?));

    for kind in [SourceKind::Options, SourceKind::Cot, SourceKind::Geo] {
        let feed = StaticFeed::new(kind, &sources.manual);
        if !feed.is_empty() {
            feeds.push(Arc::new(feed));
        }
    }

    let mut bindings = Vec::with_capacity(feeds.len());
    for feed in feeds {
        let kind = feed.kind();
        let fetcher = Arc::new(CachedFetcher::new(
            cache.clone(),
            clock.clone(),
            config.cache.ttl_for(kind),
        ));
        let source = kizashi_signal::build_source(kind, sources);
        bindings.push(SourceBinding::new(feed, source, fetcher)?);
        info!("source {} wired", kind);
    }
    Ok(bindings)
}

/// # Summary
/// 按配置创建通知渠道。配置存在但无效时返回错误，不静默跳过。
pub fn build_notifiers(config: &NotifyConfig) -> Result<Vec<Arc<dyn Notifier>>, Box<dyn Error>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();
    if let Some(tg) = &config.telegram {
        notifiers.push(Arc::new(TelegramNotifier::new(tg)?));
    }
    if let Some(email) = &config.email {
        notifiers.push(Arc::new(EmailNotifier::new(email)?));
    }
    Ok(notifiers)
}

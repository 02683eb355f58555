use kizashi_core::common::time::RealTimeProvider;
use kizashi_core::common::tls::install_crypto_provider;
use kizashi_core::common::{Symbol, TimeFrame};
use kizashi_core::signal::port::SignalFeed;
use kizashi_feed::finnhub::{FinnhubClient, FinnhubNewsFeed};
use kizashi_feed::yahoo::YahooQuoteFeed;
use std::sync::Arc;

/// # Summary
/// 雅虎财经报价抓取的联网测试。
///
/// # Logic
/// 1. 不配置公司概况，抓取 AAPL 最近 5 根日线。
/// 2. 断言载荷包含图表结果且 profile 为 null。
#[tokio::test]
#[ignore = "requires network access"]
async fn test_yahoo_real_fetch() {
    install_crypto_provider();
    let feed = YahooQuoteFeed::new(None, Arc::new(RealTimeProvider), TimeFrame::Day1, 5).unwrap();

    let payload = feed.fetch(Some(&Symbol::from("AAPL"))).await;
    assert!(payload.is_ok(), "Failed to fetch from Yahoo: {:?}", payload.err());
    let payload = payload.unwrap();
    assert!(payload["chart"]["chart"]["result"].is_array());
    assert!(payload["profile"].is_null());
}

/// # Summary
/// Finnhub 新闻情绪的联网测试，需要环境变量 `FINNHUB_KEY`。
#[tokio::test]
#[ignore = "requires network access and FINNHUB_KEY"]
async fn test_finnhub_news_sentiment() {
    install_crypto_provider();
    let Ok(key) = std::env::var("FINNHUB_KEY") else {
        println!("FINNHUB_KEY not set, skipping");
        return;
    };
    let feed = FinnhubNewsFeed::new(FinnhubClient::new(key).unwrap());
    let payload = feed.fetch(Some(&Symbol::from("MSFT"))).await.unwrap();
    println!("news-sentiment: {}", payload);
    assert!(payload.is_object());
}

use crate::common::TimeFrame;
use crate::signal::entity::SourceKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// # Summary
/// 配置校验错误。
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Config load error: {0}")]
    Load(String),
}

// 日期窗口的合法范围 (天)
const MAX_WINDOW_DAYS: i64 = 3650;

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub cache: CacheConfig,
    pub sources: SourcesConfig,
    pub credentials: CredentialsConfig,
    pub notify: NotifyConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

/// 调度周期与观察列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    // 周期间隔 (秒)
    pub interval_secs: u64,
    // 单周期抓取阶段的总时限 (秒)
    pub cycle_timeout_secs: u64,
    // 单次抓取时限 (秒)
    pub fetch_timeout_secs: u64,
    // 并发抓取任务上限
    pub max_concurrency: usize,
    pub watchlist: Vec<String>,
    pub quote_interval: TimeFrame,
    // 报价动量回看的 K 线根数
    pub quote_lookback_bars: u32,
}

impl ScannerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            cycle_timeout_secs: 45,
            fetch_timeout_secs: 10,
            max_concurrency: 8,
            watchlist: [
                "NVDA", "MSFT", "AAPL", "AMZN", "GOOGL", "GOOG", "META", "TSLA", "AVGO", "COST",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            quote_interval: TimeFrame::Day1,
            quote_lookback_bars: 5,
        }
    }
}

/// 各来源缓存存活时长 (秒)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub macro_ttl_secs: u64,
    pub news_ttl_secs: u64,
    pub earnings_ttl_secs: u64,
    pub ipo_ttl_secs: u64,
    pub quote_ttl_secs: u64,
}

impl CacheConfig {
    /// # Summary
    /// 按来源类别取 TTL。人工配置的来源不经网络，TTL 为零。
    pub fn ttl_for(&self, kind: SourceKind) -> Duration {
        let secs = match kind {
            SourceKind::Macro => self.macro_ttl_secs,
            SourceKind::News => self.news_ttl_secs,
            SourceKind::Earnings => self.earnings_ttl_secs,
            SourceKind::Ipo => self.ipo_ttl_secs,
            SourceKind::Quote => self.quote_ttl_secs,
            SourceKind::Options | SourceKind::Cot | SourceKind::Geo => 0,
        };
        Duration::from_secs(secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            macro_ttl_secs: 3600,
            news_ttl_secs: 900,
            earnings_ttl_secs: 3600,
            ipo_ttl_secs: 3600,
            quote_ttl_secs: 900,
        }
    }
}

/// 信号源参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    // 新闻极性阈值
    pub news_threshold: f64,
    // 宏观事件前瞻窗口 (天)
    pub macro_window_days: i64,
    pub macro_countries: Vec<String>,
    // IPO 回溯窗口 (天)
    pub ipo_window_days: i64,
    // 财报日历回溯窗口 (天)
    pub earnings_lookback_days: i64,
    // 报价动量阈值 (百分比)
    pub quote_threshold_pct: f64,
    pub manual: Vec<ManualBias>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            news_threshold: 0.2,
            macro_window_days: 7,
            macro_countries: [
                "united states",
                "germany",
                "euro area",
                "japan",
                "china",
                "united kingdom",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ipo_window_days: 30,
            earnings_lookback_days: 120,
            quote_threshold_pct: 1.0,
            manual: Vec::new(),
        }
    }
}

/// # Summary
/// 人工配置的偏向 (COT、期权、地缘)。
///
/// # Invariants
/// - `kind` 只能是 Options、Cot 或 Geo。
/// - `symbols` 为空表示作用于全部标的；同一类别按声明顺序取首个匹配项。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualBias {
    pub kind: SourceKind,
    pub value: Decimal,
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
}

/// 上游凭证，缺失时对应来源不装配
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub finnhub_key: Option<String>,
    pub trading_economics_user: Option<String>,
    pub trading_economics_pass: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub telegram: Option<TelegramConfig>,
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 默认过滤级别，RUST_LOG 优先
    pub level: String,
    // 滚动日志目录，为空则只输出到终端
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// # Summary
    /// 校验配置的一致性。
    ///
    /// # Logic
    /// 1. 周期间隔、并发上限不得为零，观察列表不得为空。
    /// 2. 周期时限不得超过周期间隔，否则周期会相互重叠。
    /// 3. 宏观、IPO、财报的日期窗口必须在 1..=3650 天内。
    /// 4. 人工偏向只允许 Options、Cot、Geo 三类。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scanner;
        if s.interval_secs == 0 {
            return Err(ConfigError::Invalid("scanner.interval_secs must be > 0".into()));
        }
        if s.max_concurrency == 0 {
            return Err(ConfigError::Invalid("scanner.max_concurrency must be > 0".into()));
        }
        if s.watchlist.is_empty() {
            return Err(ConfigError::Invalid("scanner.watchlist must not be empty".into()));
        }
        if s.cycle_timeout_secs > s.interval_secs {
            return Err(ConfigError::Invalid(format!(
                "scanner.cycle_timeout_secs ({}) exceeds interval_secs ({})",
                s.cycle_timeout_secs, s.interval_secs
            )));
        }
        let src = &self.sources;
        for (name, days) in [
            ("sources.macro_window_days", src.macro_window_days),
            ("sources.ipo_window_days", src.ipo_window_days),
            ("sources.earnings_lookback_days", src.earnings_lookback_days),
        ] {
            if !(1..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 1..={} (got {})",
                    name, MAX_WINDOW_DAYS, days
                )));
            }
        }
        if let Some(bias) = self.sources.manual.iter().find(|b| {
            !matches!(b.kind, SourceKind::Options | SourceKind::Cot | SourceKind::Geo)
        }) {
            return Err(ConfigError::Invalid(format!(
                "sources.manual does not accept kind '{}'",
                bias.kind
            )));
        }
        Ok(())
    }
}

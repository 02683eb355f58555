//! # `kizashi-score` - 评分合成与变动检测
//!
//! `ScoreAggregator` 把一个周期内的贡献值合成为综合评分；
//! `AlertTracker` 持有上一周期已提交的总分，先比对后提交。

pub mod aggregator;
pub mod alert;

pub use aggregator::ScoreAggregator;
pub use alert::AlertTracker;

//! # `kizashi-scanner` - 周期调度与快照发布
//!
//! 调度器按固定间隔驱动评估周期：并发抓取 -> 求值聚合 -> 变动检测 -> 原子发布快照。

pub mod binding;
pub mod error;
pub mod format;
pub mod scheduler;
pub mod snapshot;

pub use binding::SourceBinding;
pub use scheduler::{CyclePhase, Scheduler};
pub use snapshot::SnapshotStore;

//! # Ingestion Pipeline
//!
//! 定位语句摄取模块。
//!
//! 负责:
//! - 把传输字节块切分为完整语句行 (跨块边界)
//! - 接收判定与语句解码 (RMC/GGA/FIX 封闭集合)
//! - 聚合当前定位 (last-known-good 策略)
//! - 背压管理与丢弃策略
//!
//! ## 使用示例
//!
//! ```ignore
//! use ingestion::{BackpressureConfig, IngestionPipeline};
//!
//! let transport = transport::build_transport(&blueprint.transport)?;
//! let mut pipeline = IngestionPipeline::new(transport, BackpressureConfig::default());
//!
//! pipeline.start()?;
//! let mut fix_rx = pipeline.take_fix_receiver().unwrap();
//! while fix_rx.changed().await.is_ok() {
//!     if let Some(fix) = *fix_rx.borrow() {
//!         // 使用最新定位
//!     }
//! }
//! ```

mod aggregator;
mod config;
mod decode;
mod error;
mod framer;
mod pipeline;

// Re-exports
pub use aggregator::FixAggregator;
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::{GeoFix, Sentence};
pub use decode::{accept_line, decode_sentence};
pub use error::{IngestionError, Result};
pub use framer::LineFramer;
pub use pipeline::IngestionPipeline;

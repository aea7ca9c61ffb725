//! # Overlay Dispatcher
//!
//! 方向叠加层输出模块。
//!
//! 负责:
//! - 消费 `OverlayUpdate` (线段或清除)
//! - Fan-out 到多个叠加层后端
//! - 隔离慢后端,不阻塞投影驱动

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod overlays;

pub use contracts::{DirectionOverlay, OverlayLine, OverlayUpdate};
pub use dispatcher::{create_dispatcher, DispatcherBuilder, DispatcherConfig, OverlayDispatcher};
pub use error::OverlayError;
pub use handle::OverlayHandle;
pub use metrics::{OverlayMetrics, OverlaySnapshot};
pub use overlays::{FileOverlay, LogOverlay};

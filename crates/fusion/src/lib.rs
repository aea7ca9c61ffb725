//! # Fusion Engine
//!
//! 传感器融合模块:原始加速度计/磁力计/旋转向量样本到航向估计。
//!
//! 负责:
//! - 旋转向量四元数直转旋转矩阵提取航向
//! - 重力/地磁标准推导 (H = E × A),退化输入整刻跳过
//! - 角度归一化 [0, 360) 与可选圆周 EWMA 平滑
//! - 惯性源回调到融合任务的有界衔接
//!
//! ## 使用示例
//!
//! ```ignore
//! use fusion::FusionPipeline;
//!
//! let source = transport::build_inertial_source(&blueprint.inertial)?.unwrap();
//! let mut pipeline = FusionPipeline::new(source, blueprint.fusion.strategy, None);
//!
//! pipeline.start()?;
//! let mut heading_rx = pipeline.take_heading_receiver().unwrap();
//! while heading_rx.changed().await.is_ok() {
//!     if let Some(estimate) = *heading_rx.borrow() {
//!         // 使用最新航向
//!     }
//! }
//! ```

mod error;
mod fuser;
pub mod matrix;
mod pipeline;

// Re-exports
pub use contracts::{FusionStrategy, HeadingEstimate, RawSample, SampleKind};
pub use error::{FusionError, Result};
pub use fuser::OrientationFuser;
pub use pipeline::{FusionPipeline, FusionStats};

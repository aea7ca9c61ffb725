//! # Viewport Projector
//!
//! 视口投影模块:定位 + 航向到视口边界出口点。
//!
//! 负责:
//! - 方位角到屏幕方向向量 (固定约定,显式测试)
//! - 射线对视口四边求交,取最近出口
//! - 平面局部切面地理/屏幕变换
//! - 订阅两个单槽通道的重算驱动任务

mod driver;
pub mod raycast;
mod transform;

// Re-exports
pub use contracts::{OverlayLine, OverlayUpdate, ScreenPoint, ScreenTransform, Viewport};
pub use driver::{ProjectionDriver, ProjectionStats};
pub use raycast::{bearing_to_screen_vector, cast_ray, Edge, ExitPoint};
pub use transform::{PlanarTransform, METERS_PER_DEGREE};

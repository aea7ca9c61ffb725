//! HeadingEstimate - OrientationFuser 输出

use serde::{Deserialize, Serialize};

/// 航向融合策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    /// 设备融合旋转向量直接转旋转矩阵
    #[default]
    RotationVector,

    /// 加速度计 + 磁力计标准重力/地磁推导
    AccelMag,
}

impl FusionStrategy {
    /// 指标/日志标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RotationVector => "rotation_vector",
            Self::AccelMag => "accel_mag",
        }
    }
}

/// 当前航向估计
///
/// 角度恒定规范化到 [0, 360),0 = 地理北,顺时针增大。
/// "尚无航向" 用 `Option<HeadingEstimate>` 的 `None` 表达;首次融合
/// 成功之前投影器不得运行。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingEstimate {
    /// 航向角 (度, [0, 360))
    pub degrees: f64,

    /// 产生本估计的策略
    pub strategy: FusionStrategy,

    /// 融合时间戳 (Unix epoch 秒)
    pub timestamp: f64,
}

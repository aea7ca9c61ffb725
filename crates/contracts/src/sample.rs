//! RawSample - 惯性/磁传感器原始读数
//!
//! 设备传感器回调推送的原始样本,融合后即丢弃。

use serde::{Deserialize, Serialize};

/// 传感器样本类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    /// 加速度计 (m/s², 含重力)
    Accelerometer,

    /// 磁力计 (µT)
    Magnetometer,

    /// 融合旋转向量 (单位四元数的向量部分)
    RotationVector,
}

impl SampleKind {
    /// 指标/日志标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerometer => "accelerometer",
            Self::Magnetometer => "magnetometer",
            Self::RotationVector => "rotation_vector",
        }
    }
}

/// 3D 向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// 原始传感器样本
///
/// 旋转向量样本的标量分量不在线上传输,由融合端按单位范数约束补算。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawSample {
    /// 样本类型
    pub kind: SampleKind,

    /// 三轴读数
    pub vector: Vector3,

    /// 采样时间戳 (Unix epoch 秒)
    pub timestamp: f64,
}

impl RawSample {
    pub fn new(kind: SampleKind, x: f64, y: f64, z: f64, timestamp: f64) -> Self {
        Self {
            kind,
            vector: Vector3::new(x, y, z),
            timestamp,
        }
    }
}

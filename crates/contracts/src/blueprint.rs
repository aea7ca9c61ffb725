//! MissionBlueprint - Config Loader 输出
//!
//! 描述完整的管线配置:传输、融合、视口变换、叠加层路由。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::FusionStrategy;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的管线配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 传输配置
    pub transport: TransportConfig,

    /// 惯性源配置
    #[serde(default)]
    pub inertial: InertialConfig,

    /// 航向融合配置
    #[serde(default)]
    pub fusion: FusionConfig,

    /// 视口与平面变换配置
    pub viewport: ViewportConfig,

    /// 叠加层路由配置
    #[serde(default)]
    pub overlays: Vec<OverlayConfig>,
}

/// 传输模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// 真实串口 (需要 real-serial 特性)
    Serial,

    /// 录制文件回放
    Replay,

    /// 合成语句生成器
    Mock,
}

/// 传输配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// 传输模式
    pub mode: TransportMode,

    /// 定位语句所在的逻辑通道
    #[serde(default = "default_channel")]
    pub channel: u8,

    /// 串口设备路径 (serial 模式)
    #[serde(default)]
    pub device: Option<String>,

    /// 波特率 (serial 模式)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// 回放文件路径 (replay 模式)
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// 回放速度倍率 (replay 模式)
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,

    /// 文件播完后从头循环 (replay 模式)
    #[serde(default = "default_loop_playback")]
    pub loop_playback: bool,

    /// 合成语句速率 (Hz, mock 模式)
    #[serde(default = "default_mock_rate_hz")]
    pub mock_rate_hz: f64,
}

fn default_channel() -> u8 {
    2
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_speed_multiplier() -> f64 {
    1.0
}

fn default_loop_playback() -> bool {
    true
}

fn default_mock_rate_hz() -> f64 {
    1.0
}

/// 惯性源模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InertialMode {
    /// 合成样本生成器
    #[default]
    Mock,

    /// 不启动惯性源 (航向保持无效,叠加层不绘制)
    None,
}

/// 惯性源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InertialConfig {
    /// 惯性源模式
    #[serde(default)]
    pub mode: InertialMode,

    /// 采样率 (Hz)
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// 合成源起始航向 (度)
    #[serde(default)]
    pub start_heading_deg: f64,

    /// 合成源航向漂移速率 (度/秒, 0 = 固定航向)
    #[serde(default)]
    pub sweep_dps: f64,
}

fn default_sample_rate_hz() -> f64 {
    10.0
}

impl Default for InertialConfig {
    fn default() -> Self {
        Self {
            mode: InertialMode::default(),
            sample_rate_hz: default_sample_rate_hz(),
            start_heading_deg: 0.0,
            sweep_dps: 0.0,
        }
    }
}

/// 航向融合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// 融合策略
    #[serde(default)]
    pub strategy: FusionStrategy,

    /// 圆周 EWMA 平滑系数, (0, 1]; 0 = 关闭平滑
    #[serde(default)]
    pub smoothing_alpha: f64,

    /// 定位新鲜度上限 (秒); 0 = 不限, 永远沿用最近定位
    #[serde(default)]
    pub max_fix_age_s: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            strategy: FusionStrategy::default(),
            smoothing_alpha: 0.0,
            max_fix_age_s: 0.0,
        }
    }
}

impl FusionConfig {
    /// 新鲜度策略: None = 不限
    pub fn max_fix_age(&self) -> Option<f64> {
        if self.max_fix_age_s > 0.0 {
            Some(self.max_fix_age_s)
        } else {
            None
        }
    }

    /// 平滑系数: None = 关闭
    pub fn smoothing(&self) -> Option<f64> {
        if self.smoothing_alpha > 0.0 {
            Some(self.smoothing_alpha)
        } else {
            None
        }
    }
}

/// 视口与平面变换配置
///
/// 真实部署中变换由外部地图组件注入;此处的中心点/比例尺用于
/// 演示与测试时构造平面局部变换。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// 视口宽度 (像素)
    pub width: f64,

    /// 视口高度 (像素)
    pub height: f64,

    /// 视口中心纬度 (度)
    pub center_latitude: f64,

    /// 视口中心经度 (度)
    pub center_longitude: f64,

    /// 比例尺 (像素/米)
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f64,
}

fn default_pixels_per_meter() -> f64 {
    1.0
}

/// 叠加层类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// 结构化日志输出
    Log,

    /// 单状态 JSON 文件
    File,
}

/// 叠加层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// 唯一名称
    pub name: String,

    /// 叠加层类型
    pub kind: OverlayKind,

    /// 更新队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 状态文件路径 (file 类型必填)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_queue_capacity() -> usize {
    8
}

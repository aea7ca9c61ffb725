//! GeoFix - FixAggregator 输出
//!
//! 最近一次有效定位的共享表示。

use serde::{Deserialize, Serialize};

/// 地理坐标点 (WGS-84 度)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// 纬度 (度, 北为正)
    pub latitude: f64,

    /// 经度 (度, 东为正)
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// 当前定位
///
/// 由 FixAggregator 在每条有效语句上覆盖写入；"尚无定位" 用
/// `Option<GeoFix>` 的 `None` 表达，而不是哨兵值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    /// 纬度 (度)
    pub latitude: f64,

    /// 经度 (度)
    pub longitude: f64,

    /// 对地速度 (m/s, RMC 才有)
    pub speed_mps: Option<f64>,

    /// 对地航向 (度, RMC 才有)
    pub course_deg: Option<f64>,

    /// 语句内的 UTC 时间 (当日秒数)
    pub utc_seconds: Option<f64>,

    /// 接收时间戳 (Unix epoch 秒) - 供新鲜度策略使用
    pub received_at: f64,
}

impl GeoFix {
    /// 取出坐标点
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// 自接收以来经过的秒数
    pub fn age_at(&self, now: f64) -> f64 {
        (now - self.received_at).max(0.0)
    }
}

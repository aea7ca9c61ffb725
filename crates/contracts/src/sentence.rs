//! Sentence - SentenceStream 输出
//!
//! 解码后的定位语句。语句种类是封闭集合,用标签枚举而不是 trait 对象。

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// 解码后的定位语句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// 发送方标识 (如 "GP", "GN")
    pub talker: String,

    /// 语句负载
    pub body: SentenceBody,
}

/// 语句负载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SentenceBody {
    /// 推荐最小定位信息 (RMC)
    Rmc(RmcBody),

    /// 定位数据 (GGA)
    Gga(GgaBody),

    /// 简化测试语句 (FIX): 显式 valid/invalid 标记 + 十进制度坐标
    Fix(FixBody),
}

/// RMC 字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmcBody {
    /// UTC 时间 (当日秒数)
    pub utc_seconds: Option<f64>,

    /// 状态位为 'A' 时为真
    pub valid: bool,

    /// 纬度 (十进制度)
    pub latitude: Option<f64>,

    /// 经度 (十进制度)
    pub longitude: Option<f64>,

    /// 对地速度 (m/s, 已从节换算)
    pub speed_mps: Option<f64>,

    /// 对地航向 (度)
    pub course_deg: Option<f64>,
}

/// GGA 字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GgaBody {
    /// UTC 时间 (当日秒数)
    pub utc_seconds: Option<f64>,

    /// 纬度 (十进制度)
    pub latitude: Option<f64>,

    /// 经度 (十进制度)
    pub longitude: Option<f64>,

    /// 定位质量 (0 = 无效)
    pub quality: u8,

    /// 可见卫星数
    pub satellites: Option<u32>,

    /// 海拔 (米)
    pub altitude_m: Option<f64>,
}

/// FIX 字段 (测试/仿真用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixBody {
    /// 显式有效标记
    pub valid: bool,

    /// 纬度 (十进制度)
    pub latitude: f64,

    /// 经度 (十进制度)
    pub longitude: f64,
}

impl Sentence {
    /// 语句种类标签 (指标/日志用)
    pub fn kind(&self) -> &'static str {
        match self.body {
            SentenceBody::Rmc(_) => "rmc",
            SentenceBody::Gga(_) => "gga",
            SentenceBody::Fix(_) => "fix",
        }
    }

    /// 语句是否携带一个有效定位
    pub fn is_valid_fix(&self) -> bool {
        match &self.body {
            SentenceBody::Rmc(rmc) => {
                rmc.valid && rmc.latitude.is_some() && rmc.longitude.is_some()
            }
            SentenceBody::Gga(gga) => {
                gga.quality > 0 && gga.latitude.is_some() && gga.longitude.is_some()
            }
            SentenceBody::Fix(fix) => fix.valid,
        }
    }

    /// 取出坐标 (无论有效与否,字段缺失时为 None)
    pub fn position(&self) -> Option<GeoPoint> {
        match &self.body {
            SentenceBody::Rmc(rmc) => match (rmc.latitude, rmc.longitude) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                _ => None,
            },
            SentenceBody::Gga(gga) => match (gga.latitude, gga.longitude) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                _ => None,
            },
            SentenceBody::Fix(fix) => Some(GeoPoint::new(fix.latitude, fix.longitude)),
        }
    }

    /// 对地速度 (仅 RMC 提供)
    pub fn speed_mps(&self) -> Option<f64> {
        match &self.body {
            SentenceBody::Rmc(rmc) => rmc.speed_mps,
            _ => None,
        }
    }

    /// 对地航向 (仅 RMC 提供)
    pub fn course_deg(&self) -> Option<f64> {
        match &self.body {
            SentenceBody::Rmc(rmc) => rmc.course_deg,
            _ => None,
        }
    }

    /// 语句内的 UTC 时间
    pub fn utc_seconds(&self) -> Option<f64> {
        match &self.body {
            SentenceBody::Rmc(rmc) => rmc.utc_seconds,
            SentenceBody::Gga(gga) => gga.utc_seconds,
            SentenceBody::Fix(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rmc(valid: bool, lat: Option<f64>, lon: Option<f64>) -> Sentence {
        Sentence {
            talker: "GP".into(),
            body: SentenceBody::Rmc(RmcBody {
                utc_seconds: Some(43200.0),
                valid,
                latitude: lat,
                longitude: lon,
                speed_mps: Some(1.2),
                course_deg: Some(270.0),
            }),
        }
    }

    #[test]
    fn test_rmc_validity_requires_status_and_position() {
        assert!(rmc(true, Some(40.0), Some(-73.0)).is_valid_fix());
        assert!(!rmc(false, Some(40.0), Some(-73.0)).is_valid_fix());
        assert!(!rmc(true, None, Some(-73.0)).is_valid_fix());
    }

    #[test]
    fn test_gga_validity_requires_quality() {
        let gga = Sentence {
            talker: "GN".into(),
            body: SentenceBody::Gga(GgaBody {
                utc_seconds: None,
                latitude: Some(37.5),
                longitude: Some(126.9),
                quality: 0,
                satellites: Some(4),
                altitude_m: None,
            }),
        };
        assert!(!gga.is_valid_fix());
        assert_eq!(gga.position(), Some(GeoPoint::new(37.5, 126.9)));
    }

    #[test]
    fn test_fix_shorthand_carries_position_even_when_invalid() {
        let fix = Sentence {
            talker: "GP".into(),
            body: SentenceBody::Fix(FixBody {
                valid: false,
                latitude: 41.0,
                longitude: -74.0,
            }),
        };
        assert!(!fix.is_valid_fix());
        assert_eq!(fix.position(), Some(GeoPoint::new(41.0, -74.0)));
        assert_eq!(fix.kind(), "fix");
    }
}

//! 语句接收判定与解码
//!
//! 封闭语句集合:RMC (推荐最小定位)、GGA (定位数据)、FIX (测试简写)。
//! 任何不满足判定的行都静默丢弃,单条坏行绝不中断流。

use contracts::{FixBody, GgaBody, RmcBody, Sentence, SentenceBody};
use tracing::trace;

/// 节到米每秒
const KNOTS_TO_MPS: f64 = 0.514_444;

/// 接收判定:以 `$` 加非空标识开头,且首个逗号后有非空负载
///
/// 通过判定只说明行值得解码,不保证字段齐全。
pub fn accept_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('$') else {
        return false;
    };
    match rest.split_once(',') {
        Some((id, payload)) => !id.is_empty() && !payload.trim().is_empty(),
        None => false,
    }
}

/// 解码一行为 Sentence;未知语句类型或字段形状不符返回 None
pub fn decode_sentence(line: &str) -> Option<Sentence> {
    if !accept_line(line) {
        return None;
    }

    let fields: Vec<&str> = line[1..].split(',').collect();
    let id = fields[0];

    // 标识 = 2 字符发送方 + 语句类型 (GPRMC / GNGGA / GPFIX ...)
    if id.len() < 5 {
        return None;
    }
    let (talker, kind) = id.split_at(2);

    let body = match kind {
        "RMC" => decode_rmc(&fields)?,
        "GGA" => decode_gga(&fields)?,
        "FIX" => decode_fix(&fields)?,
        _ => {
            trace!(kind, "unknown sentence type");
            return None;
        }
    };

    Some(Sentence {
        talker: talker.to_string(),
        body,
    })
}

/// $xxRMC,utc,status,lat,NS,lon,EW,speed_knots,course,date,...
fn decode_rmc(fields: &[&str]) -> Option<SentenceBody> {
    if fields.len() < 9 {
        return None;
    }

    let valid = fields[2] == "A";
    let latitude = parse_coordinate(fields[3], fields[4]);
    let longitude = parse_coordinate(fields[5], fields[6]);

    Some(SentenceBody::Rmc(RmcBody {
        utc_seconds: parse_utc(fields[1]),
        valid,
        latitude,
        longitude,
        speed_mps: fields[7].parse::<f64>().ok().map(|k| k * KNOTS_TO_MPS),
        course_deg: fields[8].parse::<f64>().ok(),
    }))
}

/// $xxGGA,utc,lat,NS,lon,EW,quality,satellites,hdop,altitude,M,...
fn decode_gga(fields: &[&str]) -> Option<SentenceBody> {
    if fields.len() < 10 {
        return None;
    }

    Some(SentenceBody::Gga(GgaBody {
        utc_seconds: parse_utc(fields[1]),
        latitude: parse_coordinate(fields[2], fields[3]),
        longitude: parse_coordinate(fields[4], fields[5]),
        quality: fields[6].parse::<u8>().unwrap_or(0),
        satellites: fields[7].parse::<u32>().ok(),
        altitude_m: fields[9].parse::<f64>().ok(),
    }))
}

/// $xxFIX,valid|invalid,lat,lon - 坐标为带符号十进制度
fn decode_fix(fields: &[&str]) -> Option<SentenceBody> {
    if fields.len() < 4 {
        return None;
    }

    let valid = match fields[1] {
        "valid" => true,
        "invalid" => false,
        _ => return None,
    };

    Some(SentenceBody::Fix(FixBody {
        valid,
        latitude: fields[2].parse::<f64>().ok()?,
        longitude: fields[3].parse::<f64>().ok()?,
    }))
}

/// hhmmss.ss -> 当日秒数
fn parse_utc(field: &str) -> Option<f64> {
    if field.len() < 6 {
        return None;
    }
    let hours: f64 = field.get(0..2)?.parse().ok()?;
    let minutes: f64 = field.get(2..4)?.parse().ok()?;
    let seconds: f64 = field.get(4..)?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// NMEA 度分格式 (ddmm.mmmm / dddmm.mmmm) 加半球字母 -> 十进制度
fn parse_coordinate(field: &str, hemisphere: &str) -> Option<f64> {
    let dot = field.find('.')?;
    // 小数点前两位固定是分,余下是度
    if dot < 3 {
        return None;
    }
    let degrees: f64 = field.get(..dot - 2)?.parse().ok()?;
    let minutes: f64 = field.get(dot - 2..)?.parse().ok()?;

    let value = degrees + minutes / 60.0;
    match hemisphere {
        "N" | "E" => Some(value),
        "S" | "W" => Some(-value),
        _ => None,
    }
}

//! 配置校验模块
//!
//! 校验规则:
//! - 传输模式所需字段齐全 (serial: device; replay: replay_path)
//! - 速率/倍率为正
//! - 视口尺寸为正, 中心坐标在合法范围
//! - 平滑系数在 [0, 1], 新鲜度上限非负
//! - 叠加层名称唯一且非空, file 类型必须给 path

use std::collections::HashSet;

use contracts::{ContractError, MissionBlueprint, OverlayKind, TransportMode};

/// 校验 MissionBlueprint 配置
///
/// 返回第一个遇到的错误,或 Ok(())。
pub fn validate(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    validate_transport(blueprint)?;
    validate_inertial(blueprint)?;
    validate_fusion(blueprint)?;
    validate_viewport(blueprint)?;
    validate_overlays(blueprint)?;
    Ok(())
}

/// 校验传输配置
fn validate_transport(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    let transport = &blueprint.transport;

    match transport.mode {
        TransportMode::Serial => {
            if transport.device.as_deref().unwrap_or("").is_empty() {
                return Err(ContractError::config_validation(
                    "transport.device",
                    "serial mode requires a device path",
                ));
            }
            if transport.baud_rate == 0 {
                return Err(ContractError::config_validation(
                    "transport.baud_rate",
                    "baud_rate must be > 0",
                ));
            }
        }
        TransportMode::Replay => {
            if transport.replay_path.is_none() {
                return Err(ContractError::config_validation(
                    "transport.replay_path",
                    "replay mode requires a replay_path",
                ));
            }
            if transport.speed_multiplier <= 0.0 {
                return Err(ContractError::config_validation(
                    "transport.speed_multiplier",
                    format!(
                        "speed_multiplier must be > 0, got {}",
                        transport.speed_multiplier
                    ),
                ));
            }
        }
        TransportMode::Mock => {
            if transport.mock_rate_hz <= 0.0 {
                return Err(ContractError::config_validation(
                    "transport.mock_rate_hz",
                    format!("mock_rate_hz must be > 0, got {}", transport.mock_rate_hz),
                ));
            }
        }
    }

    Ok(())
}

/// 校验惯性源配置
fn validate_inertial(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    if blueprint.inertial.sample_rate_hz <= 0.0 {
        return Err(ContractError::config_validation(
            "inertial.sample_rate_hz",
            format!(
                "sample_rate_hz must be > 0, got {}",
                blueprint.inertial.sample_rate_hz
            ),
        ));
    }
    Ok(())
}

/// 校验融合配置
fn validate_fusion(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    let fusion = &blueprint.fusion;

    if !(0.0..=1.0).contains(&fusion.smoothing_alpha) {
        return Err(ContractError::config_validation(
            "fusion.smoothing_alpha",
            format!(
                "smoothing_alpha must be in [0, 1], got {}",
                fusion.smoothing_alpha
            ),
        ));
    }

    if fusion.max_fix_age_s < 0.0 {
        return Err(ContractError::config_validation(
            "fusion.max_fix_age_s",
            format!("max_fix_age_s must be >= 0, got {}", fusion.max_fix_age_s),
        ));
    }

    Ok(())
}

/// 校验视口配置
fn validate_viewport(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    let viewport = &blueprint.viewport;

    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Err(ContractError::config_validation(
            "viewport.width / viewport.height",
            format!(
                "viewport dimensions must be > 0, got {}x{}",
                viewport.width, viewport.height
            ),
        ));
    }

    if !(-90.0..=90.0).contains(&viewport.center_latitude) {
        return Err(ContractError::config_validation(
            "viewport.center_latitude",
            format!(
                "latitude must be in [-90, 90], got {}",
                viewport.center_latitude
            ),
        ));
    }

    if !(-180.0..=180.0).contains(&viewport.center_longitude) {
        return Err(ContractError::config_validation(
            "viewport.center_longitude",
            format!(
                "longitude must be in [-180, 180], got {}",
                viewport.center_longitude
            ),
        ));
    }

    if viewport.pixels_per_meter <= 0.0 {
        return Err(ContractError::config_validation(
            "viewport.pixels_per_meter",
            format!(
                "pixels_per_meter must be > 0, got {}",
                viewport.pixels_per_meter
            ),
        ));
    }

    Ok(())
}

/// 校验叠加层配置
fn validate_overlays(blueprint: &MissionBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, overlay) in blueprint.overlays.iter().enumerate() {
        if overlay.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("overlays[{}].name", idx),
                "overlay name cannot be empty",
            ));
        }
        if !seen.insert(&overlay.name) {
            return Err(ContractError::config_validation(
                format!("overlays[name={}]", overlay.name),
                "duplicate overlay name",
            ));
        }
        if overlay.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("overlays[{}].queue_capacity", overlay.name),
                "queue_capacity must be > 0",
            ));
        }
        if overlay.kind == OverlayKind::File && overlay.path.is_none() {
            return Err(ContractError::config_validation(
                format!("overlays[{}].path", overlay.name),
                "file overlay requires a path",
            ));
        }
    }
    Ok(())
}

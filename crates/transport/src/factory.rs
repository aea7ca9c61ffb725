//! 数据源工厂
//!
//! 从任务蓝图的传输与惯性配置构建具体数据源实例。

use contracts::{
    InertialConfig, InertialMode, InertialSource, SentenceTransport, TransportConfig,
    TransportMode,
};
use tracing::info;

use crate::error::{Result, TransportError};
use crate::mock::{MockInertialConfig, MockInertialSource, MockTransport, MockTransportConfig};
use crate::replay::{ReplayConfig, ReplayTransport};
#[cfg(feature = "real-serial")]
use crate::serial::{SerialConfig, SerialTransport};

/// 根据传输配置构建语句传输
///
/// serial 模式仅在启用 `real-serial` 特性时可用，
/// 未编译时返回 ModeUnavailable。
pub fn build_transport(config: &TransportConfig) -> Result<Box<dyn SentenceTransport>> {
    match config.mode {
        TransportMode::Mock => {
            info!(rate_hz = config.mock_rate_hz, "building mock transport");
            Ok(Box::new(MockTransport::new(MockTransportConfig {
                rate_hz: config.mock_rate_hz,
                channel: config.channel,
            })))
        }
        TransportMode::Replay => {
            let Some(path) = config.replay_path.clone() else {
                return Err(TransportError::replay_load(
                    "<unset>",
                    "replay_path is required for replay mode",
                ));
            };
            info!(path = %path.display(), "building replay transport");
            Ok(Box::new(ReplayTransport::new(ReplayConfig {
                replay_path: path,
                speed_multiplier: config.speed_multiplier,
                loop_playback: config.loop_playback,
                channel: config.channel,
            })))
        }
        #[cfg(feature = "real-serial")]
        TransportMode::Serial => {
            let Some(device) = config.device.clone() else {
                return Err(TransportError::open(
                    "<unset>",
                    "device is required for serial mode",
                ));
            };
            info!(device = %device, baud_rate = config.baud_rate, "building serial transport");
            Ok(Box::new(SerialTransport::new(SerialConfig {
                device,
                baud_rate: config.baud_rate,
                channel: config.channel,
            })))
        }
        #[cfg(not(feature = "real-serial"))]
        TransportMode::Serial => Err(TransportError::mode_unavailable(
            "serial",
            "rebuild with the real-serial feature",
        )),
    }
}

/// 根据惯性配置构建样本源；`none` 模式表示不挂载惯性源
pub fn build_inertial_source(config: &InertialConfig) -> Result<Option<Box<dyn InertialSource>>> {
    match config.mode {
        InertialMode::Mock => {
            info!(
                sample_rate_hz = config.sample_rate_hz,
                "building mock inertial source"
            );
            Ok(Some(Box::new(MockInertialSource::new(
                MockInertialConfig {
                    sample_rate_hz: config.sample_rate_hz,
                    start_heading_deg: config.start_heading_deg,
                    sweep_dps: config.sweep_dps,
                },
            ))))
        }
        InertialMode::None => Ok(None),
    }
}

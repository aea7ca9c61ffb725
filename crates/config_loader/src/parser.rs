//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, MissionBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<MissionBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<MissionBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<MissionBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OverlayKind, TransportMode};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[transport]
mode = "serial"
device = "/dev/ttyS1"
baud_rate = 115200

[fusion]
strategy = "accel_mag"
max_fix_age_s = 5.0

[viewport]
width = 1080.0
height = 1920.0
center_latitude = 40.0
center_longitude = -73.0
pixels_per_meter = 0.5

[[overlays]]
name = "map_line"
kind = "file"
path = "direction.json"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.transport.mode, TransportMode::Serial);
        assert_eq!(bp.transport.device.as_deref(), Some("/dev/ttyS1"));
        assert_eq!(bp.transport.baud_rate, 115200);
        assert_eq!(bp.fusion.max_fix_age_s, 5.0);
        assert_eq!(bp.overlays.len(), 1);
        assert_eq!(bp.overlays[0].kind, OverlayKind::File);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "transport": { "mode": "mock", "mock_rate_hz": 5.0 },
            "viewport": {
                "width": 800.0,
                "height": 600.0,
                "center_latitude": 40.5,
                "center_longitude": -73.5
            },
            "overlays": [{ "name": "log", "kind": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.transport.mode, TransportMode::Mock);
        assert_eq!(bp.transport.mock_rate_hz, 5.0);
    }

    #[test]
    fn test_parse_defaults_fill_in() {
        let content = r#"
[transport]
mode = "replay"
replay_path = "walk.log"

[viewport]
width = 100.0
height = 100.0
center_latitude = 0.0
center_longitude = 0.0
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.transport.channel, 2);
        assert_eq!(bp.transport.speed_multiplier, 1.0);
        assert!(bp.transport.loop_playback);
        assert_eq!(bp.fusion.smoothing_alpha, 0.0);
        assert!(bp.overlays.is_empty());
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}

//! Fusion 错误类型

use thiserror::Error;

/// Fusion 错误
///
/// 退化样本不算错误:该刻跳过,只计数。
#[derive(Debug, Error)]
pub enum FusionError {
    /// 惯性源绑定失败
    #[error("inertial source bind failed: {0}")]
    SourceBind(#[from] contracts::ContractError),

    /// 管线已在运行
    #[error("fusion pipeline already running")]
    AlreadyRunning,
}

/// Result 别名
pub type Result<T> = std::result::Result<T, FusionError>;

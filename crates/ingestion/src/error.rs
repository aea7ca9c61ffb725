//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
///
/// 坏语句/无效定位不在此列:它们在发生处被吸收,只计数不上抛。
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 传输绑定失败 (设备/文件打不开)
    #[error("transport bind failed: {0}")]
    TransportBind(#[from] contracts::ContractError),

    /// 管线已在运行
    #[error("ingestion pipeline already running")]
    AlreadyRunning,

    /// 内部块通道在运行期间关闭
    #[error("chunk channel closed unexpectedly")]
    ChannelClosed,
}

/// Result 别名
pub type Result<T> = std::result::Result<T, IngestionError>;

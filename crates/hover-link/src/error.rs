//! 链路层错误类型定义

use hover_protocol::ProtocolError;
use hover_serial::SerialError;
use thiserror::Error;

/// 链路层错误类型
///
/// 与恢复策略的对应关系：
/// - [`Acquisition`](LinkError::Acquisition) 与
///   [`Validation`](LinkError::Validation) 同步返回给调用方，不触发重连；
/// - [`Io`](LinkError::Io) 由重连策略在次数上限内本地恢复；
/// - 资源释放失败只记日志，不会出现在任何返回值里。
#[derive(Error, Debug)]
pub enum LinkError {
    /// 未能获取传输（端口不存在、被占用、无可用设备）
    #[error("Failed to acquire serial transport: {0}")]
    Acquisition(#[source] SerialError),

    /// 会话中的读写故障
    #[error("Serial I/O failure: {0}")]
    Io(#[source] SerialError),

    /// 上行命令参数校验失败
    #[error("Invalid command: {0}")]
    Validation(#[from] ProtocolError),

    /// 链路未连接，命令被拒绝
    #[error("Link is not connected")]
    NotConnected,
}

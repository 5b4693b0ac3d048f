//! # Hover Serial Adapter Layer
//!
//! 串口硬件抽象层，提供统一的双工字节流接口。
//!
//! 读写两个半部是分离的 trait：连接建立后，读半部被移入后台读取线程
//! 独占，写半部留在链路管理器中。两个半部都释放后，底层端口随之关闭。

use std::time::Duration;
use thiserror::Error;

pub mod port;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use port::{SerialPortTransport, available_ports};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockHandle, MockRead, MockSerial};

/// 固定波特率：设备固件只支持 115200，8N1，无流控
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 串口适配层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),
    /// 读超时：窗口内无数据到达，不代表链路故障
    #[error("Read timeout")]
    Timeout,
    /// 流结束：对端关闭或设备被拔出
    #[error("Stream closed")]
    Closed,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NotFound,
    NoDevice,
    AccessDenied,
    Busy,
    UnsupportedConfig,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SerialDeviceErrorKind::NoDevice
                | SerialDeviceErrorKind::AccessDenied
                | SerialDeviceErrorKind::NotFound
        )
    }
}

impl From<String> for SerialDeviceError {
    fn from(message: String) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for SerialDeviceError {
    fn from(message: &str) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

/// 读半部
pub trait RxTransport {
    /// 读取一段字节到 `buf`
    ///
    /// - `Ok(n)`（n > 0）：读到 n 个字节
    /// - `Err(SerialError::Timeout)`：超时窗口内无数据
    /// - `Err(SerialError::Closed)`：流结束
    /// - `Err(_)`：IO 故障
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;
}

/// 写半部
pub trait TxTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError>;
    fn flush(&mut self) -> Result<(), SerialError>;
}

/// 可分离的双工传输
pub trait SplittableTransport {
    type Rx: RxTransport;
    type Tx: TxTransport;
    fn split(self) -> Result<(Self::Rx, Self::Tx), SerialError>;
}

/// 打开传输时的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = SerialDeviceError::new(SerialDeviceErrorKind::NoDevice, "no ports found");
        let msg = format!("{}", err);
        assert!(msg.contains("NoDevice") && msg.contains("no ports found"));
    }

    #[test]
    fn test_device_error_fatal_classification() {
        assert!(SerialDeviceError::new(SerialDeviceErrorKind::NoDevice, "x").is_fatal());
        assert!(SerialDeviceError::new(SerialDeviceErrorKind::AccessDenied, "x").is_fatal());
        assert!(!SerialDeviceError::new(SerialDeviceErrorKind::Busy, "x").is_fatal());
        assert!(!SerialDeviceError::new(SerialDeviceErrorKind::Unknown, "x").is_fatal());
    }

    #[test]
    fn test_from_str_defaults_to_unknown() {
        let err: SerialDeviceError = "boom".into();
        assert_eq!(err.kind, SerialDeviceErrorKind::Unknown);
    }

    #[test]
    fn test_default_settings() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.read_timeout, Duration::from_millis(50));
    }
}

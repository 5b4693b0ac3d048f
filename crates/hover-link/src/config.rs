//! 链路配置

use hover_serial::{DEFAULT_BAUD_RATE, SerialSettings};
use std::time::Duration;

/// 链路配置
///
/// 控制传输打开参数、遥测缓冲容量与重连策略。
///
/// # Example
///
/// ```
/// use hover_link::LinkConfig;
///
/// // 使用默认配置（115200 波特，缓冲 50 条，重连上限 3 次、间隔 3 秒）
/// let config = LinkConfig::default();
///
/// // 自定义配置
/// let config = LinkConfig {
///     reconnect_delay_ms: 1_000,
///     ..LinkConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// 串口波特率（设备固件固定 115200）
    pub baud_rate: u32,
    /// 单次读取的超时窗口（毫秒）
    ///
    /// 决定取消信号被读取线程观察到的最大延迟。
    pub read_timeout_ms: u64,
    /// 遥测环形缓冲容量（条）
    pub telemetry_capacity: usize,
    /// 自动重连次数上限，达到后需手动重连
    pub reconnect_max_attempts: u32,
    /// 自动重连前的固定延迟（毫秒）
    pub reconnect_delay_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 50,
            telemetry_capacity: 50,
            reconnect_max_attempts: 3,
            reconnect_delay_ms: 3_000,
        }
    }
}

impl LinkConfig {
    /// 转换为传输层打开参数
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            baud_rate: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }

    /// 重连延迟
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

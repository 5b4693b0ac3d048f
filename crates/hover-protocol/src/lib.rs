//! # Hover Protocol
//!
//! 悬停车链路的文本协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `command`: 上行控制命令构建（`SETPOINT:` / `PID:`）
//! - `framing`: 下行字节流的行分帧
//! - `telemetry`: 行内容分类（遥测 / 诊断）与遥测样本类型
//!
//! ## 线路格式
//!
//! 协议为 ASCII 行协议，每帧以 LF（`\n`）结尾：
//!
//! ```text
//! Host → Device:  SETPOINT:<float>\n         目标高度（cm，0-100）
//!                 PID:<kp>,<ki>,<kd>\n       PID 增益，逗号分隔，无空格
//! Device → Host:  <float>\n                  高度遥测（cm）
//!                 <任意文本>\n                诊断输出（仅供记录）
//! ```

pub mod command;
pub mod framing;
pub mod telemetry;

// 重新导出常用类型
pub use command::{HoverCommand, SETPOINT_MAX_CM, SETPOINT_MIN_CM};
pub use framing::LineDecoder;
pub use telemetry::{DeviceMessage, TelemetrySample, classify};

use thiserror::Error;

/// 协议层错误类型
///
/// 仅覆盖上行命令的参数校验；下行分帧与分类是全量函数，永不失败。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 目标高度超出允许范围
    #[error("Setpoint out of range: {value} cm (expected 0-100 cm)")]
    SetpointOutOfRange { value: f64 },

    /// 数值字段不是有限数（NaN / ±inf）
    #[error("Non-finite value for {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

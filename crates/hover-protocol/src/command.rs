//! 上行控制命令构建
//!
//! 命令是一次性的：构建、校验、编码、发送，随即丢弃，不做任何持久化。

use crate::ProtocolError;

/// 目标高度下限（cm）
pub const SETPOINT_MIN_CM: f64 = 0.0;

/// 目标高度上限（cm）
pub const SETPOINT_MAX_CM: f64 = 100.0;

/// 上行控制命令
///
/// 两种命令对应设备固件支持的两条指令。编码前必须通过 [`validate`]：
/// 越界或非有限值的命令不会触达传输层。
///
/// [`validate`]: HoverCommand::validate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HoverCommand {
    /// 目标高度（cm），域 [0, 100]
    Setpoint { height_cm: f64 },
    /// PID 增益（Kp, Ki, Kd），任意有限值
    PidGains { kp: f64, ki: f64, kd: f64 },
}

impl HoverCommand {
    /// 校验命令参数
    ///
    /// # 错误
    /// - `ProtocolError::SetpointOutOfRange`: 目标高度不在 [0, 100] cm 内
    /// - `ProtocolError::NonFinite`: 任一字段为 NaN 或 ±inf
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match *self {
            HoverCommand::Setpoint { height_cm } => {
                if !height_cm.is_finite() {
                    return Err(ProtocolError::NonFinite {
                        field: "setpoint",
                        value: height_cm,
                    });
                }
                if !(SETPOINT_MIN_CM..=SETPOINT_MAX_CM).contains(&height_cm) {
                    return Err(ProtocolError::SetpointOutOfRange { value: height_cm });
                }
                Ok(())
            },
            HoverCommand::PidGains { kp, ki, kd } => {
                for (field, value) in [("kp", kp), ("ki", ki), ("kd", kd)] {
                    if !value.is_finite() {
                        return Err(ProtocolError::NonFinite { field, value });
                    }
                }
                Ok(())
            },
        }
    }

    /// 编码为线路文本（含 LF 结尾）
    ///
    /// 浮点采用 Rust 默认的最短十进制表示，与区域设置无关：
    /// `50.0` 编码为 `"50"`，`12.5` 编码为 `"12.5"`。
    ///
    /// # 错误
    /// 校验失败时返回 [`ProtocolError`]，不产生任何输出。
    pub fn encode(&self) -> Result<String, ProtocolError> {
        self.validate()?;
        let line = match *self {
            HoverCommand::Setpoint { height_cm } => format!("SETPOINT:{height_cm}\n"),
            HoverCommand::PidGains { kp, ki, kd } => format!("PID:{kp},{ki},{kd}\n"),
        };
        Ok(line)
    }
}

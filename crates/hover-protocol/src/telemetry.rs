//! 行内容分类与遥测样本类型
//!
//! 设备输出的每一行要么是一个裸浮点数（高度遥测，cm），
//! 要么是任意文本（诊断输出）。分类是全量函数，永不失败。

/// 一条已分类的设备消息
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceMessage {
    /// 高度遥测（cm）。数值范围不做约束，钳位是展示层的事。
    Telemetry(f64),
    /// 非数值的诊断文本，不参与控制
    Diagnostic(String),
}

/// 对一条解码后的行做分类
///
/// 采用严格的 `f64` 解析：整行必须是一个合法的浮点字面量，
/// `"12.5abc"` 这类带数值前缀的行归为诊断。
pub fn classify(line: &str) -> DeviceMessage {
    match line.parse::<f64>() {
        Ok(value) => DeviceMessage::Telemetry(value),
        Err(_) => DeviceMessage::Diagnostic(line.to_string()),
    }
}

/// 一个带时间戳的遥测样本
///
/// 由链路层在分类时刻打上系统时间戳（微秒，UNIX 纪元起），创建后不可变。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetrySample {
    /// 分类时刻的系统时间戳（微秒）
    pub timestamp_us: u64,
    /// 高度（cm）
    pub height_cm: f64,
}

impl TelemetrySample {
    pub fn new(timestamp_us: u64, height_cm: f64) -> Self {
        Self {
            timestamp_us,
            height_cm,
        }
    }
}

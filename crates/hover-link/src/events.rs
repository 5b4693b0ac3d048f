//! 面向展示层协作方的事件类型
//!
//! 链路管理器通过一条无界 channel 向协作方（UI、CLI、日志器）推送事件。
//! 状态变更事件在触发它的调用返回之前发出，保证协作方观察到的顺序
//! 与状态机一致。

use crate::state::LinkState;
use hover_protocol::TelemetrySample;

/// 链路事件
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// 连接状态变更
    StateChanged(LinkState),
    /// 新的遥测样本
    Telemetry(TelemetrySample),
    /// 设备诊断输出（非数值行），仅供记录
    Diagnostic(String),
    /// 一次 send 调用的结果
    CommandResult {
        accepted: bool,
        reason: Option<String>,
    },
    /// 自动重连次数已达上限，需要手动重连
    ReconnectExhausted,
}

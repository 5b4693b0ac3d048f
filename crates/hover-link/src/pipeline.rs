//! 读取线程主循环
//!
//! 每个连接会话一个读取线程：单个未完成读取（无读流水线），
//! 收到的每块字节先过行分帧，再逐行分类分发。
//! 行分帧器是会话局部状态，会话结束时残留的半行数据随之丢弃。

use crate::hover::LinkShared;
use hover_protocol::LineDecoder;
use hover_serial::{RxTransport, SerialError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, trace};

/// 读取线程主循环
///
/// # 参数
/// - `rx`: 读半部（线程独占，循环退出时释放）
/// - `shared`: 链路共享上下文
/// - `session_epoch`: 本会话的纪元号（用于识别过期的丢失报告）
/// - `running`: 会话运行标志（`disconnect()` 置 false 以取消）
///
/// 退出路径：
/// - 取消（运行标志为 false）→ 静默退出；
/// - 流结束 / 读故障且会话仍存活 → 走意外丢失恢复路径。
pub(crate) fn read_loop(
    mut rx: Box<dyn RxTransport + Send>,
    shared: Arc<LinkShared>,
    session_epoch: u64,
    running: Arc<AtomicBool>,
) {
    let mut decoder = LineDecoder::new();
    let mut buf = [0u8; 512];
    let mut lost = false;

    loop {
        // Acquire: 观察到 false 时，取消方的全部写入已可见
        if !running.load(Ordering::Acquire) {
            trace!("Read thread: cancellation observed, exiting");
            break;
        }

        match rx.read_chunk(&mut buf) {
            Ok(n) => {
                shared.register_frame();
                for line in decoder.push(&buf[..n]) {
                    shared.dispatch_line(&line);
                }
            },
            Err(SerialError::Timeout) => {
                // 超时是正常情况，回到循环顶部重新检查运行标志
                continue;
            },
            Err(SerialError::Closed) => {
                info!("Read thread: serial stream ended");
                lost = true;
                break;
            },
            Err(e) => {
                error!("Read thread: serial read error: {}", e);
                lost = true;
                break;
            },
        }
    }

    // 会话仍名义上存活时的异常退出：释放资源并按策略安排重连。
    // 被 disconnect() 取消的退出不走这条路径。
    if lost && running.load(Ordering::Acquire) {
        shared.handle_link_loss(session_epoch);
    }

    trace!("Read thread: loop exited (epoch {})", session_epoch);
}

//! 链路管理器（对外 API）
//!
//! [`HoverLink`] 封装连接状态机、后台读取线程与重连策略。
//! 状态、传输句柄与重连计数作为一个整体由互斥锁守护；
//! 纪元计数器让任何过期的延迟重连在触发时退化为空操作。

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::events::LinkEvent;
use crate::factory::TransportFactory;
use crate::monitor::ConnectionMonitor;
use crate::pipeline;
use crate::state::{LinkState, TelemetryBuffer};
use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, Sender};
use hover_protocol::{DeviceMessage, HoverCommand, TelemetrySample, classify};
use hover_serial::TxTransport;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// 当前系统时间（微秒，UNIX 纪元起）
fn system_now_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_micros() as u64
}

/// 一个活动会话持有的资源
struct ActiveSession {
    /// 写半部（读半部已移入读取线程）
    tx: Box<dyn TxTransport + Send>,
    /// 会话运行标志，置 false 取消读取线程
    running: Arc<AtomicBool>,
    /// 读取线程句柄（释放时 join）
    reader: Option<JoinHandle<()>>,
    /// 本会话的纪元号
    epoch: u64,
}

/// 受互斥锁守护的连接状态
///
/// 状态与会话资源必须作为一个整体变更，否则"仅 Connected 可读写"
/// 的不变量会在并发下被打破。
struct ConnectionState {
    state: LinkState,
    session: Option<ActiveSession>,
}

/// 链路共享上下文
///
/// 被管理器、读取线程与延迟重连线程共同持有（Arc）。
pub(crate) struct LinkShared {
    config: LinkConfig,
    factory: Box<dyn TransportFactory>,
    conn: Mutex<ConnectionState>,
    /// 纪元计数器：每次建立或拆除会话递增。
    /// 延迟重连按调度时的纪元号校验，过期则放弃。
    epoch: AtomicU64,
    /// 自动重连计数，手动连接成功时清零
    reconnect_attempts: AtomicU32,
    events: Sender<LinkEvent>,
    telemetry: Mutex<TelemetryBuffer>,
    /// 最新遥测样本的无锁快照
    latest: ArcSwapOption<TelemetrySample>,
    monitor: ConnectionMonitor,
}

impl LinkShared {
    fn new(
        config: LinkConfig,
        factory: Box<dyn TransportFactory>,
        events: Sender<LinkEvent>,
    ) -> Self {
        let telemetry = TelemetryBuffer::new(config.telemetry_capacity);
        Self {
            config,
            factory,
            conn: Mutex::new(ConnectionState {
                state: LinkState::Disconnected,
                session: None,
            }),
            epoch: AtomicU64::new(0),
            reconnect_attempts: AtomicU32::new(0),
            events,
            telemetry: Mutex::new(telemetry),
            latest: ArcSwapOption::empty(),
            monitor: ConnectionMonitor::new(),
        }
    }

    /// 变更状态并同步通知协作方
    ///
    /// 必须在持有 `conn` 锁时调用，保证事件顺序与状态机一致。
    fn set_state(&self, conn: &mut ConnectionState, next: LinkState) {
        if conn.state != next {
            conn.state = next;
            let _ = self.events.send(LinkEvent::StateChanged(next));
        }
    }

    /// 建立连接
    ///
    /// `retry_epoch` 为 `Some` 时表示来自延迟重连：仅当状态仍是
    /// `Disconnected` 且纪元号自调度以来未变时才动作，否则表示
    /// 期间发生了人为操作，本次重连作废。状态检查与建连在同一次
    /// 持锁内完成，不存在检查-动作之间的窗口。
    fn connect_inner(self: &Arc<Self>, retry_epoch: Option<u64>) -> Result<(), LinkError> {
        let mut conn = self.conn.lock();

        if let Some(expected) = retry_epoch {
            if conn.state != LinkState::Disconnected
                || self.epoch.load(Ordering::Acquire) != expected
            {
                debug!("Scheduled reconnect superseded by manual action, ignoring");
                return Ok(());
            }
        } else {
            match conn.state {
                LinkState::Connected => {
                    // 原始行为：已连接时再次 connect 等价于断开
                    drop(conn);
                    self.disconnect();
                    return Ok(());
                },
                LinkState::Connecting => return Ok(()),
                LinkState::Disconnected => {},
            }
        }

        self.set_state(&mut conn, LinkState::Connecting);

        let (rx, tx) = match self.factory.open(&self.config) {
            Ok(pair) => pair,
            Err(e) => {
                error!("Failed to acquire serial transport: {}", e);
                self.set_state(&mut conn, LinkState::Disconnected);
                return Err(LinkError::Acquisition(e));
            },
        };

        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let running = Arc::new(AtomicBool::new(true));

        // 手动连接成功时清零重连计数；自动重连成功不清零，
        // 否则持续抖动的链路会无限重试，次数上限失去意义。
        if retry_epoch.is_none() {
            self.reconnect_attempts.store(0, Ordering::Release);
        }

        // 先通知 Connected 再启动读取线程：遥测事件不会先于状态事件。
        // 锁持续持有，外部观察不到"已 Connected 但无会话"的中间态。
        self.set_state(&mut conn, LinkState::Connected);

        let shared = Arc::clone(self);
        let running_reader = Arc::clone(&running);
        let reader = spawn(move || {
            pipeline::read_loop(rx, shared, epoch, running_reader);
        });

        conn.session = Some(ActiveSession {
            tx,
            running,
            reader: Some(reader),
            epoch,
        });

        info!("Link connected (epoch {})", epoch);
        Ok(())
    }

    /// 手动建立连接（公开入口）
    pub(crate) fn connect(self: &Arc<Self>) -> Result<(), LinkError> {
        self.connect_inner(None)
    }

    /// 断开连接（幂等）
    ///
    /// 总是终止于 `Disconnected`；资源释放是尽力而为的，任何一步
    /// 失败只记日志，不阻止后续释放。
    pub(crate) fn disconnect(&self) {
        let session = {
            let mut conn = self.conn.lock();
            // 任何断开都递增纪元，使挂起的延迟重连作废
            self.epoch.fetch_add(1, Ordering::AcqRel);
            let session = conn.session.take();
            self.set_state(&mut conn, LinkState::Disconnected);
            session
        };

        if let Some(session) = session {
            self.release_session(session);
            info!("Link disconnected");
        }
    }

    /// 释放一个会话的全部资源
    ///
    /// 顺序：取消并回收读取线程、释放写半部、关闭底层传输。
    /// 必须在不持有 `conn` 锁时调用：读取线程的丢失路径也会争用
    /// 该锁，持锁 join 会死锁。
    fn release_session(&self, mut session: ActiveSession) {
        // Release: 读取线程观察到 false 时，之前的写入全部可见
        session.running.store(false, Ordering::Release);

        if let Some(handle) = session.reader.take() {
            if handle.thread().id() != std::thread::current().id() {
                // 阻塞中的读取最多一个超时窗口后观察到取消
                if handle.join().is_err() {
                    warn!("Read thread panicked during release");
                }
            }
            // 丢失路径由读取线程自身触发时循环已退出，无需 join
        }

        if let Err(e) = session.tx.flush() {
            warn!("Failed to flush write half during release: {}", e);
        }
        // 写半部 drop；读半部已随读取线程退出释放，底层端口关闭
        drop(session.tx);
    }

    /// 意外丢失恢复路径（读故障、流结束、写故障共用）
    ///
    /// 以会话纪元号识别过期报告：若该会话已被并发的 disconnect /
    /// 新连接替换，这里不再动作。
    pub(crate) fn handle_link_loss(self: &Arc<Self>, observed_epoch: u64) {
        let (session, sched_epoch) = {
            let mut conn = self.conn.lock();
            let live = conn.session.as_ref().map(|s| s.epoch) == Some(observed_epoch);
            if !live {
                debug!(
                    "Stale link-loss report for epoch {}, ignoring",
                    observed_epoch
                );
                return;
            }
            // 重连的纪元号在同一临界区内确定：此后任何人为操作
            // （disconnect / 新连接）都会再次递增纪元，使之作废
            let sched_epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
            let session = conn.session.take();
            self.set_state(&mut conn, LinkState::Disconnected);
            (session, sched_epoch)
        };

        if let Some(session) = session {
            self.release_session(session);
        }
        warn!("Link lost unexpectedly (epoch {})", observed_epoch);

        self.schedule_reconnect(sched_epoch);
    }

    /// 在次数上限内安排一次延迟重连
    fn schedule_reconnect(self: &Arc<Self>, sched_epoch: u64) {
        let max = self.config.reconnect_max_attempts;
        let attempts = self.reconnect_attempts.load(Ordering::Acquire);
        if attempts >= max {
            warn!(
                "Reconnect ceiling reached ({}/{}), manual reconnection required",
                attempts, max
            );
            let _ = self.events.send(LinkEvent::ReconnectExhausted);
            return;
        }

        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::AcqRel) + 1;
        let delay = self.config.reconnect_delay();
        info!(
            "Scheduling reconnect attempt {}/{} in {:?}",
            attempt, max, delay
        );

        let shared = Arc::clone(self);
        spawn(move || {
            std::thread::sleep(delay);
            match shared.connect_inner(Some(sched_epoch)) {
                Ok(()) => {},
                Err(e) => {
                    // 获取失败不链式重试：恢复交给手动重连
                    error!("Reconnect attempt {} failed: {}", attempt, e);
                },
            }
        });
    }

    /// 发送一条控制命令
    ///
    /// 未连接或校验失败的命令在触达传输之前被拒绝；
    /// 写故障与读故障同等对待，触发意外丢失恢复路径。
    pub(crate) fn send(self: &Arc<Self>, command: &HoverCommand) -> Result<(), LinkError> {
        let mut conn = self.conn.lock();

        if conn.state != LinkState::Connected {
            let _ = self.events.send(LinkEvent::CommandResult {
                accepted: false,
                reason: Some("link is not connected".to_string()),
            });
            return Err(LinkError::NotConnected);
        }

        let line = match command.encode() {
            Ok(line) => line,
            Err(e) => {
                warn!("Rejected outbound command: {}", e);
                let _ = self.events.send(LinkEvent::CommandResult {
                    accepted: false,
                    reason: Some(e.to_string()),
                });
                return Err(LinkError::Validation(e));
            },
        };

        let Some(session) = conn.session.as_mut() else {
            let _ = self.events.send(LinkEvent::CommandResult {
                accepted: false,
                reason: Some("link is not connected".to_string()),
            });
            return Err(LinkError::NotConnected);
        };

        match session.tx.write_all(line.as_bytes()) {
            Ok(()) => {
                debug!("Sent command: {}", line.trim_end());
                let _ = self.events.send(LinkEvent::CommandResult {
                    accepted: true,
                    reason: None,
                });
                Ok(())
            },
            Err(e) => {
                error!("Write failed, treating as unexpected link loss: {}", e);
                let epoch = session.epoch;
                let _ = self.events.send(LinkEvent::CommandResult {
                    accepted: false,
                    reason: Some(e.to_string()),
                });
                drop(conn);
                self.handle_link_loss(epoch);
                Err(LinkError::Io(e))
            },
        }
    }

    /// 记录一块下行数据到达（供读取线程调用）
    pub(crate) fn register_frame(&self) {
        self.monitor.register_frame();
    }

    /// 分类并分发一条解码后的行（供读取线程调用）
    pub(crate) fn dispatch_line(&self, line: &str) {
        match classify(line) {
            DeviceMessage::Telemetry(height_cm) => {
                let sample = TelemetrySample::new(system_now_us(), height_cm);
                self.telemetry.lock().push(sample);
                self.latest.store(Some(Arc::new(sample)));
                trace!("Telemetry sample: {} cm", height_cm);
                let _ = self.events.send(LinkEvent::Telemetry(sample));
            },
            DeviceMessage::Diagnostic(text) => {
                debug!("Device diagnostic: {}", text);
                let _ = self.events.send(LinkEvent::Diagnostic(text));
            },
        }
    }
}

/// 悬停车链路管理器（对外 API）
///
/// 通过 [`HoverLinkBuilder`](crate::HoverLinkBuilder) 构建，初始状态为
/// `Disconnected`；Drop 时断开连接并回收读取线程。
///
/// # Example
///
/// ```no_run
/// use hover_link::{HoverLinkBuilder, LinkEvent};
///
/// let link = HoverLinkBuilder::new().port("/dev/ttyUSB0").build();
/// link.connect()?;
/// link.send_setpoint(42.5)?;
/// for event in link.events().iter() {
///     if let LinkEvent::Telemetry(sample) = event {
///         println!("height: {} cm", sample.height_cm);
///     }
/// }
/// # Ok::<(), hover_link::LinkError>(())
/// ```
pub struct HoverLink {
    shared: Arc<LinkShared>,
    events_rx: Receiver<LinkEvent>,
}

impl HoverLink {
    pub(crate) fn new(config: LinkConfig, factory: Box<dyn TransportFactory>) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let shared = Arc::new(LinkShared::new(config, factory, events_tx));
        Self { shared, events_rx }
    }

    /// 建立连接
    ///
    /// 已连接时等价于 [`disconnect`](Self::disconnect)（toggle 语义）。
    /// 成功时清零重连计数并启动读取线程。
    ///
    /// # 错误
    /// - `LinkError::Acquisition`: 未能获取传输；不会自动重试
    pub fn connect(&self) -> Result<(), LinkError> {
        self.shared.connect()
    }

    /// 断开连接（幂等），总是终止于 `Disconnected`
    pub fn disconnect(&self) {
        self.shared.disconnect();
    }

    /// 发送一条控制命令
    ///
    /// # 错误
    /// - `LinkError::NotConnected`: 状态不是 `Connected`，未做传输 IO
    /// - `LinkError::Validation`: 参数校验失败，未做传输 IO
    /// - `LinkError::Io`: 写故障；已触发断开与按策略的自动重连
    pub fn send(&self, command: &HoverCommand) -> Result<(), LinkError> {
        self.shared.send(command)
    }

    /// 发送目标高度（cm，域 [0, 100]）
    pub fn send_setpoint(&self, height_cm: f64) -> Result<(), LinkError> {
        self.send(&HoverCommand::Setpoint { height_cm })
    }

    /// 发送 PID 增益
    pub fn send_pid_gains(&self, kp: f64, ki: f64, kd: f64) -> Result<(), LinkError> {
        self.send(&HoverCommand::PidGains { kp, ki, kd })
    }

    /// 当前链路状态
    pub fn state(&self) -> LinkState {
        self.shared.conn.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// 事件接收端（状态变更、遥测、诊断、命令结果）
    pub fn events(&self) -> &Receiver<LinkEvent> {
        &self.events_rx
    }

    /// 按到达顺序拷贝遥测缓冲的当前内容
    pub fn telemetry_snapshot(&self) -> Vec<TelemetrySample> {
        self.shared.telemetry.lock().snapshot()
    }

    /// 最新遥测样本（无锁读取）
    pub fn latest_telemetry(&self) -> Option<TelemetrySample> {
        self.shared.latest.load().as_deref().copied()
    }

    /// 距最近一块下行数据到达的时间（诊断用途）
    pub fn time_since_last_frame(&self) -> Duration {
        self.shared.monitor.time_since_last_frame()
    }

    /// 当前自动重连计数
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.reconnect_attempts.load(Ordering::Acquire)
    }

    /// 链路配置
    pub fn config(&self) -> &LinkConfig {
        &self.shared.config
    }
}

impl Drop for HoverLink {
    fn drop(&mut self) {
        // 断开会递增纪元，任何挂起的延迟重连随之作废
        self.shared.disconnect();
    }
}

//! 集成测试公共设施：脚本化的传输 factory 与事件断言辅助

use crossbeam_channel::Receiver;
use hover_link::{LinkConfig, LinkEvent, TransportFactory, TransportPair};
use hover_serial::{
    MockHandle, MockRead, MockSerial, SerialDeviceError, SerialDeviceErrorKind, SerialError,
    SplittableTransport,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 按顺序派发预置 mock 会话的传输 factory
///
/// 每次 `open()` 弹出一个预置会话；脚本耗尽后开始报 NoDevice。
/// 克隆共享同一内部状态，测试侧保留一个克隆用于检查 open 次数。
#[derive(Clone)]
pub struct ScriptedFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    sessions: Mutex<VecDeque<MockSerial>>,
    opens: AtomicUsize,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                sessions: Mutex::new(VecDeque::new()),
                opens: AtomicUsize::new(0),
            }),
        }
    }

    /// 预置一个会话的读取脚本，返回其测试句柄
    pub fn add_session(&self, script: Vec<MockRead>) -> MockHandle {
        let (mock, handle) = MockSerial::with_script(script);
        self.inner.sessions.lock().unwrap().push_back(mock);
        handle
    }

    /// 至今 open 被调用的次数
    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::Acquire)
    }
}

impl TransportFactory for ScriptedFactory {
    fn open(&self, _config: &LinkConfig) -> Result<TransportPair, SerialError> {
        self.inner.opens.fetch_add(1, Ordering::AcqRel);
        let mock = self.inner.sessions.lock().unwrap().pop_front().ok_or_else(|| {
            SerialError::Device(SerialDeviceError::new(
                SerialDeviceErrorKind::NoDevice,
                "scripted sessions exhausted",
            ))
        })?;
        let (rx, tx) = mock.split()?;
        Ok((Box::new(rx), Box::new(tx)))
    }
}

/// 测试用配置：短超时、短重连延迟
pub fn test_config() -> LinkConfig {
    LinkConfig {
        read_timeout_ms: 5,
        reconnect_delay_ms: 15,
        ..LinkConfig::default()
    }
}

/// 接收下一个事件，超时即 panic
pub fn next_event(rx: &Receiver<LinkEvent>) -> LinkEvent {
    rx.recv_timeout(Duration::from_secs(2)).expect("expected an event within 2s")
}

/// 持续接收直到谓词命中，返回命中的事件；超时即 panic
pub fn wait_for(rx: &Receiver<LinkEvent>, pred: impl Fn(&LinkEvent) -> bool) -> LinkEvent {
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    loop {
        let remaining = deadline
            .checked_duration_since(std::time::Instant::now())
            .expect("expected matching event within 2s");
        let event = rx.recv_timeout(remaining).expect("expected matching event within 2s");
        if pred(&event) {
            return event;
        }
    }
}

//! 链路状态与遥测缓冲

use hover_protocol::TelemetrySample;
use std::collections::VecDeque;
use std::fmt;

/// 链路连接状态
///
/// 全进程只有一份实例，由链路状态机独占修改。
/// 不变量：只有 `Connected` 状态下才允许对传输做读写。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkState {
    /// 初始状态，也是每次断开后的终态
    Disconnected,
    /// 正在获取/打开传输
    Connecting,
    /// 传输已打开，读取线程在运行
    Connected,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
        };
        f.write_str(text)
    }
}

/// 遥测环形缓冲
///
/// 固定容量的 FIFO：写满后每次插入淘汰最旧的一条。
/// 不变量：`len() <= capacity()`。
///
/// 缓冲跨连接会话保留（重连不清空历史），与展示层的时间轴语义一致。
#[derive(Debug)]
pub struct TelemetryBuffer {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl TelemetryBuffer {
    /// 创建缓冲；容量至少为 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 插入一条样本，必要时淘汰最旧的一条
    pub fn push(&mut self, sample: TelemetrySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 最新的一条样本
    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    /// 按到达顺序拷贝当前全部样本
    pub fn snapshot(&self) -> Vec<TelemetrySample> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: u64) -> TelemetrySample {
        TelemetrySample::new(i, i as f64)
    }

    #[test]
    fn test_link_state_display() {
        assert_eq!(LinkState::Disconnected.to_string(), "disconnected");
        assert_eq!(LinkState::Connecting.to_string(), "connecting");
        assert_eq!(LinkState::Connected.to_string(), "connected");
    }

    #[test]
    fn test_buffer_push_and_snapshot() {
        let mut buffer = TelemetryBuffer::new(50);
        buffer.push(sample(1));
        buffer.push(sample(2));
        assert_eq!(buffer.len(), 2);
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot[0].timestamp_us, 1);
        assert_eq!(snapshot[1].timestamp_us, 2);
        assert_eq!(buffer.latest().unwrap().timestamp_us, 2);
    }

    #[test]
    fn test_buffer_never_exceeds_capacity() {
        // 插入 N + k 条后，缓冲里是最后 N 条（到达顺序）
        let mut buffer = TelemetryBuffer::new(3);
        for i in 0..8 {
            buffer.push(sample(i));
            assert!(buffer.len() <= 3);
        }
        let timestamps: Vec<u64> = buffer.snapshot().iter().map(|s| s.timestamp_us).collect();
        assert_eq!(timestamps, vec![5, 6, 7]);
    }

    #[test]
    fn test_buffer_zero_capacity_clamped() {
        let mut buffer = TelemetryBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(sample(1));
        buffer.push(sample(2));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().timestamp_us, 2);
    }

    #[test]
    fn test_buffer_empty() {
        let buffer = TelemetryBuffer::new(4);
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
        assert!(buffer.snapshot().is_empty());
    }
}

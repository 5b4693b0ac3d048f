//! Mock 传输（无硬件依赖）
//!
//! 读方向按预置脚本逐步回放，写方向记录全部写入字节，
//! 供测试注入故障并检查线路输出。

use crate::{RxTransport, SerialError, SplittableTransport, TxTransport};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 一步读取脚本
#[derive(Debug)]
pub enum MockRead {
    /// 返回一块字节
    Chunk(Vec<u8>),
    /// 返回一次超时
    Timeout,
    /// 流结束
    Eof,
    /// IO 故障
    Error,
}

struct MockState {
    reads: Mutex<VecDeque<MockRead>>,
    written: Mutex<Vec<u8>>,
    fail_next_write: AtomicBool,
    fail_flush: AtomicBool,
}

/// Mock 传输本体，可经 [`SplittableTransport`] 分离为读写半部
pub struct MockSerial {
    state: Arc<MockState>,
}

/// 测试侧句柄：注入脚本、检查写入
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

pub struct MockRx {
    state: Arc<MockState>,
}

pub struct MockTx {
    state: Arc<MockState>,
}

impl MockSerial {
    pub fn new() -> (Self, MockHandle) {
        let state = Arc::new(MockState {
            reads: Mutex::new(VecDeque::new()),
            written: Mutex::new(Vec::new()),
            fail_next_write: AtomicBool::new(false),
            fail_flush: AtomicBool::new(false),
        });
        (
            Self {
                state: Arc::clone(&state),
            },
            MockHandle { state },
        )
    }

    /// 构造时直接带上读取脚本
    pub fn with_script(script: impl IntoIterator<Item = MockRead>) -> (Self, MockHandle) {
        let (mock, handle) = Self::new();
        for step in script {
            handle.push_read(step);
        }
        (mock, handle)
    }
}

impl MockHandle {
    /// 追加一步读取脚本
    pub fn push_read(&self, step: MockRead) {
        self.state.reads.lock().unwrap().push_back(step);
    }

    /// 追加一块下行字节
    pub fn push_chunk(&self, bytes: &[u8]) {
        self.push_read(MockRead::Chunk(bytes.to_vec()));
    }

    /// 取目前为止写入的全部字节
    pub fn written(&self) -> Vec<u8> {
        self.state.written.lock().unwrap().clone()
    }

    /// 让下一次写入失败
    pub fn fail_next_write(&self) {
        self.state.fail_next_write.store(true, Ordering::Release);
    }

    /// 让所有 flush 调用失败
    pub fn fail_flush(&self) {
        self.state.fail_flush.store(true, Ordering::Release);
    }
}

impl SplittableTransport for MockSerial {
    type Rx = MockRx;
    type Tx = MockTx;

    fn split(self) -> Result<(Self::Rx, Self::Tx), SerialError> {
        let rx = MockRx {
            state: Arc::clone(&self.state),
        };
        let tx = MockTx { state: self.state };
        Ok((rx, tx))
    }
}

impl RxTransport for MockRx {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let step = self.state.reads.lock().unwrap().pop_front();
        match step {
            Some(MockRead::Chunk(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                // 超过 buf 的部分放回队首
                if n < bytes.len() {
                    self.state
                        .reads
                        .lock()
                        .unwrap()
                        .push_front(MockRead::Chunk(bytes[n..].to_vec()));
                }
                Ok(n)
            },
            Some(MockRead::Timeout) | None => {
                // 模拟真实端口的阻塞窗口，避免测试中忙等
                std::thread::sleep(Duration::from_millis(1));
                Err(SerialError::Timeout)
            },
            Some(MockRead::Eof) => Err(SerialError::Closed),
            Some(MockRead::Error) => {
                Err(SerialError::Io(io::Error::other("injected read failure")))
            },
        }
    }
}

impl TxTransport for MockTx {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        if self.state.fail_next_write.swap(false, Ordering::AcqRel) {
            return Err(SerialError::Io(io::Error::other("injected write failure")));
        }
        self.state.written.lock().unwrap().extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        if self.state.fail_flush.load(Ordering::Acquire) {
            return Err(SerialError::Io(io::Error::other("injected flush failure")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_in_order() {
        let (mock, handle) = MockSerial::new();
        handle.push_chunk(b"abc");
        handle.push_read(MockRead::Timeout);
        handle.push_read(MockRead::Eof);
        let (mut rx, _tx) = mock.split().unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(rx.read_chunk(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert!(matches!(rx.read_chunk(&mut buf), Err(SerialError::Timeout)));
        assert!(matches!(rx.read_chunk(&mut buf), Err(SerialError::Closed)));
    }

    #[test]
    fn test_empty_script_times_out() {
        let (mock, _handle) = MockSerial::new();
        let (mut rx, _tx) = mock.split().unwrap();
        let mut buf = [0u8; 8];
        assert!(matches!(rx.read_chunk(&mut buf), Err(SerialError::Timeout)));
    }

    #[test]
    fn test_oversized_chunk_is_requeued() {
        let (mock, handle) = MockSerial::new();
        handle.push_chunk(b"hello world");
        let (mut rx, _tx) = mock.split().unwrap();

        let mut buf = [0u8; 5];
        assert_eq!(rx.read_chunk(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(rx.read_chunk(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b" worl");
        assert_eq!(rx.read_chunk(&mut buf).unwrap(), 1);
        assert_eq!(&buf[..1], b"d");
    }

    #[test]
    fn test_written_bytes_recorded() {
        let (mock, handle) = MockSerial::new();
        let (_rx, mut tx) = mock.split().unwrap();
        tx.write_all(b"SETPOINT:50\n").unwrap();
        assert_eq!(handle.written(), b"SETPOINT:50\n");
    }

    #[test]
    fn test_injected_write_failure_is_one_shot() {
        let (mock, handle) = MockSerial::new();
        let (_rx, mut tx) = mock.split().unwrap();
        handle.fail_next_write();
        assert!(tx.write_all(b"x").is_err());
        assert!(tx.write_all(b"y").is_ok());
        assert_eq!(handle.written(), b"y");
    }
}

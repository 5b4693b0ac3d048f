//! 传输获取
//!
//! 端口枚举与选择属于环境协作方的职责，链路层只要求"尝试获取一个
//! 已分离读写半部的传输，且失败可被发现"。[`TransportFactory`] 把这
//! 一步抽象出来，测试可以注入脚本化的 mock 传输。

use crate::config::LinkConfig;
use hover_serial::{
    RxTransport, SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialPortTransport,
    SplittableTransport, TxTransport, available_ports,
};
use tracing::info;

/// 已装箱的读写半部
pub type TransportPair = (Box<dyn RxTransport + Send>, Box<dyn TxTransport + Send>);

/// 传输获取接口
///
/// 每次 `connect()` 调用一次；返回的两个半部归链路状态机独占，
/// 断开时随会话一起释放。
pub trait TransportFactory: Send + Sync {
    fn open(&self, config: &LinkConfig) -> Result<TransportPair, SerialError>;
}

/// 默认实现：打开指定串口，未指定时用系统枚举到的第一个
pub struct SerialFactory {
    port: Option<String>,
}

impl SerialFactory {
    pub fn new(port: Option<String>) -> Self {
        Self { port }
    }
}

impl TransportFactory for SerialFactory {
    fn open(&self, config: &LinkConfig) -> Result<TransportPair, SerialError> {
        let path = match &self.port {
            Some(path) => path.clone(),
            None => available_ports()?.into_iter().next().ok_or_else(|| {
                SerialError::Device(SerialDeviceError::new(
                    SerialDeviceErrorKind::NoDevice,
                    "no serial ports available",
                ))
            })?,
        };

        let transport = SerialPortTransport::open(&path, &config.serial_settings())?;
        info!("Acquired serial transport on {}", path);
        let (rx, tx) = transport.split()?;
        Ok((Box::new(rx), Box::new(tx)))
    }
}

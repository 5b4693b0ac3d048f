//! serialport 后端适配器
//!
//! 基于 [`serialport`] crate 的真实串口实现。端口以固定参数打开
//! （8 数据位，无校验，1 停止位，无流控），读半部带超时，
//! 通过 `try_clone` 分离出独立的读写半部。

use crate::{
    RxTransport, SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialSettings,
    SplittableTransport, TxTransport,
};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use tracing::debug;

/// 枚举系统中可用的串口设备路径
pub fn available_ports() -> Result<Vec<String>, SerialError> {
    let ports = serialport::available_ports()
        .map_err(|e| SerialError::Device(map_serialport_error(&e)))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

fn map_serialport_error(e: &serialport::Error) -> SerialDeviceError {
    let kind = match e.kind() {
        serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NoDevice,
        serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::UnsupportedConfig,
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            SerialDeviceErrorKind::AccessDenied
        },
        serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => SerialDeviceErrorKind::NotFound,
        _ => SerialDeviceErrorKind::Unknown,
    };
    SerialDeviceError::new(kind, e.to_string())
}

/// 基于 serialport 的传输实现
pub struct SerialPortTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialPortTransport {
    /// 按固定帧格式打开串口
    ///
    /// # 错误
    /// - `SerialError::Device`: 端口不存在、被占用或权限不足
    pub fn open(path: &str, settings: &SerialSettings) -> Result<Self, SerialError> {
        let port = serialport::new(path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|e| SerialError::Device(map_serialport_error(&e)))?;

        debug!(
            "Opened serial port {} at {} baud (8N1, no flow control)",
            path, settings.baud_rate
        );

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl RxTransport for SerialPortTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.read(buf) {
            // 部分平台在设备消失时返回 0 字节而不是错误
            Ok(0) => Err(SerialError::Closed),
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(SerialError::Timeout),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(SerialError::Closed),
            Err(e) => Err(SerialError::Io(e)),
        }
    }
}

impl TxTransport for SerialPortTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        Write::write_all(&mut self.port, bytes).map_err(SerialError::Io)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        Write::flush(&mut self.port).map_err(SerialError::Io)
    }
}

impl SplittableTransport for SerialPortTransport {
    type Rx = SerialPortTransport;
    type Tx = SerialPortTransport;

    /// 通过 `try_clone` 分离读写半部
    ///
    /// 两个半部引用同一个底层文件描述符；全部 drop 后端口关闭。
    fn split(self) -> Result<(Self::Rx, Self::Tx), SerialError> {
        let rx_port = self
            .port
            .try_clone()
            .map_err(|e| SerialError::Device(map_serialport_error(&e)))?;
        let rx = SerialPortTransport {
            port: rx_port,
            path: self.path.clone(),
        };
        Ok((rx, self))
    }
}

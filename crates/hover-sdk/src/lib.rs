//! # Hover SDK
//!
//! 悬停车链路的统一入口，重新导出各层常用类型：
//!
//! - [`hover_protocol`]: 线路协议（命令编码、行分帧、遥测分类）
//! - [`hover_serial`]: 串口传输抽象
//! - [`hover_link`]: 链路生命周期管理（状态机、读取线程、重连）
//!
//! # Example
//!
//! ```no_run
//! use hover_sdk::{HoverLinkBuilder, LinkEvent};
//!
//! hover_sdk::init_logging();
//!
//! let link = HoverLinkBuilder::new().port("/dev/ttyUSB0").build();
//! link.connect()?;
//! for event in link.events().iter() {
//!     match event {
//!         LinkEvent::Telemetry(sample) => println!("height: {} cm", sample.height_cm),
//!         LinkEvent::Diagnostic(text) => eprintln!("device: {text}"),
//!         _ => {},
//!     }
//! }
//! # Ok::<(), hover_sdk::LinkError>(())
//! ```

pub use hover_link::{
    ConnectionMonitor, HoverLink, HoverLinkBuilder, LinkConfig, LinkError, LinkEvent, LinkState,
    SerialFactory, TelemetryBuffer, TransportFactory, TransportPair,
};
pub use hover_protocol::{
    DeviceMessage, HoverCommand, LineDecoder, ProtocolError, SETPOINT_MAX_CM, SETPOINT_MIN_CM,
    TelemetrySample, classify,
};
pub use hover_serial::{
    DEFAULT_BAUD_RATE, RxTransport, SerialDeviceError, SerialDeviceErrorKind, SerialError,
    SerialPortTransport, SerialSettings, SplittableTransport, TxTransport, available_ports,
};

/// 初始化 tracing 日志
///
/// - 按 `RUST_LOG` 环境变量过滤，未设置时默认 `info`；
/// - 桥接 `log` 宏产生的记录（依赖库可能使用 `log`）；
/// - 重复调用是安全的空操作。
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

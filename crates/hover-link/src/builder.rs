//! Builder 模式实现
//!
//! 提供链式构造 [`HoverLink`] 实例的便捷方式。构造不建立连接，
//! 初始状态始终是 `Disconnected`，连接由用户显式触发。

use crate::config::LinkConfig;
use crate::factory::{SerialFactory, TransportFactory};
use crate::hover::HoverLink;

/// HoverLink Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use hover_link::{HoverLinkBuilder, LinkConfig};
///
/// // 使用默认配置，自动选择第一个可用串口
/// let link = HoverLinkBuilder::new().build();
///
/// // 指定端口与自定义重连策略
/// let config = LinkConfig {
///     reconnect_delay_ms: 1_000,
///     ..LinkConfig::default()
/// };
/// let link = HoverLinkBuilder::new()
///     .port("/dev/ttyUSB0")
///     .config(config)
///     .build();
/// ```
pub struct HoverLinkBuilder {
    /// 串口设备路径；`None` 时用系统枚举到的第一个
    port: Option<String>,
    config: LinkConfig,
    /// 自定义传输获取（测试注入 mock 用）；设置后 `port` 被忽略
    factory: Option<Box<dyn TransportFactory>>,
}

impl HoverLinkBuilder {
    pub fn new() -> Self {
        Self {
            port: None,
            config: LinkConfig::default(),
            factory: None,
        }
    }

    /// 指定串口设备路径（如 "/dev/ttyUSB0"、"COM3"）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 设置链路配置
    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// 注入自定义传输获取实现
    pub fn transport_factory(mut self, factory: Box<dyn TransportFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// 构建 HoverLink 实例（不建立连接）
    pub fn build(self) -> HoverLink {
        let factory = self
            .factory
            .unwrap_or_else(|| Box::new(SerialFactory::new(self.port)));
        HoverLink::new(self.config, factory)
    }
}

impl Default for HoverLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

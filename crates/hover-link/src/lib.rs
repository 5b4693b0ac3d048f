//! 链路管理层模块
//!
//! 本模块提供悬停车链路的生命周期管理，包括：
//! - 连接状态机（Disconnected → Connecting → Connected）
//! - 后台读取线程（行分帧 + 遥测/诊断分类分发）
//! - 意外丢失后的有界自动重连（固定延迟，次数上限）
//! - 遥测环形缓冲与最新样本的无锁快照
//! - 面向展示层协作方的事件 channel
//!
//! # 使用场景
//!
//! 这是大多数用户应该使用的层。展示层只需消费
//! [`LinkEvent`] 并在用户操作时调用
//! [`connect`](HoverLink::connect) / [`disconnect`](HoverLink::disconnect) /
//! [`send`](HoverLink::send)。需要直接操作传输的场景见
//! [`hover_serial`]。

mod builder;
pub mod config;
mod error;
pub mod events;
pub mod factory;
mod hover;
pub mod monitor;
mod pipeline;
pub mod state;

pub use builder::HoverLinkBuilder;
pub use config::LinkConfig;
pub use error::LinkError;
pub use events::LinkEvent;
pub use factory::{SerialFactory, TransportFactory, TransportPair};
pub use hover::HoverLink;
pub use monitor::ConnectionMonitor;
pub use state::{LinkState, TelemetryBuffer};

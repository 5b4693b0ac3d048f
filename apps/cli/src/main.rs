//! # Hover CLI
//!
//! 悬停车链路的命令行工具（展示层协作方的最小实现）。
//!
//! ```bash
//! # 列出可用串口
//! hover-cli ports
//!
//! # 实时监控遥测（Ctrl+C 退出）
//! hover-cli monitor --port /dev/ttyUSB0
//!
//! # 发送目标高度（内部：连接 -> 发送 -> 断开）
//! hover-cli setpoint 42.5 --port /dev/ttyUSB0
//!
//! # 发送 PID 增益
//! hover-cli pid 1.2 0.4 0.05 --port /dev/ttyUSB0
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use hover_sdk::{HoverCommand, HoverLink, HoverLinkBuilder, LinkEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Hover CLI - 悬停车链路命令行工具
#[derive(Parser, Debug)]
#[command(name = "hover-cli")]
#[command(about = "Command-line interface for the Hover vehicle serial link", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 列出可用串口
    Ports,

    /// 连接并实时打印遥测与诊断输出
    Monitor {
        /// 串口设备路径（缺省用第一个可用端口）
        #[arg(short, long)]
        port: Option<String>,

        /// 以 JSON 行输出遥测样本
        #[arg(long)]
        json: bool,
    },

    /// 发送目标高度（0-100 cm）
    Setpoint {
        /// 目标高度（cm）
        height_cm: f64,

        /// 串口设备路径（缺省用第一个可用端口）
        #[arg(short, long)]
        port: Option<String>,
    },

    /// 发送 PID 增益
    Pid {
        kp: f64,
        ki: f64,
        kd: f64,

        /// 串口设备路径（缺省用第一个可用端口）
        #[arg(short, long)]
        port: Option<String>,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    hover_sdk::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ports => cmd_ports(),
        Commands::Monitor { port, json } => cmd_monitor(port, json),
        Commands::Setpoint { height_cm, port } => {
            cmd_send(port, HoverCommand::Setpoint { height_cm })
        },
        Commands::Pid { kp, ki, kd, port } => cmd_send(port, HoverCommand::PidGains { kp, ki, kd }),
    }
}

fn build_link(port: Option<String>) -> HoverLink {
    let mut builder = HoverLinkBuilder::new();
    if let Some(port) = port {
        builder = builder.port(port);
    }
    builder.build()
}

fn cmd_ports() -> Result<()> {
    let ports = hover_sdk::available_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn cmd_monitor(port: Option<String>, json: bool) -> Result<()> {
    let link = build_link(port);
    link.connect().context("Failed to connect to the vehicle")?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::Release);
    })
    .context("Failed to install Ctrl+C handler")?;

    while !stop.load(Ordering::Acquire) {
        match link.events().recv_timeout(Duration::from_millis(200)) {
            Ok(LinkEvent::Telemetry(sample)) => {
                if json {
                    println!("{}", serde_json::to_string(&sample)?);
                } else {
                    println!("{:>14} us  {:8.1} cm", sample.timestamp_us, sample.height_cm);
                }
            },
            Ok(LinkEvent::Diagnostic(text)) => eprintln!("[device] {text}"),
            Ok(LinkEvent::StateChanged(state)) => eprintln!("[link] {state}"),
            Ok(LinkEvent::ReconnectExhausted) => {
                eprintln!("[link] automatic reconnect attempts exhausted, exiting");
                break;
            },
            Ok(LinkEvent::CommandResult { .. }) => {},
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    link.disconnect();
    Ok(())
}

fn cmd_send(port: Option<String>, command: HoverCommand) -> Result<()> {
    let link = build_link(port);
    link.connect().context("Failed to connect to the vehicle")?;
    let result = link.send(&command).context("Failed to send command");
    link.disconnect();
    result?;
    println!("OK");
    Ok(())
}

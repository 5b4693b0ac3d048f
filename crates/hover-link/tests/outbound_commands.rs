//! 上行命令路径集成测试
//!
//! 检查发送门禁、参数校验与线路字节，以及写故障触发的丢失恢复。

mod common;

use common::{ScriptedFactory, test_config, wait_for};
use hover_link::{HoverLinkBuilder, LinkError, LinkEvent, LinkState};
use hover_serial::MockRead;
use std::time::Duration;

fn connected_link(factory: &ScriptedFactory) -> hover_link::HoverLink {
    let link = HoverLinkBuilder::new()
        .config(test_config())
        .transport_factory(Box::new(factory.clone()))
        .build();
    link.connect().unwrap();
    link
}

#[test]
fn test_setpoint_produces_exact_wire_bytes() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    link.send_setpoint(50.0).unwrap();
    assert_eq!(handle.written(), b"SETPOINT:50\n");

    let event = wait_for(link.events(), |e| matches!(e, LinkEvent::CommandResult { .. }));
    assert_eq!(
        event,
        LinkEvent::CommandResult {
            accepted: true,
            reason: None
        }
    );
}

#[test]
fn test_fractional_setpoint_formatting() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    link.send_setpoint(12.5).unwrap();
    assert_eq!(handle.written(), b"SETPOINT:12.5\n");
}

#[test]
fn test_out_of_range_setpoint_never_reaches_transport() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    let err = link.send_setpoint(150.0).unwrap_err();
    assert!(matches!(err, LinkError::Validation(_)));
    assert!(handle.written().is_empty(), "rejected command must not touch the transport");

    let event = wait_for(link.events(), |e| matches!(e, LinkEvent::CommandResult { .. }));
    match event {
        LinkEvent::CommandResult {
            accepted: false,
            reason: Some(reason),
        } => assert!(reason.contains("out of range"), "reason: {reason}"),
        other => panic!("Expected rejection, got {other:?}"),
    }

    // 校验失败不影响连接状态
    assert_eq!(link.state(), LinkState::Connected);
}

#[test]
fn test_pid_gains_produce_exact_wire_bytes() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    link.send_pid_gains(1.5, 0.5, 0.25).unwrap();
    assert_eq!(handle.written(), b"PID:1.5,0.5,0.25\n");
}

#[test]
fn test_non_finite_pid_gains_rejected() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    let err = link.send_pid_gains(1.0, f64::NAN, 0.0).unwrap_err();
    assert!(matches!(err, LinkError::Validation(_)));
    assert!(handle.written().is_empty());
}

#[test]
fn test_consecutive_commands_append_on_wire() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    link.send_setpoint(30.0).unwrap();
    link.send_pid_gains(2.0, 0.1, 0.5).unwrap();
    assert_eq!(handle.written(), b"SETPOINT:30\nPID:2,0.1,0.5\n");
}

#[test]
fn test_write_failure_takes_loss_path() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    factory.add_session(vec![]); // 自动重连的会话
    let link = connected_link(&factory);

    handle.fail_next_write();
    let err = link.send_setpoint(20.0).unwrap_err();
    assert!(matches!(err, LinkError::Io(_)));

    // 写故障与读故障同等对待：断开 + 按策略自动重连
    wait_for(link.events(), |e| {
        matches!(e, LinkEvent::StateChanged(LinkState::Disconnected))
    });
    wait_for(link.events(), |e| {
        matches!(e, LinkEvent::StateChanged(LinkState::Connected))
    });
    assert_eq!(factory.opens(), 2);
    assert_eq!(link.reconnect_attempts(), 1);
}

#[test]
fn test_send_after_manual_disconnect_rejected_without_io() {
    let factory = ScriptedFactory::new();
    let handle = factory.add_session(vec![]);
    let link = connected_link(&factory);

    link.disconnect();
    let err = link.send_setpoint(10.0).unwrap_err();
    assert!(matches!(err, LinkError::NotConnected));
    assert!(handle.written().is_empty());

    // 拒绝不会触发自动重连
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(factory.opens(), 1);
    assert_eq!(link.state(), LinkState::Disconnected);
}

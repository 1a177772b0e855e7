//! 会话层集成测试
//!
//! 使用 Mock 串口后端验证连接回落、命令执行、中断与断开流程，不需要硬件。

use n9_driver::{
    ConnectionState, DriverError, ExecOptions, Pose, ReadConfig, Session, SessionConfig,
    TeleopConsole, VaOverride,
};
use n9_protocol::{AxisId, ProtocolError};
use n9_serial::{MockConnector, MockSerialAdapter};

/// 无等待的测试配置
fn test_config(home_on_connect: bool) -> SessionConfig {
    SessionConfig {
        connect_retry_delay_ms: 0,
        home_on_connect,
        read: ReadConfig {
            max_attempts: 3,
            poll_interval_ms: 0,
            home_max_attempts: 3,
        },
        ..SessionConfig::default()
    }
}

fn connected(adapter: &MockSerialAdapter, home_on_connect: bool) -> Session {
    let session = Session::open(
        test_config(home_on_connect),
        MockConnector::new(adapter.clone()),
    )
    .expect("open should succeed");
    adapter.clear_sent();
    session
}

#[test]
fn test_unreachable_port_falls_back_to_offline() {
    let connector = MockConnector::unreachable();
    let handle = connector.clone();
    let adapter = connector.adapter();

    let mut session = Session::open(test_config(true), connector).unwrap();

    // 3 次预算只尝试 2 次
    assert_eq!(handle.attempts(), 2);
    assert!(session.is_offline());
    assert_eq!(session.state(), ConnectionState::Offline);

    let response = session.execute("echo", &[], ExecOptions::validated()).unwrap();
    assert_eq!(response, "<ECHO>");
    assert_eq!(adapter.write_count(), 0);
}

#[test]
fn test_offline_position_returns_tracked_pose() {
    let mut session = Session::offline(test_config(true));
    session.record_motion([(AxisId::Elbow, 2550)]);

    let pose = session.position().unwrap();
    assert_eq!(pose.get(AxisId::Elbow), Some(2550));
    assert_eq!(pose.get(AxisId::Shoulder), Some(0));
}

#[test]
fn test_open_homes_when_configured() {
    let adapter = MockSerialAdapter::echo();
    let session = Session::open(test_config(true), MockConnector::new(adapter.clone())).unwrap();

    assert_eq!(session.state(), ConnectionState::ConnectedHomed);
    assert_eq!(adapter.sent_payloads(), vec!["HOME"]);
    assert_eq!(session.pose(), &Pose::zeroed());
}

#[test]
fn test_open_without_home() {
    let adapter = MockSerialAdapter::echo();
    let session = Session::open(test_config(false), MockConnector::new(adapter.clone())).unwrap();

    assert_eq!(session.state(), ConnectionState::ConnectedUnhomed);
    assert_eq!(adapter.write_count(), 0);
}

#[test]
fn test_silent_controller_reports_no_response() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);

    let err = session.execute("echo", &[], ExecOptions::default()).unwrap_err();
    match err {
        DriverError::NoResponse { command, attempts } => {
            assert_eq!(command, "ECHO");
            assert_eq!(attempts, 3);
        },
        other => panic!("Expected NoResponse, got {:?}", other),
    }
    assert_eq!(adapter.sent_frames(), vec!["<ECHO\r"]);
}

#[test]
fn test_echo_mismatch_fails_validation() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);
    adapter.queue_response("<ECH>\r");

    let err = session.execute("echo", &[], ExecOptions::validated()).unwrap_err();
    match err {
        DriverError::FailedExecution { sent, received } => {
            assert_eq!(sent, "ECHO");
            assert_eq!(received, "<ECH>");
        },
        other => panic!("Expected FailedExecution, got {:?}", other),
    }
}

#[test]
fn test_unvalidated_response_is_returned_verbatim() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);
    adapter.queue_response("<17>\r");

    let response = session.execute("random", &[], ExecOptions::default()).unwrap();
    assert_eq!(response, "<17>");
}

#[test]
fn test_velocity_acceleration_appended() {
    let adapter = MockSerialAdapter::echo();
    let mut session = connected(&adapter, false);

    let response = session
        .execute(
            "movesync",
            &[1.0, 2.0, 2550.0, 4350.0],
            ExecOptions::validated(),
        )
        .unwrap();
    assert_eq!(
        response,
        "<MOSY V1[1] V2[2] V3[2550] V4[4350] V5[75000] V6[10000]>"
    );

    session
        .execute(
            "move",
            &[0.0, 5.0],
            ExecOptions::default().with_va(VaOverride::new(500.0, 1000.0)),
        )
        .unwrap();
    assert_eq!(
        adapter.sent_payloads().last().map(String::as_str),
        Some("MOAX V1[0] V2[5] V3[1000] V4[500]")
    );
}

#[test]
fn test_unknown_command_and_argument_mismatch() {
    let adapter = MockSerialAdapter::echo();
    let mut session = connected(&adapter, false);

    let err = session.execute("fly", &[], ExecOptions::default()).unwrap_err();
    assert!(err.is_unknown_command());

    let err = session.execute("output", &[3.0], ExecOptions::default()).unwrap_err();
    assert!(matches!(err, DriverError::ArgumentCountMismatch { .. }));
    assert_eq!(adapter.write_count(), 0);
}

#[test]
fn test_invalid_argument_is_never_sent() {
    let adapter = MockSerialAdapter::echo();
    let mut session = connected(&adapter, false);

    for bad in [f64::NAN, f64::INFINITY, -1e30] {
        let err = session
            .execute("move", &[2.0, bad], ExecOptions::default())
            .unwrap_err();
        assert!(
            matches!(
                err,
                DriverError::Protocol(ProtocolError::InvalidArgument { index: 2, .. })
            ),
            "{:?}",
            err
        );
    }
    assert_eq!(adapter.write_count(), 0);
}

#[test]
fn test_cancellation_homes_and_reports_cancelled() {
    let adapter = MockSerialAdapter::echo();
    let mut session = connected(&adapter, false);
    session.record_motion([(AxisId::Shoulder, 4350)]);

    session.cancel_token().cancel();
    let err = session
        .execute("move", &[2.0, 100.0], ExecOptions::default())
        .unwrap_err();

    assert!(matches!(err, DriverError::Cancelled));
    assert_eq!(adapter.sent_payloads(), vec!["HOME"]);
    assert_eq!(session.pose().get(AxisId::Shoulder), Some(0));

    // 中断只消费一次
    session.execute("echo", &[], ExecOptions::validated()).unwrap();
}

#[test]
fn test_step_cycle_decline_aborts() {
    let adapter = MockSerialAdapter::echo();
    let config = SessionConfig {
        step_cycle: true,
        ..test_config(false)
    };
    let mut session = Session::open(config, MockConnector::new(adapter.clone())).unwrap();
    session.set_confirmer(|command: &str, _payload: &str| command != "move");

    session.execute("echo", &[], ExecOptions::default()).unwrap();
    let err = session
        .execute("move", &[1.0, 10.0], ExecOptions::default())
        .unwrap_err();

    assert!(matches!(err, DriverError::Cancelled));
    assert_eq!(
        adapter.sent_payloads(),
        vec!["ECHO", "MOAX V1[1] V2[10] V3[75000] V4[10000]", "HOME"]
    );
}

#[test]
fn test_position_report_overwrites_pose() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);
    adapter.queue_response("<P0:0,P1:100,P2:100,P3:10,>\r");

    let pose = session.position().unwrap();
    assert_eq!(pose.get(AxisId::Gripper), Some(0));
    assert_eq!(pose.get(AxisId::Elbow), Some(100));
    assert_eq!(pose.get(AxisId::Shoulder), Some(100));
    assert_eq!(pose.get(AxisId::Lift), Some(10));
    assert_eq!(session.pose(), &pose);
}

#[test]
fn test_disconnect_rough_homes_then_closes() {
    let adapter = MockSerialAdapter::echo();
    let session = connected(&adapter, true);

    session.disconnect(true).unwrap();
    assert_eq!(
        adapter.sent_payloads(),
        vec![
            "MOSY V1[0] V2[3] V3[0] V4[10] V5[150000] V6[10000]",
            "MOSY V1[1] V2[2] V3[100] V4[100] V5[150000] V6[10000]",
        ]
    );
    assert!(adapter.is_closed());
}

#[test]
fn test_disconnect_closes_even_when_rough_home_fails() {
    let adapter = MockSerialAdapter::echo();
    let session = connected(&adapter, true);
    adapter.queue_response("");

    let err = session.disconnect(true).unwrap_err();
    assert!(matches!(err, DriverError::NoResponse { .. }));
    assert!(adapter.is_closed());
}

#[test]
fn test_disconnect_without_rough_home() {
    let adapter = MockSerialAdapter::echo();
    let session = connected(&adapter, true);

    session.disconnect(false).unwrap();
    assert_eq!(adapter.write_count(), 0);
    assert!(adapter.is_closed());
}

/// 脚本化的遥控终端
struct ScriptedConsole {
    keys: Vec<&'static str>,
    positions: Vec<Pose>,
    messages: Vec<String>,
}

impl ScriptedConsole {
    fn new(keys: &[&'static str]) -> Self {
        Self {
            keys: keys.iter().rev().copied().collect(),
            positions: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl TeleopConsole for ScriptedConsole {
    fn read_key(&mut self) -> Option<String> {
        self.keys.pop().map(str::to_string)
    }

    fn show_position(&mut self, pose: &Pose) {
        self.positions.push(pose.clone());
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[test]
fn test_keyboard_forwards_keys_and_tracks_reports() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);
    // KEYB 本身没有应答
    adapter.queue_response("");
    adapter.queue_response("<P0:0,P1:110,P2:0,P3:0,>\r");

    let mut console = ScriptedConsole::new(&["w", "k", "/"]);
    session.keyboard(&mut console).unwrap();

    assert_eq!(adapter.sent_frames(), vec!["<KEYB\r", "k", "/"]);
    assert_eq!(console.positions.len(), 1);
    assert_eq!(session.pose().get(AxisId::Elbow), Some(110));
    assert!(console.messages.iter().any(|m| m.contains("Invalid input")));
}

#[test]
fn test_keyboard_exits_when_input_ends() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);

    let mut console = ScriptedConsole::new(&["help"]);
    session.keyboard(&mut console).unwrap();

    assert_eq!(adapter.sent_frames(), vec!["<KEYB\r", "/"]);
    assert!(console.positions.is_empty());
}

#[test]
fn test_keyboard_leaves_mode_when_report_missing() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);

    let mut console = ScriptedConsole::new(&["k", "/"]);
    let err = session.keyboard(&mut console).unwrap_err();

    assert!(matches!(err, DriverError::NoResponse { .. }), "{:?}", err);
    // 出错后仍然发送 '/'，控制器不会停留在键盘模式
    assert_eq!(adapter.sent_frames(), vec!["<KEYB\r", "k", "/"]);
}

#[test]
fn test_keyboard_reports_step_size() {
    let adapter = MockSerialAdapter::silent();
    let mut session = connected(&adapter, false);
    adapter.queue_response("");
    adapter.queue_response("<P0:0,P1:0,P2:0,P3:0,>\r");

    let mut console = ScriptedConsole::new(&["q", "/"]);
    session.keyboard(&mut console).unwrap();

    assert_eq!(adapter.sent_frames(), vec!["<KEYB\r", "q", "/"]);
    assert!(console.messages.iter().any(|m| m == "Step size: 1000 counts"));
}

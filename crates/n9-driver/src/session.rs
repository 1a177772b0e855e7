//! 会话生命周期：连接、回零、粗回零、断开
//!
//! 一个 `Session` 独占一个串口通道，同一时刻最多一条命令在途。
//! 命令执行见 `engine` 模块，键盘遥控见 `teleop` 模块。

use crate::cancel::{CancelToken, StepConfirmer};
use crate::config::SessionConfig;
use crate::engine::ExecOptions;
use crate::reader::read_response;
use crate::state::{ConnectionState, Pose};
use crate::DriverError;
use n9_protocol::{AxisId, build_payload, echo_frame, encode_frame, lookup, strip_terminator};
use n9_serial::{SerialAdapter, SerialConnector};
use tracing::{debug, error, info, warn};

/// 机械臂会话
pub struct Session {
    pub(crate) config: SessionConfig,
    connector: Option<Box<dyn SerialConnector>>,
    pub(crate) port: Option<Box<dyn SerialAdapter>>,
    pub(crate) state: ConnectionState,
    pub(crate) pose: Pose,
    pub(crate) cancel: CancelToken,
    pub(crate) confirmer: Option<Box<dyn StepConfirmer>>,
}

impl Session {
    /// 创建会话（尚未连接）
    pub fn new(config: SessionConfig, connector: impl SerialConnector + 'static) -> Self {
        Self {
            config,
            connector: Some(Box::new(connector)),
            port: None,
            state: ConnectionState::Connecting { attempt: 0 },
            pose: Pose::zeroed(),
            cancel: CancelToken::new(),
            confirmer: None,
        }
    }

    /// 创建离线会话（不打开任何串口）
    pub fn offline(mut config: SessionConfig) -> Self {
        config.offline = true;
        warn!("OFFLINE MODE IS ACTIVE");
        Self {
            config,
            connector: None,
            port: None,
            state: ConnectionState::Offline,
            pose: Pose::zeroed(),
            cancel: CancelToken::new(),
            confirmer: None,
        }
    }

    /// 创建会话并连接；连接成功且 `home_on_connect` 为真时立即回零
    ///
    /// 连接失败不会返回错误，而是回落到离线模式。
    pub fn open(
        config: SessionConfig,
        connector: impl SerialConnector + 'static,
    ) -> Result<Self, DriverError> {
        let attempts = config.connection_attempts;
        let home_on_connect = config.home_on_connect;
        let mut session = if config.offline {
            Session::offline(config)
        } else {
            Session::new(config, connector)
        };

        session.connect(attempts);
        if session.state.is_connected() && home_on_connect {
            session.home()?;
        }
        Ok(session)
    }

    /// 连接
    ///
    /// 实际尝试 `max_attempts - 1` 次，两次之间等待 `connect_retry_delay_ms`。
    /// 全部失败后切换到离线模式。
    pub fn connect(&mut self, max_attempts: u32) -> ConnectionState {
        if self.state.is_connected() || self.state == ConnectionState::Offline {
            debug!("connect() ignored in state {}", self.state.description());
            return self.state;
        }

        let tries = max_attempts.saturating_sub(1);
        let delay = self.config.connect_retry_delay();
        let mut last_error = None;

        if let Some(connector) = self.connector.as_mut() {
            info!("Connecting to the robot on {}", connector.describe());
            for attempt in 1..=tries {
                self.state = ConnectionState::Connecting { attempt };
                match connector.open() {
                    Ok(port) => {
                        info!("Connected to the robot on {}", port.name());
                        self.port = Some(port);
                        self.state = ConnectionState::ConnectedUnhomed;
                        return self.state;
                    },
                    Err(e) => {
                        warn!("Connection attempt {}/{} failed: {}", attempt, tries, e);
                        last_error = Some(e);
                        if attempt < tries {
                            spin_sleep::sleep(delay);
                        }
                    },
                }
            }
        }

        match last_error {
            Some(e) => warn!(
                "A connection could not be established with the robot. Communication error: {}",
                e
            ),
            None => warn!("A connection could not be established with the robot"),
        }
        warn!("OFFLINE MODE IS ACTIVE");
        self.config.offline = true;
        self.state = ConnectionState::Offline;
        self.state
    }

    /// 回零
    ///
    /// 发送 `HOME`，把主轴跟踪值清零，然后用长读取预算等待完成。
    pub fn home(&mut self) -> Result<String, DriverError> {
        let spec = lookup("home")?;
        let payload = build_payload(spec.wire_code, &[])?;
        info!("Homing the robot");
        self.pose.reset_primary();

        if self.is_offline() {
            return Ok(echo_frame(&payload));
        }

        let max_attempts = self.config.read.home_max_attempts;
        let buffer = self.transact(&payload, max_attempts)?;
        self.state = ConnectionState::ConnectedHomed;
        info!("Homing complete");
        Ok(strip_terminator(&buffer).to_string())
    }

    /// 粗回零
    ///
    /// 仅在 `home_on_connect` 为真时执行：先夹爪与升降轴，再肘与肩，
    /// 各用一条同步运动命令，并更新跟踪位置。
    pub fn rough_home(&mut self) -> Result<(), DriverError> {
        if !self.config.home_on_connect {
            debug!("Rough home skipped (home_on_connect disabled)");
            return Ok(());
        }

        info!("Rough homing the robot");
        let rough = self.config.rough_home;
        self.execute(
            "movesync",
            &[
                AxisId::Gripper.index() as f64,
                AxisId::Lift.index() as f64,
                rough.gripper as f64,
                rough.lift as f64,
                rough.acceleration,
                rough.velocity,
            ],
            ExecOptions::default(),
        )?;
        self.pose
            .apply([(AxisId::Gripper, rough.gripper), (AxisId::Lift, rough.lift)]);

        self.execute(
            "movesync",
            &[
                AxisId::Elbow.index() as f64,
                AxisId::Shoulder.index() as f64,
                rough.elbow as f64,
                rough.shoulder as f64,
                rough.acceleration,
                rough.velocity,
            ],
            ExecOptions::default(),
        )?;
        self.pose
            .apply([(AxisId::Elbow, rough.elbow), (AxisId::Shoulder, rough.shoulder)]);
        Ok(())
    }

    /// 断开
    ///
    /// `rough_home_first` 为真时先粗回零；无论粗回零是否成功，通道都会被关闭。
    pub fn disconnect(mut self, rough_home_first: bool) -> Result<(), DriverError> {
        let rough = if rough_home_first {
            self.rough_home()
        } else {
            Ok(())
        };
        let closed = self.release_port();
        self.state = ConnectionState::Disconnected;

        if let Err(e) = &rough {
            error!("Rough home before disconnect failed: {}", e);
        }
        rough?;
        closed
    }

    /// 当前连接状态
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// 是否处于离线模式
    pub fn is_offline(&self) -> bool {
        self.state == ConnectionState::Offline
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 当前跟踪位置
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// 运动命令发出后的乐观位置更新
    pub fn record_motion(&mut self, updates: impl IntoIterator<Item = (AxisId, i64)>) {
        self.pose.apply(updates);
    }

    /// 中断令牌（可交给信号处理器）
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 安装单步确认器
    pub fn set_confirmer(&mut self, confirmer: impl StepConfirmer + 'static) {
        self.confirmer = Some(Box::new(confirmer));
    }

    /// 已打开的通道
    pub(crate) fn port_mut(&mut self) -> Result<&mut Box<dyn SerialAdapter>, DriverError> {
        match self.state {
            ConnectionState::Disconnected => Err(DriverError::Disconnected),
            _ => self
                .port
                .as_mut()
                .ok_or(DriverError::Serial(n9_serial::SerialError::NotOpen)),
        }
    }

    /// 写入一帧并读取完整响应
    pub(crate) fn transact(
        &mut self,
        payload: &str,
        max_attempts: u32,
    ) -> Result<String, DriverError> {
        let poll_interval = self.config.read.poll_interval();
        let port = self.port_mut()?;
        port.write_all(&encode_frame(payload))?;
        read_response(&mut **port, payload, max_attempts, poll_interval)
    }

    fn release_port(&mut self) -> Result<(), DriverError> {
        if let Some(mut port) = self.port.take() {
            info!("Disconnecting from the robot");
            port.close()?;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.release_port() {
            error!("Failed to close the serial port: {}", e);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("pose", &self.pose)
            .field("port", &self.port.as_ref().map(|p| p.name().to_string()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use n9_serial::{MockConnector, MockSerialAdapter};

    fn fast_config() -> SessionConfig {
        SessionConfig {
            connect_retry_delay_ms: 0,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_connect_succeeds_after_retry() {
        let connector = MockConnector::failing_first(MockSerialAdapter::echo(), 1);
        let handle = connector.clone();
        let mut session = Session::new(fast_config(), connector);

        assert_eq!(session.connect(3), ConnectionState::ConnectedUnhomed);
        assert_eq!(handle.attempts(), 2);
    }

    #[test]
    fn test_connect_budget_of_one_never_opens() {
        let connector = MockConnector::new(MockSerialAdapter::echo());
        let handle = connector.clone();
        let mut session = Session::new(fast_config(), connector);

        assert_eq!(session.connect(1), ConnectionState::Offline);
        assert_eq!(handle.attempts(), 0);
    }

    #[test]
    fn test_home_resets_primary_axes() {
        let mut session = Session::new(fast_config(), MockConnector::new(MockSerialAdapter::echo()));
        session.connect(3);
        session.record_motion([(AxisId::Elbow, 500), (AxisId::Aux4, 7)]);

        assert_eq!(session.home().unwrap(), "<HOME>");
        assert_eq!(session.state(), ConnectionState::ConnectedHomed);
        assert_eq!(session.pose().get(AxisId::Elbow), Some(0));
        assert_eq!(session.pose().get(AxisId::Aux4), Some(7));
    }

    #[test]
    fn test_rough_home_skipped_without_home_on_connect() {
        let adapter = MockSerialAdapter::echo();
        let config = SessionConfig {
            home_on_connect: false,
            ..fast_config()
        };
        let mut session = Session::new(config, MockConnector::new(adapter.clone()));
        session.connect(3);

        session.rough_home().unwrap();
        assert_eq!(adapter.write_count(), 0);
    }

    #[test]
    fn test_drop_closes_port() {
        let adapter = MockSerialAdapter::echo();
        {
            let mut session = Session::new(fast_config(), MockConnector::new(adapter.clone()));
            session.connect(3);
            assert!(!adapter.is_closed());
        }
        assert!(adapter.is_closed());
    }
}

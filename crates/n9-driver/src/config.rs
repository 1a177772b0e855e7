//! 会话配置
//!
//! 所有运行参数都集中在 `SessionConfig` 中，构造会话时传入，运行期不再修改。
//! 单次调用的覆盖项通过 [`ExecOptions`](crate::ExecOptions) 显式传递。

use n9_serial::PortSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 速度/加速度默认值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityAcceleration {
    /// 速度（counts/s）
    pub velocity: f64,
    /// 加速度（counts/s²）
    pub acceleration: f64,
}

impl Default for VelocityAcceleration {
    fn default() -> Self {
        Self {
            velocity: 10_000.0,
            acceleration: 75_000.0,
        }
    }
}

/// 单次调用的速度/加速度覆盖
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VaOverride {
    pub velocity: Option<f64>,
    pub acceleration: Option<f64>,
}

impl VaOverride {
    /// 同时覆盖速度和加速度
    pub fn new(velocity: f64, acceleration: f64) -> Self {
        Self {
            velocity: Some(velocity),
            acceleration: Some(acceleration),
        }
    }

    /// 与默认值合并
    pub fn resolve(&self, defaults: VelocityAcceleration) -> VelocityAcceleration {
        VelocityAcceleration {
            velocity: self.velocity.unwrap_or(defaults.velocity),
            acceleration: self.acceleration.unwrap_or(defaults.acceleration),
        }
    }
}

/// 响应读取配置
///
/// 读取循环在没有待读字节时休眠 `poll_interval_ms` 后重试，
/// 空轮询累计达到上限即判定无响应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// 普通命令的最大空轮询次数
    pub max_attempts: u32,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 回零命令的最大空轮询次数（物理回零很慢）
    pub home_max_attempts: u32,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 500,
            poll_interval_ms: 10,
            home_max_attempts: 6_000,
        }
    }
}

impl ReadConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 粗回零配置
///
/// 断开前把各轴移到接近零点的位置，让下一次上电回零更快。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughHomeConfig {
    pub velocity: f64,
    pub acceleration: f64,
    /// 夹爪目标计数
    pub gripper: i64,
    /// 升降轴目标计数
    pub lift: i64,
    /// 肘关节目标计数
    pub elbow: i64,
    /// 肩关节目标计数
    pub shoulder: i64,
}

impl Default for RoughHomeConfig {
    fn default() -> Self {
        Self {
            velocity: 10_000.0,
            acceleration: 150_000.0,
            gripper: 0,
            lift: 10,
            elbow: 100,
            shoulder: 100,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 串口设备路径
    pub port: String,
    /// 波特率
    pub baud_rate: u32,
    /// 串口底层超时（毫秒）
    pub serial_timeout_ms: u64,
    /// 连接尝试预算（实际尝试 `connection_attempts - 1` 次）
    pub connection_attempts: u32,
    /// 两次连接尝试之间的间隔（毫秒）
    pub connect_retry_delay_ms: u64,
    /// 连接后是否回零（同时决定断开时是否粗回零）
    pub home_on_connect: bool,
    /// 强制离线模式（不打开任何串口）
    pub offline: bool,
    /// 单步模式：每条命令执行后等待操作员确认
    pub step_cycle: bool,
    /// 速度/加速度默认值
    pub motion: VelocityAcceleration,
    /// 响应读取配置
    pub read: ReadConfig,
    /// 粗回零配置
    pub rough_home: RoughHomeConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            serial_timeout_ms: 1_000,
            connection_attempts: 3,
            connect_retry_delay_ms: 1_000,
            home_on_connect: true,
            offline: false,
            step_cycle: false,
            motion: VelocityAcceleration::default(),
            read: ReadConfig::default(),
            rough_home: RoughHomeConfig::default(),
        }
    }
}

impl SessionConfig {
    /// 串口参数
    pub fn port_settings(&self) -> PortSettings {
        PortSettings {
            path: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.serial_timeout_ms),
        }
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }
}

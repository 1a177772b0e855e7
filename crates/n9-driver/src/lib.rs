//! # N9 Driver
//!
//! 会话层：连接生命周期与命令执行引擎。
//!
//! - 连接重试与离线回落（`Session::open` / `Session::connect`）
//! - 回零、粗回零、断开
//! - 命令执行：参数补齐、写帧、有界读取、回显校验、单步确认
//! - 操作员中断：命令粒度检查，中断后回零
//! - 键盘遥控模式
//!
//! ```rust,no_run
//! use n9_driver::{ExecOptions, Session, SessionConfig};
//! use n9_serial::SerialPortConnector;
//!
//! let config = SessionConfig::default();
//! let connector = SerialPortConnector::new(config.port_settings());
//! let mut session = Session::open(config, connector)?;
//! session.execute("echo", &[], ExecOptions::validated())?;
//! println!("{}", session.position()?);
//! session.disconnect(true)?;
//! # Ok::<(), n9_driver::DriverError>(())
//! ```

pub mod cancel;
pub mod config;
mod engine;
mod error;
mod reader;
mod session;
pub mod state;
pub mod teleop;

pub use cancel::{CancelToken, StepConfirmer};
pub use config::{ReadConfig, RoughHomeConfig, SessionConfig, VaOverride, VelocityAcceleration};
pub use engine::{ExecOptions, prepare_args};
pub use error::DriverError;
pub use session::Session;
pub use state::{ConnectionState, Pose};
pub use teleop::{JogTier, TELEOP_HELP, TeleopConsole, TeleopKey};

//! # N9 Client
//!
//! 高层接口：运动学、运动规划与 `Robot` 门面。
//!
//! - `kinematics`: 双连杆正/逆运动学与分支选择
//! - `motion`: goto 目标、轴顺序、同步运动打包
//! - `params`: 标定常数、组件位置表、输出名称表、轴行程
//! - `robot`: 面向调用者的操作集合
//!
//! ```rust,no_run
//! use n9_client::{GotoOptions, Robot, RobotParameters, TargetMap};
//! use n9_driver::{Session, SessionConfig};
//! use n9_protocol::AxisId;
//!
//! let session = Session::offline(SessionConfig::default());
//! let mut robot: Robot = Robot::new(session, RobotParameters::default());
//! robot.goto(
//!     TargetMap::new().cartesian(-100.0, 200.0).axis(AxisId::Lift, 5000),
//!     &GotoOptions::default(),
//! )?;
//! robot.output("gripper", 1.0)?;
//! # Ok::<(), n9_client::ClientError>(())
//! ```

mod error;
pub mod kinematics;
pub mod motion;
pub mod params;
mod robot;

pub use error::ClientError;
pub use kinematics::{JointSolution, choose_branch, forward_kinematics, inverse_kinematics};
pub use motion::{GotoOptions, GotoTarget, MotionCommand, TargetMap, plan_moves};
pub use params::{ArmGeometry, AxisRange, AxisRanges, CartesianPoint, RobotParameters};
pub use robot::{OutputTarget, Robot};

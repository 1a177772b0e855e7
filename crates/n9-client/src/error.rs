//! 客户端层错误类型定义

use n9_driver::DriverError;
use n9_protocol::AxisId;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 驱动层错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 目标点超出机械臂工作空间
    #[error("The position ({x}, {y}) is not reachable by the robot")]
    UnreachablePosition { x: f64, y: f64 },

    /// 两个逆解都不可用（肩关节计数为负）
    #[error("No valid inverse kinematics solution (candidates: {candidates:?})")]
    NoValidSolution { candidates: Vec<(i64, i64)> },

    /// 组件表中没有该名称
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    /// 输出表中没有该名称
    #[error("Unknown output: {0}")]
    UnknownOutput(String),

    /// 显式顺序中缺少需要移动的轴
    #[error("Axis {0} moves but is missing from the explicit order")]
    AxisNotOrdered(AxisId),

    /// 目标计数无法表示（超出控制器计数范围）
    #[error("Target {target} for axis {axis} is not a valid count")]
    InvalidTarget { axis: AxisId, target: i64 },

    /// 目标超出轴行程
    #[error("Target {target} for axis {axis} is outside of its range {min}..={max}")]
    OutOfRange {
        axis: AxisId,
        target: i64,
        min: i64,
        max: i64,
    },
}

impl ClientError {
    /// 是否为操作员中断
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Driver(DriverError::Cancelled))
    }
}

//! # N9 Protocol
//!
//! N9 机械臂串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `axis`: 轴编号定义
//! - `codec`: 帧封装、帧结束判定、回显校验
//! - `commands`: 命令注册表（名称 → 四字符指令码）
//! - `position`: 位置报告解析
//!
//! ## 帧格式
//!
//! ```text
//! 发送: '<' + WIRECODE + (' V' index '[' value ']')* + '\r'
//! 接收: '<' ... '>' + '\r'
//! ```
//!
//! 载荷只由命令语法中的字符组成，因此不做任何转义。

pub mod axis;
pub mod codec;
pub mod commands;
pub mod position;

// 重新导出常用类型
pub use axis::AxisId;
pub use codec::*;
pub use commands::{COMMANDS, CommandSpec, lookup};
pub use position::parse_position_report;

use smallvec::SmallVec;
use thiserror::Error;

/// 命令参数列表
///
/// 栈上预留 6 个位置，覆盖参数最多的 `movesync`（2 轴 + 2 目标 + 加速度 + 速度）。
pub type ArgList = SmallVec<[f64; 6]>;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("The specified command ('{0}') is not recognized")]
    UnknownCommand(String),

    #[error("Malformed position report: {0:?}")]
    MalformedPositionReport(String),

    #[error("Invalid axis id: {0}")]
    InvalidAxis(u8),

    /// 参数不是有限数，或取整后超出控制器的 32 位计数范围
    #[error("Argument V{index} is not a valid count: {value}")]
    InvalidArgument { index: usize, value: f64 },

    #[error("Invalid axis letter: {0:?} (expected one of g, s, e, z)")]
    InvalidAxisLetter(char),
}

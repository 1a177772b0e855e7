//! 驱动层错误类型定义

use n9_protocol::ProtocolError;
use n9_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 协议错误（包括未知命令）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 串口错误
    #[error("Serial error: {0}")]
    Serial(#[from] SerialError),

    /// 参数个数不匹配，且缺少的部分不能由速度/加速度补齐
    #[error(
        "An incorrect number of arguments were passed for the command {command} (expected: {expected}, passed: {actual})"
    )]
    ArgumentCountMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// 读取循环耗尽尝试次数仍未收到完整响应
    #[error("There was no response from the robot after {attempts} polls (issued command: {command})")]
    NoResponse { command: String, attempts: u32 },

    /// 回显校验失败
    #[error("The command {sent} failed to execute: input does not match pingback: {received:?}")]
    FailedExecution { sent: String, received: String },

    /// 操作员中断（已执行回零）
    #[error("Execution cancelled by operator")]
    Cancelled,

    /// 会话已断开
    #[error("Session is disconnected")]
    Disconnected,
}

impl DriverError {
    /// 是否为未知命令错误
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, DriverError::Protocol(ProtocolError::UnknownCommand(_)))
    }
}

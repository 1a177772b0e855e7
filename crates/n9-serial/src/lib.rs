//! # N9 Serial Adapter Layer
//!
//! 串口硬件抽象层，提供统一的字节通道接口。
//!
//! - `SerialAdapter`: 已打开的通道（写字节、查询待读字节数、读取）
//! - `SerialConnector`: 打开通道的工厂（连接重试由驱动层负责）
//! - `port`: 基于 `serialport` 的真实串口后端（feature `hardware`）
//! - `mock`: 无硬件依赖的模拟控制器（feature `mock`）

use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "hardware")]
pub mod port;

#[cfg(feature = "hardware")]
pub use port::{SerialPortAdapter, SerialPortConnector};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockConnector, MockSerialAdapter};

/// 串口适配层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "hardware")]
    #[error("Serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("Failed to open {port}: {message}")]
    Open { port: String, message: String },
    #[error("Channel is closed")]
    NotOpen,
}

/// 串口参数
///
/// 固定 8N1，只有波特率和底层读超时可配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    /// 设备路径（如 `/dev/ttyUSB0`、`COM6`）
    pub path: String,
    /// 波特率
    pub baud_rate: u32,
    /// 底层读写超时
    pub timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            timeout: Duration::from_secs(1),
        }
    }
}

/// 已打开的字节通道
pub trait SerialAdapter: Send {
    /// 写入全部字节
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// 当前可读取的字节数
    fn bytes_waiting(&mut self) -> Result<usize, SerialError>;

    /// 读取最多 `buf.len()` 个字节，返回实际读取数
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;

    /// 读取当前所有待读字节
    fn read_available(&mut self) -> Result<Vec<u8>, SerialError> {
        let waiting = self.bytes_waiting()?;
        let mut buf = vec![0u8; waiting];
        let n = self.read_into(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// 关闭通道
    fn close(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// 通道描述（日志用）
    fn name(&self) -> &str {
        "serial"
    }
}

/// 打开通道的工厂
pub trait SerialConnector: Send {
    /// 尝试打开一次通道
    fn open(&mut self) -> Result<Box<dyn SerialAdapter>, SerialError>;

    /// 目标描述（日志用）
    fn describe(&self) -> String;
}

//! 真实串口后端
//!
//! 基于 `serialport`，8N1、无流控。

use crate::{PortSettings, SerialAdapter, SerialConnector, SerialError};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use tracing::{debug, trace};

/// 已打开的串口
pub struct SerialPortAdapter {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialPortAdapter {
    /// 按参数打开串口
    pub fn open(settings: &PortSettings) -> Result<Self, SerialError> {
        let port = serialport::new(settings.path.as_str(), settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.timeout)
            .open()?;
        debug!(
            "Opened serial port {} at {} baud",
            settings.path, settings.baud_rate
        );
        Ok(Self {
            port,
            name: settings.path.clone(),
        })
    }
}

impl SerialAdapter for SerialPortAdapter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        trace!("{} <- {:?}", self.name, String::from_utf8_lossy(bytes));
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, SerialError> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.port.read(buf)?)
    }

    fn close(&mut self) -> Result<(), SerialError> {
        // serialport 在 drop 时释放句柄，这里只把未发出的数据刷出去
        self.port.flush()?;
        debug!("Closing serial port {}", self.name);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 真实串口工厂
#[derive(Debug, Clone)]
pub struct SerialPortConnector {
    settings: PortSettings,
}

impl SerialPortConnector {
    pub fn new(settings: PortSettings) -> Self {
        Self { settings }
    }
}

impl SerialConnector for SerialPortConnector {
    fn open(&mut self) -> Result<Box<dyn SerialAdapter>, SerialError> {
        Ok(Box::new(SerialPortAdapter::open(&self.settings)?))
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.settings.path, self.settings.baud_rate)
    }
}

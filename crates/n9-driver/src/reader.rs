//! 响应读取循环
//!
//! 轮询通道的待读字节数；为零时休眠固定间隔后重试，直到累积缓冲区满足帧结束条件。
//! 空轮询次数达到上限，或累积字节超过 [`MAX_RESPONSE_BYTES`] 仍未见帧结束时，
//! 返回 `NoResponse`。

use crate::DriverError;
use n9_protocol::is_frame_complete;
use n9_serial::SerialAdapter;
use std::time::Duration;
use tracing::{trace, warn};

/// 单条响应的最大长度（最长的位置报告也远小于此值）
pub(crate) const MAX_RESPONSE_BYTES: usize = 4096;

/// 读取一条完整响应（包含结尾的 `'>' + '\r'`）
pub(crate) fn read_response(
    port: &mut dyn SerialAdapter,
    command: &str,
    max_attempts: u32,
    poll_interval: Duration,
) -> Result<String, DriverError> {
    let mut buffer = String::new();
    let mut idle_polls = 0u32;

    loop {
        let bytes = if port.bytes_waiting()? > 0 {
            port.read_available()?
        } else {
            Vec::new()
        };

        if bytes.is_empty() {
            if idle_polls >= max_attempts {
                return Err(DriverError::NoResponse {
                    command: command.to_string(),
                    attempts: idle_polls,
                });
            }
            idle_polls += 1;
            spin_sleep::sleep(poll_interval);
            continue;
        }

        // 控制器只发送 ASCII
        buffer.push_str(&String::from_utf8_lossy(&bytes));
        if is_frame_complete(&buffer) {
            trace!("{} -> {:?} ({} idle polls)", port.name(), buffer, idle_polls);
            return Ok(buffer);
        }
        if buffer.len() > MAX_RESPONSE_BYTES {
            warn!(
                "{} produced {} bytes without a frame end for '{}'",
                port.name(),
                buffer.len(),
                command
            );
            return Err(DriverError::NoResponse {
                command: command.to_string(),
                attempts: idle_polls,
            });
        }
    }
}

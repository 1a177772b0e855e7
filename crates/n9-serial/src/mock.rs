//! Mock 串口后端
//!
//! 模拟控制器的回显行为，记录所有写入的字节，用于无硬件测试。
//! 克隆出的句柄共享同一份状态，测试可以在把适配器交给会话之后继续观察它。

use crate::{SerialAdapter, SerialConnector, SerialError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 模拟控制器的应答方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// 对每个完整的命令帧回显 `'<' + payload + '>' + '\r'`
    Echo,
    /// 从不应答（除非预置了脚本响应）
    Silent,
}

#[derive(Debug)]
struct MockState {
    behavior: MockBehavior,
    writes: Vec<Vec<u8>>,
    scripted: VecDeque<String>,
    inbox: VecDeque<u8>,
    chunk_size: Option<usize>,
    closed: bool,
}

/// Mock 串口适配器
#[derive(Debug, Clone)]
pub struct MockSerialAdapter {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockSerialAdapter {
    fn default() -> Self {
        Self::echo()
    }
}

impl MockSerialAdapter {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                behavior,
                writes: Vec::new(),
                scripted: VecDeque::new(),
                inbox: VecDeque::new(),
                chunk_size: None,
                closed: false,
            })),
        }
    }

    /// 回显型控制器
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// 静默型控制器
    pub fn silent() -> Self {
        Self::new(MockBehavior::Silent)
    }

    /// 预置一条响应：下一次写入时（优先于回显）放入接收缓冲区
    pub fn queue_response(&self, response: impl Into<String>) {
        self.state.lock().scripted.push_back(response.into());
    }

    /// 每次轮询最多暴露多少字节（模拟分段到达）
    pub fn set_chunk_size(&self, chunk_size: Option<usize>) {
        self.state.lock().chunk_size = chunk_size.filter(|n| *n > 0);
    }

    /// 所有写入（每次写入一条，UTF-8 有损转换）
    pub fn sent_frames(&self) -> Vec<String> {
        self.state
            .lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// 所有写入的载荷（去掉 `<` 与 `\r`，非帧写入原样返回）
    pub fn sent_payloads(&self) -> Vec<String> {
        self.sent_frames()
            .into_iter()
            .map(|frame| match frame.strip_prefix('<').and_then(|f| f.strip_suffix('\r')) {
                Some(payload) => payload.to_string(),
                None => frame,
            })
            .collect()
    }

    /// 写入次数
    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    /// 清空写入记录
    pub fn clear_sent(&self) {
        self.state.lock().writes.clear();
    }

    /// 通道是否已关闭
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl SerialAdapter for MockSerialAdapter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SerialError::NotOpen);
        }
        state.writes.push(bytes.to_vec());

        if let Some(response) = state.scripted.pop_front() {
            state.inbox.extend(response.into_bytes());
            return Ok(());
        }
        if state.behavior == MockBehavior::Echo {
            if let Some(payload) = bytes.strip_prefix(b"<").and_then(|b| b.strip_suffix(b"\r")) {
                state.inbox.push_back(b'<');
                state.inbox.extend(payload.iter().copied());
                state.inbox.extend(b">\r".iter().copied());
            }
        }
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, SerialError> {
        let state = self.state.lock();
        if state.closed {
            return Err(SerialError::NotOpen);
        }
        let waiting = state.inbox.len();
        Ok(state.chunk_size.map_or(waiting, |n| waiting.min(n)))
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SerialError::NotOpen);
        }
        let limit = state.chunk_size.unwrap_or(usize::MAX).min(buf.len());
        let mut n = 0;
        while n < limit {
            match state.inbox.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                },
                None => break,
            }
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<(), SerialError> {
        self.state.lock().closed = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock 工厂：前 `failures` 次打开失败，之后交出共享的 Mock 适配器
#[derive(Debug, Clone)]
pub struct MockConnector {
    adapter: MockSerialAdapter,
    failures: usize,
    attempts: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new(adapter: MockSerialAdapter) -> Self {
        Self::failing_first(adapter, 0)
    }

    /// 前 `failures` 次打开失败
    pub fn failing_first(adapter: MockSerialAdapter, failures: usize) -> Self {
        Self {
            adapter,
            failures,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 永远打开失败
    pub fn unreachable() -> Self {
        Self::failing_first(MockSerialAdapter::silent(), usize::MAX)
    }

    /// 已尝试打开的次数
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// 共享的适配器句柄
    pub fn adapter(&self) -> MockSerialAdapter {
        self.adapter.clone()
    }
}

impl SerialConnector for MockConnector {
    fn open(&mut self) -> Result<Box<dyn SerialAdapter>, SerialError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(SerialError::Open {
                port: "mock".to_string(),
                message: format!("simulated failure (attempt {})", attempt),
            });
        }
        Ok(Box::new(self.adapter.clone()))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

//! 操作员中断与单步确认
//!
//! 中断只在单条命令的粒度上检查：命令开始前和结束后各检查一次，
//! 检测到中断时先同步回零，再把 `Cancelled` 返回给调用者。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 中断令牌
///
/// 可跨线程克隆（例如交给 Ctrl-C 处理器），所有克隆共享同一个标志。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求中断
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 是否有未处理的中断请求
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 取出并清除中断请求
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// 单步确认
///
/// 单步模式下每条命令执行成功后调用；返回 `false` 视为操作员中断。
pub trait StepConfirmer: Send {
    fn acknowledge(&mut self, command: &str, payload: &str) -> bool;
}

impl<F> StepConfirmer for F
where
    F: FnMut(&str, &str) -> bool + Send,
{
    fn acknowledge(&mut self, command: &str, payload: &str) -> bool {
        self(command, payload)
    }
}

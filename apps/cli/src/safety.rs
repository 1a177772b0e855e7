//! 操作员交互：单步确认与 Ctrl-C 中断

use anyhow::Result;
use n9_driver::{CancelToken, StepConfirmer};

/// 单步模式确认器
///
/// 每条命令执行后询问是否继续，默认继续；提示失败（如终端关闭）视为中断。
pub struct PromptConfirmer;

impl StepConfirmer for PromptConfirmer {
    fn acknowledge(&mut self, command: &str, payload: &str) -> bool {
        inquire::Confirm::new(&format!("{} ({}) 已执行，继续？", command, payload))
            .with_default(true)
            .prompt()
            .unwrap_or(false)
    }
}

/// 把 Ctrl-C 接到中断令牌上
///
/// 中断在当前命令结束后生效：会话先回零，再返回 `Cancelled`。
pub fn install_interrupt_handler(token: CancelToken) -> Result<()> {
    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  中断请求已收到，当前命令结束后回零");
        token.cancel();
    })
    .map_err(|e| anyhow::anyhow!("安装 Ctrl-C 处理器失败: {}", e))
}

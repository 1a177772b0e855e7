//! output 命令：设置数字/模拟输出

use anyhow::Result;
use clap::Args;
use n9_client::{OutputTarget, Robot};

/// output 命令参数
#[derive(Args, Debug)]
pub struct OutputCommand {
    /// 输出通道号或配置中的逻辑名称
    pub target: String,

    /// 输出值
    #[arg(allow_negative_numbers = true)]
    pub value: f64,
}

impl OutputCommand {
    pub fn execute<H>(&self, robot: &mut Robot<H>) -> Result<()> {
        let target: OutputTarget = self.target.parse()?;
        let response = robot.output(target, self.value)?;
        println!("{}", response);
        Ok(())
    }
}

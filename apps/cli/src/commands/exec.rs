//! exec 命令：按名称执行任意已注册命令

use anyhow::Result;
use clap::Args;
use n9_client::Robot;
use n9_driver::{ExecOptions, VaOverride};

/// exec 命令参数
#[derive(Args, Debug)]
pub struct ExecCommand {
    /// 命令名称（如 `move`、`output`、`echo`）
    pub name: String,

    /// 数值参数
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<f64>,

    /// 校验控制器回显
    #[arg(long)]
    pub validate: bool,

    /// 速度（counts/s）
    #[arg(short, long)]
    pub velocity: Option<f64>,

    /// 加速度（counts/s²）
    #[arg(short, long)]
    pub acceleration: Option<f64>,
}

impl ExecCommand {
    pub fn options(&self) -> ExecOptions {
        ExecOptions {
            validate: self.validate,
            va: VaOverride {
                velocity: self.velocity,
                acceleration: self.acceleration,
            },
        }
    }

    pub fn execute<H>(&self, robot: &mut Robot<H>) -> Result<()> {
        let response = robot.execute(&self.name, &self.args, self.options())?;
        println!("{}", response);
        Ok(())
    }
}

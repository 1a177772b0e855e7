//! spin 命令：夹爪轴持续旋转

use anyhow::Result;
use clap::Args;
use n9_client::Robot;
use std::time::Duration;

/// spin 命令参数
#[derive(Args, Debug)]
pub struct SpinCommand {
    /// 持续时间（秒）
    #[arg(short, long, default_value_t = 60.0)]
    pub seconds: f64,

    /// 速度（counts/s）
    #[arg(short, long, default_value_t = 25_000.0)]
    pub velocity: f64,
}

impl SpinCommand {
    pub fn execute<H>(&self, robot: &mut Robot<H>) -> Result<()> {
        if !self.seconds.is_finite() || self.seconds < 0.0 {
            anyhow::bail!("持续时间无效: {}", self.seconds);
        }
        let response = robot.spin(Duration::from_secs_f64(self.seconds), self.velocity)?;
        println!("{}", response);
        Ok(())
    }
}

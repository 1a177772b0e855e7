//! goto 命令
//!
//! 目标写成 `key=value`，key 为轴名（`gripper`/`elbow`/`shoulder`/`lift`）、
//! 轴字母、轴编号，或平面坐标 `x`/`y`：
//!
//! ```bash
//! n9-cli goto shoulder=4350 elbow=2550
//! n9-cli goto x=-100 y=250 z=5000 --order zse
//! n9-cli goto --component vial_gripper
//! ```

use anyhow::{Context, Result, bail};
use clap::Args;
use n9_client::{GotoOptions, GotoTarget, Robot, TargetMap};
use n9_driver::VaOverride;
use n9_protocol::AxisId;

/// goto 命令参数
#[derive(Args, Debug)]
pub struct GotoCommand {
    /// 目标（`axis=count`、`x=mm`、`y=mm`）
    pub targets: Vec<String>,

    /// 组件表中的命名位置
    #[arg(short, long, conflicts_with = "targets")]
    pub component: Option<String>,

    /// 显式轴顺序（g/s/e/z 组成，如 `sez`）
    #[arg(short, long)]
    pub order: Option<String>,

    /// 逐轴运动，不使用同步运动
    #[arg(long)]
    pub no_sync: bool,

    /// 跳过轴行程检查
    #[arg(long)]
    pub no_range_check: bool,

    /// 速度（counts/s）
    #[arg(short, long)]
    pub velocity: Option<f64>,

    /// 加速度（counts/s²）
    #[arg(short, long)]
    pub acceleration: Option<f64>,
}

impl GotoCommand {
    pub fn target(&self) -> Result<GotoTarget> {
        match &self.component {
            Some(name) => Ok(GotoTarget::Component(name.clone())),
            None => Ok(GotoTarget::Map(parse_targets(&self.targets)?)),
        }
    }

    pub fn options(&self) -> Result<GotoOptions> {
        let mut options = GotoOptions {
            sync: !self.no_sync,
            check_ranges: !self.no_range_check,
            va: VaOverride {
                velocity: self.velocity,
                acceleration: self.acceleration,
            },
            ..GotoOptions::default()
        };
        if let Some(order) = &self.order {
            options = options.with_order(order)?;
        }
        Ok(options)
    }

    pub fn execute<H>(&self, robot: &mut Robot<H>) -> Result<()> {
        let target = self.target()?;
        let options = self.options()?;
        robot.goto(target, &options)?;
        println!("✅ {}", robot.pose());
        Ok(())
    }
}

/// 解析 `key=value` 目标列表
pub fn parse_targets(entries: &[String]) -> Result<TargetMap> {
    if entries.is_empty() {
        bail!("未指定目标，例如: shoulder=4350 elbow=2550");
    }

    let mut map = TargetMap::new();
    let (mut x, mut y) = (None, None);
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("目标格式应为 key=value: {}", entry))?;
        let key = key.trim();
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("无法解析数值: {}", entry))?;
        if !value.is_finite() {
            bail!("数值必须是有限数: {}", entry);
        }

        match key {
            "x" => x = Some(value),
            "y" => y = Some(value),
            _ => {
                let axis = AxisId::from_name(key)
                    .ok_or_else(|| anyhow::anyhow!("未知的轴: {}", key))?;
                let count = n9_protocol::checked_count(1, value)
                    .with_context(|| format!("计数超出范围: {}", entry))?;
                map = map.axis(axis, count);
            },
        }
    }

    match (x, y) {
        (Some(x), Some(y)) => Ok(map.cartesian(x, y)),
        (None, None) => Ok(map),
        _ => bail!("x 和 y 必须同时给出"),
    }
}

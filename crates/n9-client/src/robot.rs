//! 机械臂高层接口
//!
//! `Robot` 在 `Session` 之上提供 goto、输出、旋转、自检等操作，
//! 并持有一个不透明的夹持物槽位。

use crate::ClientError;
use crate::kinematics::{choose_branch, forward_kinematics, inverse_kinematics};
use crate::motion::{GotoOptions, GotoTarget, TargetMap, plan_moves};
use crate::params::{CartesianPoint, RobotParameters};
use n9_driver::{ExecOptions, Pose, Session, TeleopConsole, VaOverride};
use n9_protocol::AxisId;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// `spin` 使用的加速度（counts/s²）
const SPIN_ACCELERATION: f64 = 50_000.0;

/// 输出目标：通道号或逻辑名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Channel(u8),
    Named(String),
}

impl From<u8> for OutputTarget {
    fn from(channel: u8) -> Self {
        OutputTarget::Channel(channel)
    }
}

impl From<&str> for OutputTarget {
    fn from(name: &str) -> Self {
        OutputTarget::Named(name.to_string())
    }
}

impl FromStr for OutputTarget {
    type Err = std::convert::Infallible;

    /// 纯数字解析为通道号，其余视为名称
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<u8>() {
            Ok(channel) => OutputTarget::Channel(channel),
            Err(_) => OutputTarget::Named(s.trim().to_string()),
        })
    }
}

/// 机械臂
///
/// `H` 是夹持物的类型，本层不解释其内容。
pub struct Robot<H = ()> {
    session: Session,
    params: RobotParameters,
    held: Option<H>,
}

impl<H> Robot<H> {
    pub fn new(session: Session, params: RobotParameters) -> Self {
        Self {
            session,
            params,
            held: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn params(&self) -> &RobotParameters {
        &self.params
    }

    /// 当前跟踪位置（不查询硬件）
    pub fn pose(&self) -> &Pose {
        self.session.pose()
    }

    /// 执行任意已注册命令
    pub fn execute(
        &mut self,
        name: &str,
        args: &[f64],
        options: ExecOptions,
    ) -> Result<String, ClientError> {
        Ok(self.session.execute(name, args, options)?)
    }

    /// 查询位置
    pub fn position(&mut self) -> Result<Pose, ClientError> {
        Ok(self.session.position()?)
    }

    pub fn home(&mut self) -> Result<String, ClientError> {
        Ok(self.session.home()?)
    }

    /// 查询位置并换算成平面坐标
    pub fn cartesian_position(&mut self) -> Result<CartesianPoint, ClientError> {
        let pose = self.position()?;
        Ok(forward_kinematics(
            &self.params.geometry,
            pose.count(AxisId::Shoulder),
            pose.count(AxisId::Elbow),
        ))
    }

    /// 给定点与当前位置之差
    pub fn calculate_offset(&mut self, x: f64, y: f64) -> Result<CartesianPoint, ClientError> {
        let current = self.cartesian_position()?;
        Ok(CartesianPoint::new(x, y) - current)
    }

    /// 移动到目标位置
    ///
    /// 序列目标按顺序逐个执行；每个目标的所有轴在发出第一条命令前完成行程检查。
    /// 每条命令发出后立即乐观更新跟踪位置。
    pub fn goto(
        &mut self,
        target: impl Into<GotoTarget>,
        options: &GotoOptions,
    ) -> Result<(), ClientError> {
        match target.into() {
            GotoTarget::Sequence(targets) => {
                for target in targets {
                    self.goto(target, options)?;
                }
                Ok(())
            },
            GotoTarget::Axis(axis, count) => {
                self.goto_counts(BTreeMap::from([(axis, count)]), options)
            },
            GotoTarget::Component(name) => {
                let point = self.params.component(&name)?;
                debug!("Component '{}' resolved to {}", name, point);
                let targets = self.resolve(&TargetMap {
                    axes: BTreeMap::new(),
                    cartesian: Some(point),
                })?;
                self.goto_counts(targets, options)
            },
            GotoTarget::Map(map) => {
                let targets = self.resolve(&map)?;
                self.goto_counts(targets, options)
            },
        }
    }

    /// 把平面坐标换算成肩/肘目标并合并到轴目标表
    fn resolve(&self, map: &TargetMap) -> Result<BTreeMap<AxisId, i64>, ClientError> {
        let mut targets = map.axes.clone();
        if let Some(point) = map.cartesian {
            let candidates = inverse_kinematics(&self.params.geometry, point)?;
            let current = self.session.pose().count(AxisId::Shoulder);
            let solution = choose_branch(&candidates, current)?;
            debug!(
                "{} -> shoulder {}, elbow {}",
                point, solution.shoulder, solution.elbow
            );
            targets.insert(AxisId::Shoulder, solution.shoulder);
            targets.insert(AxisId::Elbow, solution.elbow);
        }
        Ok(targets)
    }

    fn goto_counts(
        &mut self,
        targets: BTreeMap<AxisId, i64>,
        options: &GotoOptions,
    ) -> Result<(), ClientError> {
        let plan = plan_moves(self.session.pose(), &targets, options)?;
        if options.check_ranges {
            self.params
                .ranges
                .check_all(plan.iter().flat_map(|command| command.updates()))?;
        }

        let exec = ExecOptions::default().with_va(options.va);
        for command in plan {
            self.session
                .execute(command.command_name(), &command.args(), exec)?;
            self.session.record_motion(command.updates());
        }
        Ok(())
    }

    /// 设置输出，然后等待执行器动作
    pub fn output(
        &mut self,
        target: impl Into<OutputTarget>,
        value: f64,
    ) -> Result<String, ClientError> {
        let channel = match target.into() {
            OutputTarget::Channel(channel) => channel,
            OutputTarget::Named(name) => self.params.output_channel(&name)?,
        };
        let response = self.session.execute(
            "output",
            &[channel as f64, value],
            ExecOptions::default(),
        )?;
        spin_sleep::sleep(self.params.output_settle());
        Ok(response)
    }

    /// 让夹爪轴持续旋转 `duration`
    pub fn spin(&mut self, duration: Duration, velocity: f64) -> Result<String, ClientError> {
        let start = self.session.pose().count(AxisId::Gripper);
        let end = start + (duration.as_secs_f64() * velocity).trunc() as i64;
        info!("Spinning the gripper for {:?} at {} counts/s", duration, velocity);
        let response = self.session.execute(
            "spin",
            &[AxisId::Gripper.index() as f64, end as f64],
            ExecOptions::default().with_va(VaOverride::new(velocity, SPIN_ACCELERATION)),
        )?;
        self.session.record_motion([(AxisId::Gripper, end)]);
        Ok(response)
    }

    /// 通信自检：每轮依次执行 `echo`、`random`、`plustwo(i + 1)`
    pub fn self_test(&mut self, repeats: usize) -> Result<Vec<String>, ClientError> {
        info!("Executing test functions");
        let mut responses = Vec::with_capacity(repeats * 3);
        for i in 0..repeats {
            responses.push(self.session.execute("echo", &[], ExecOptions::default())?);
            responses.push(self.session.execute("random", &[], ExecOptions::default())?);
            responses.push(self.session.execute(
                "plustwo",
                &[(i + 1) as f64],
                ExecOptions::default(),
            )?);
        }
        Ok(responses)
    }

    pub fn servo_on(&mut self) -> Result<String, ClientError> {
        Ok(self.session.execute("servo_on", &[], ExecOptions::default())?)
    }

    pub fn servo_off(&mut self) -> Result<String, ClientError> {
        Ok(self.session.execute("servo_off", &[], ExecOptions::default())?)
    }

    /// 把当前位置设为零点（主轴跟踪值随之清零）
    pub fn zero(&mut self) -> Result<String, ClientError> {
        let response = self.session.execute("zero", &[], ExecOptions::default())?;
        self.session
            .record_motion(AxisId::PRIMARY.iter().map(|axis| (*axis, 0)));
        Ok(response)
    }

    /// 键盘遥控模式
    pub fn keyboard(&mut self, console: &mut dyn TeleopConsole) -> Result<(), ClientError> {
        Ok(self.session.keyboard(console)?)
    }

    /// 记录夹持物，返回之前的夹持物
    pub fn hold(&mut self, item: H) -> Option<H> {
        if self.held.is_some() {
            warn!("Replacing the item already held in the gripper");
        }
        self.held.replace(item)
    }

    /// 取出夹持物
    pub fn release(&mut self) -> Option<H> {
        self.held.take()
    }

    pub fn held(&self) -> Option<&H> {
        self.held.as_ref()
    }

    /// 断开连接
    pub fn disconnect(self, rough_home_first: bool) -> Result<(), ClientError> {
        Ok(self.session.disconnect(rough_home_first)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_target_parse() {
        assert_eq!("3".parse::<OutputTarget>().unwrap(), OutputTarget::Channel(3));
        assert_eq!(
            " gripper ".parse::<OutputTarget>().unwrap(),
            OutputTarget::Named("gripper".into())
        );
        assert_eq!(
            "300".parse::<OutputTarget>().unwrap(),
            OutputTarget::Named("300".into())
        );
    }
}

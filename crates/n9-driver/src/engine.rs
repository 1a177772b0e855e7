//! 命令执行
//!
//! `execute` 是所有硬件交互的唯一入口：查表、补齐速度/加速度、构造载荷、
//! 写帧、读取响应、可选回显校验、可选单步确认。

use crate::DriverError;
use crate::config::{VaOverride, VelocityAcceleration};
use crate::session::Session;
use crate::state::Pose;
use n9_protocol::{
    ArgList, CommandSpec, build_payload, echo_frame, lookup, parse_position_report,
    strip_terminator, validate_echo,
};
use tracing::{debug, error, warn};

/// 单次调用选项
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExecOptions {
    /// 校验响应是否为 `'<' + payload + '>'`
    pub validate: bool,
    /// 速度/加速度覆盖
    pub va: VaOverride,
}

impl ExecOptions {
    /// 启用回显校验
    pub fn validated() -> Self {
        Self {
            validate: true,
            ..Self::default()
        }
    }

    pub fn with_va(mut self, va: VaOverride) -> Self {
        self.va = va;
        self
    }
}

/// 按命令定义整理参数
///
/// 参数个数正好时原样返回。支持速度/加速度的命令恰好缺 2 个参数时追加
/// `(acceleration, velocity)`；其余情况（包括只缺 1 个）都是 `ArgumentCountMismatch`。
pub fn prepare_args(
    spec: &CommandSpec,
    args: &[f64],
    va: VelocityAcceleration,
) -> Result<ArgList, DriverError> {
    let mut list: ArgList = args.iter().copied().collect();
    if args.len() == spec.required_args {
        return Ok(list);
    }

    match spec.required_args.checked_sub(args.len()) {
        Some(2) if spec.supports_va => {
            list.push(va.acceleration);
            list.push(va.velocity);
        },
        _ => {
            return Err(DriverError::ArgumentCountMismatch {
                command: spec.name.to_string(),
                expected: spec.required_args,
                actual: args.len(),
            });
        },
    }
    Ok(list)
}

impl Session {
    /// 执行一条命令，返回去掉 CR 的响应帧
    ///
    /// 离线模式下不做任何 I/O，直接返回 `'<' + payload + '>'`。
    /// 命令前后各检查一次中断令牌；检测到中断时先回零再返回 `Cancelled`。
    pub fn execute(
        &mut self,
        name: &str,
        args: &[f64],
        options: ExecOptions,
    ) -> Result<String, DriverError> {
        if self.cancel.take() {
            return Err(self.abort(name));
        }
        let result = self.dispatch(name, args, options);
        if self.cancel.take() {
            return Err(self.abort(name));
        }
        result
    }

    fn dispatch(
        &mut self,
        name: &str,
        args: &[f64],
        options: ExecOptions,
    ) -> Result<String, DriverError> {
        let spec = lookup(name)?;
        let va = options.va.resolve(self.config.motion);
        let args = prepare_args(spec, args, va)?;
        let payload = build_payload(spec.wire_code, &args)?;

        if self.is_offline() {
            debug!("[offline] {}", payload);
            return Ok(echo_frame(&payload));
        }

        debug!("Executing command '{}'", payload);
        let max_attempts = self.config.read.max_attempts;
        let buffer = self.transact(&payload, max_attempts)?;
        let response = strip_terminator(&buffer).to_string();

        if options.validate && !validate_echo(&payload, &response) {
            return Err(DriverError::FailedExecution {
                sent: payload,
                received: response,
            });
        }

        if self.config.step_cycle && !self.confirm_step(name, &payload) {
            return Err(self.abort(name));
        }

        Ok(response)
    }

    /// 查询位置并覆盖跟踪值
    ///
    /// 离线模式下没有位置报告，返回当前跟踪值。
    pub fn position(&mut self) -> Result<Pose, DriverError> {
        let response = self.execute("position", &[], ExecOptions::default())?;
        if self.is_offline() {
            return Ok(self.pose.clone());
        }
        let axes = parse_position_report(&response)?;
        self.pose.apply(axes);
        Ok(self.pose.clone())
    }

    fn confirm_step(&mut self, name: &str, payload: &str) -> bool {
        match self.confirmer.as_mut() {
            Some(confirmer) => confirmer.acknowledge(name, payload),
            None => {
                warn!("Step-cycle mode is enabled but no confirmer is installed, continuing");
                true
            },
        }
    }

    /// 中断处理：回零，然后交出 `Cancelled`
    pub(crate) fn abort(&mut self, name: &str) -> DriverError {
        warn!("Operator interrupted the execution of '{}', homing", name);
        if let Err(e) = self.home() {
            error!("Homing after interruption failed: {}", e);
        }
        DriverError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn va() -> VelocityAcceleration {
        VelocityAcceleration {
            velocity: 10_000.0,
            acceleration: 75_000.0,
        }
    }

    #[test]
    fn test_exact_args_unchanged() {
        let spec = lookup("move").unwrap();
        let args = prepare_args(spec, &[1.0, 2550.0, 1.0, 2.0], va()).unwrap();
        assert_eq!(args.as_slice(), &[1.0, 2550.0, 1.0, 2.0]);
    }

    #[test]
    fn test_va_appended_in_acceleration_velocity_order() {
        let spec = lookup("movesync").unwrap();
        let args = prepare_args(spec, &[1.0, 2.0, 2550.0, 4350.0], va()).unwrap();
        assert_eq!(args.as_slice(), &[1.0, 2.0, 2550.0, 4350.0, 75_000.0, 10_000.0]);
    }

    #[test]
    fn test_single_shortfall_is_mismatch() {
        let spec = lookup("move").unwrap();
        let err = prepare_args(spec, &[1.0, 2550.0, 50_000.0], va()).unwrap_err();
        assert!(matches!(
            err,
            DriverError::ArgumentCountMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_mismatch_without_va_support() {
        let spec = lookup("output").unwrap();
        let err = prepare_args(spec, &[3.0], va()).unwrap_err();
        assert!(matches!(
            err,
            DriverError::ArgumentCountMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_mismatch_too_many_or_too_few() {
        let spec = lookup("move").unwrap();
        assert!(prepare_args(spec, &[1.0], va()).is_err());
        assert!(prepare_args(spec, &[1.0; 5], va()).is_err());
        assert!(prepare_args(lookup("home").unwrap(), &[1.0], va()).is_err());
    }

    #[test]
    fn test_exec_options() {
        let options = ExecOptions::validated().with_va(VaOverride::new(1.0, 2.0));
        assert!(options.validate);
        assert_eq!(options.va.velocity, Some(1.0));
        assert!(!ExecOptions::default().validate);
    }
}

//! 键盘遥控模式
//!
//! 发送 `KEYB` 后，控制器按单个按键字符点动各轴，并对每个按键回复一条位置报告。
//! 本模块只负责把按键原样转发、解析并显示回复，按键含义由控制器固件决定。
//!
//! | 按键 | 作用 |
//! |------|------|
//! | `i` / `y` | 夹爪 +/- |
//! | `k` / `h` | 肘 +/- |
//! | `,` / `n` | 肩 +/- |
//! | `u` / `m` | 升降 +/- |
//! | `q` / `a` / `z` / `x` | 步长 1000 / 100 / 10 / 2 |
//! | `/` | 退出 |

use crate::DriverError;
use crate::reader::read_response;
use crate::session::Session;
use crate::state::Pose;
use n9_protocol::{AxisId, build_payload, encode_frame, lookup, parse_position_report};
use tracing::{error, info, warn};

/// 帮助文本
pub const TELEOP_HELP: &str = "\
Keyboard driving mode
  i / y   gripper + / -
  k / h   elbow + / -
  , / n   shoulder + / -
  u / m   lift + / -
  q a z x step size 1000 / 100 / 10 / 2
  /       exit
  help    show this message";

/// 点动步长档位（编码器计数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogTier {
    Coarse,
    Medium,
    Fine,
    Micro,
}

impl JogTier {
    /// 每次点动的编码器计数
    pub fn counts(self) -> i64 {
        match self {
            JogTier::Coarse => 1000,
            JogTier::Medium => 100,
            JogTier::Fine => 10,
            JogTier::Micro => 2,
        }
    }
}

/// 遥控按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleopKey {
    /// 单轴点动
    Jog { axis: AxisId, positive: bool },
    /// 切换步长
    Tier(JogTier),
    /// 退出遥控模式
    Exit,
    /// 显示帮助（不发送给控制器）
    Help,
}

impl TeleopKey {
    /// 解析一行输入；无法识别时返回 `None`
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("help") {
            return Some(TeleopKey::Help);
        }
        let mut chars = input.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return None,
        };
        let jog = |axis, positive| Some(TeleopKey::Jog { axis, positive });
        match key {
            'i' => jog(AxisId::Gripper, true),
            'y' => jog(AxisId::Gripper, false),
            'k' => jog(AxisId::Elbow, true),
            'h' => jog(AxisId::Elbow, false),
            ',' => jog(AxisId::Shoulder, true),
            'n' => jog(AxisId::Shoulder, false),
            'u' => jog(AxisId::Lift, true),
            'm' => jog(AxisId::Lift, false),
            'q' => Some(TeleopKey::Tier(JogTier::Coarse)),
            'a' => Some(TeleopKey::Tier(JogTier::Medium)),
            'z' => Some(TeleopKey::Tier(JogTier::Fine)),
            'x' => Some(TeleopKey::Tier(JogTier::Micro)),
            '/' => Some(TeleopKey::Exit),
            _ => None,
        }
    }

    /// 发送给控制器的按键字符
    pub fn wire_char(self) -> Option<char> {
        let c = match self {
            TeleopKey::Jog { axis, positive } => match (axis, positive) {
                (AxisId::Gripper, true) => 'i',
                (AxisId::Gripper, false) => 'y',
                (AxisId::Elbow, true) => 'k',
                (AxisId::Elbow, false) => 'h',
                (AxisId::Shoulder, true) => ',',
                (AxisId::Shoulder, false) => 'n',
                (AxisId::Lift, true) => 'u',
                (AxisId::Lift, false) => 'm',
                _ => return None,
            },
            TeleopKey::Tier(JogTier::Coarse) => 'q',
            TeleopKey::Tier(JogTier::Medium) => 'a',
            TeleopKey::Tier(JogTier::Fine) => 'z',
            TeleopKey::Tier(JogTier::Micro) => 'x',
            TeleopKey::Exit => '/',
            TeleopKey::Help => return None,
        };
        Some(c)
    }
}

/// 遥控终端（输入来源与显示）
pub trait TeleopConsole {
    /// 读取一行输入；输入流结束时返回 `None`
    fn read_key(&mut self) -> Option<String>;

    /// 显示最新位置
    fn show_position(&mut self, pose: &Pose);

    /// 显示提示信息
    fn show_message(&mut self, message: &str);
}

impl Session {
    /// 进入键盘遥控模式，直到输入 `/` 或输入流结束
    ///
    /// 每条位置报告都会覆盖跟踪位置。离线模式下直接返回。
    pub fn keyboard(&mut self, console: &mut dyn TeleopConsole) -> Result<(), DriverError> {
        if self.is_offline() {
            warn!("Keyboard driving mode is not available offline");
            return Ok(());
        }

        let spec = lookup("keyboard")?;
        let payload = build_payload(spec.wire_code, &[])?;
        info!("Initializing keyboard driving mode, input \"/\" to exit this mode");
        self.port_mut()?.write_all(&encode_frame(&payload))?;
        console.show_message(TELEOP_HELP);

        loop {
            if self.cancel.take() {
                self.send_key('/')?;
                return Err(self.abort("keyboard"));
            }

            let Some(line) = console.read_key() else {
                self.send_key('/')?;
                break;
            };
            let key = match TeleopKey::parse(&line) {
                Some(key) => key,
                None => {
                    console.show_message("Invalid input, type \"help\" for the key map");
                    continue;
                },
            };

            match key.wire_char() {
                None => console.show_message(TELEOP_HELP),
                Some('/') => {
                    self.send_key('/')?;
                    break;
                },
                Some(c) => {
                    if let Err(e) = self.jog(c) {
                        // 先让控制器退出键盘模式，后续命令才能被正常解析
                        if let Err(exit) = self.send_key('/') {
                            error!("Failed to leave keyboard mode: {}", exit);
                        }
                        return Err(e);
                    }
                    if let TeleopKey::Tier(tier) = key {
                        console.show_message(&format!("Step size: {} counts", tier.counts()));
                    }
                    console.show_position(&self.pose);
                },
            }
        }

        info!("Exited keyboard driving mode");
        Ok(())
    }

    /// 发送一个按键并用返回的位置报告覆盖跟踪位置
    fn jog(&mut self, key: char) -> Result<(), DriverError> {
        self.send_key(key)?;
        let max_attempts = self.config.read.max_attempts;
        let poll_interval = self.config.read.poll_interval();
        let port = self.port_mut()?;
        let report = read_response(&mut **port, &key.to_string(), max_attempts, poll_interval)?;
        let axes = parse_position_report(&report)?;
        self.pose.apply(axes);
        Ok(())
    }

    fn send_key(&mut self, key: char) -> Result<(), DriverError> {
        let mut buf = [0u8; 4];
        self.port_mut()?.write_all(key.encode_utf8(&mut buf).as_bytes())?;
        Ok(())
    }
}

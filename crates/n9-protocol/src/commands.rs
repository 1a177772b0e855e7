//! 命令注册表
//!
//! 符号命令名 → 四字符指令码、必需参数个数、是否支持自动补齐速度/加速度。
//! 注册表是只读的静态数据，进程内不会被修改。

use crate::ProtocolError;

/// 命令描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// 符号名称
    pub name: &'static str,
    /// 四字符指令码
    pub wire_code: &'static str,
    /// 必需参数个数（包含末尾的加速度/速度参数）
    pub required_args: usize,
    /// 是否允许自动补齐末尾的加速度/速度参数
    pub supports_va: bool,
}

impl CommandSpec {
    const fn new(
        name: &'static str,
        wire_code: &'static str,
        required_args: usize,
        supports_va: bool,
    ) -> Self {
        Self {
            name,
            wire_code,
            required_args,
            supports_va,
        }
    }
}

/// 全部已知命令
pub const COMMANDS: &[CommandSpec] = &[
    // 回显
    CommandSpec::new("echo", "ECHO", 0, false),
    // 回零
    CommandSpec::new("home", "HOME", 0, false),
    // 单轴运动：轴、目标、加速度、速度
    CommandSpec::new("move", "MOAX", 4, true),
    // 双轴同步运动：轴 A、轴 B、目标 A、目标 B、加速度、速度
    CommandSpec::new("movesync", "MOSY", 6, true),
    // 键盘驱动模式
    CommandSpec::new("keyboard", "KEYB", 0, false),
    // 返回参数加二（通信自检）
    CommandSpec::new("plustwo", "AN02", 1, false),
    // 设置输出：输出编号、值
    CommandSpec::new("output", "OUTP", 2, false),
    // 查询所有轴位置
    CommandSpec::new("position", "POSR", 0, false),
    // 伺服上电并清零（排障用）
    CommandSpec::new("servo_on", "SEON", 0, false),
    // 伺服断电（排障用）
    CommandSpec::new("servo_off", "SEOF", 0, false),
    // 持续旋转：轴、终点计数、加速度、速度
    CommandSpec::new("spin", "MOID", 4, true),
    // 返回随机数（通信自检）
    CommandSpec::new("random", "AN01", 0, false),
    // 将当前位置设为零点
    CommandSpec::new("zero", "ZERO", 0, false),
];

/// 按名称查找命令
///
/// ```rust
/// use n9_protocol::lookup;
///
/// let spec = lookup("movesync").unwrap();
/// assert_eq!(spec.wire_code, "MOSY");
/// assert!(lookup("fly").is_err());
/// ```
pub fn lookup(name: &str) -> Result<&'static CommandSpec, ProtocolError> {
    COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| ProtocolError::UnknownCommand(name.to_string()))
}

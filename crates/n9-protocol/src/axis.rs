//! 轴编号定义
//!
//! N9 的轴编号在固件中固定：0 夹爪旋转、1 肘关节、2 肩关节、3 升降（Z 轴），
//! 4-6 为预留轴。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 机械臂轴编号
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[num_enum(error_type(name = ProtocolError, constructor = ProtocolError::InvalidAxis))]
#[repr(u8)]
pub enum AxisId {
    /// 夹爪旋转
    Gripper = 0,
    /// 肘关节
    Elbow = 1,
    /// 肩关节
    Shoulder = 2,
    /// 升降轴（Z）
    Lift = 3,
    /// 预留轴
    Aux4 = 4,
    /// 预留轴
    Aux5 = 5,
    /// 预留轴
    Aux6 = 6,
}

impl AxisId {
    /// 全部轴（按编号排序）
    pub const ALL: [AxisId; 7] = [
        AxisId::Gripper,
        AxisId::Elbow,
        AxisId::Shoulder,
        AxisId::Lift,
        AxisId::Aux4,
        AxisId::Aux5,
        AxisId::Aux6,
    ];

    /// 主轴（回零时清零的轴）
    pub const PRIMARY: [AxisId; 4] = [
        AxisId::Gripper,
        AxisId::Elbow,
        AxisId::Shoulder,
        AxisId::Lift,
    ];

    /// 线上编号
    pub fn index(self) -> u8 {
        self.into()
    }

    /// 解析单字母轴代码
    ///
    /// `g` 夹爪、`s` 肩、`e` 肘、`z` 升降，大小写不敏感。
    pub fn from_letter(letter: char) -> Result<Self, ProtocolError> {
        match letter.to_ascii_lowercase() {
            'g' => Ok(AxisId::Gripper),
            's' => Ok(AxisId::Shoulder),
            'e' => Ok(AxisId::Elbow),
            'z' => Ok(AxisId::Lift),
            other => Err(ProtocolError::InvalidAxisLetter(other)),
        }
    }

    /// 解析轴顺序字符串（如 `"sez"`）
    pub fn parse_order(order: &str) -> Result<Vec<Self>, ProtocolError> {
        order
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Self::from_letter)
            .collect()
    }

    /// 轴名称
    pub fn name(self) -> &'static str {
        match self {
            AxisId::Gripper => "gripper",
            AxisId::Elbow => "elbow",
            AxisId::Shoulder => "shoulder",
            AxisId::Lift => "lift",
            AxisId::Aux4 => "aux4",
            AxisId::Aux5 => "aux5",
            AxisId::Aux6 => "aux6",
        }
    }

    /// 按名称解析（`gripper`/`elbow`/`shoulder`/`lift`、单字母代码或数字编号）
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(axis) = Self::ALL.iter().find(|a| a.name().eq_ignore_ascii_case(name)) {
            return Some(*axis);
        }
        if let Ok(index) = name.parse::<u8>() {
            return Self::try_from(index).ok();
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_letter(c).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_from_index() {
        assert_eq!(AxisId::try_from(2u8).unwrap(), AxisId::Shoulder);
        assert_eq!(AxisId::try_from(9u8), Err(ProtocolError::InvalidAxis(9)));
        assert_eq!(u8::from(AxisId::Lift), 3);
    }

    #[test]
    fn test_axis_letters() {
        assert_eq!(
            AxisId::parse_order("sez").unwrap(),
            vec![AxisId::Shoulder, AxisId::Elbow, AxisId::Lift]
        );
        assert_eq!(AxisId::from_letter('G').unwrap(), AxisId::Gripper);
        assert_eq!(
            AxisId::parse_order("sx"),
            Err(ProtocolError::InvalidAxisLetter('x'))
        );
    }

    #[test]
    fn test_axis_from_name() {
        assert_eq!(AxisId::from_name("Elbow"), Some(AxisId::Elbow));
        assert_eq!(AxisId::from_name("3"), Some(AxisId::Lift));
        assert_eq!(AxisId::from_name("z"), Some(AxisId::Lift));
        assert_eq!(AxisId::from_name("wrist"), None);
    }
}

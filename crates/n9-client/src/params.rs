//! 机械臂参数
//!
//! 标定常数（连杆长度、每圈计数、零点、坐标修正）、组件位置表、输出名称表和轴行程。
//! 构造 `Robot` 时传入，运行期不修改。

use crate::ClientError;
use nalgebra::Vector2;
use n9_protocol::AxisId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Sub;
use std::time::Duration;

/// 平面坐标（mm），原点在肩关节
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
}

impl CartesianPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn from_vector(v: Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }

    /// 到原点的距离
    pub fn norm(self) -> f64 {
        self.to_vector().norm()
    }
}

impl Sub for CartesianPoint {
    type Output = CartesianPoint;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_vector(self.to_vector() - rhs.to_vector())
    }
}

impl std::fmt::Display for CartesianPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// 双连杆几何与编码器标定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmGeometry {
    /// 肩到肘的长度（mm）
    pub shoulder_elbow_mm: f64,
    /// 肘到夹爪的长度（mm）
    pub elbow_gripper_mm: f64,
    /// 肩关节每圈计数
    pub shoulder_counts_per_rev: f64,
    /// 肘关节每圈计数
    pub elbow_counts_per_rev: f64,
    /// 肩关节零点计数
    pub shoulder_zero: f64,
    /// 肘关节零点计数
    pub elbow_zero: f64,
    /// x 方向修正（mm）
    pub x_offset: f64,
    /// y 方向修正（mm）
    pub y_offset: f64,
}

impl Default for ArmGeometry {
    fn default() -> Self {
        Self {
            shoulder_elbow_mm: 170.0,
            elbow_gripper_mm: 170.0,
            shoulder_counts_per_rev: 50_500.0,
            elbow_counts_per_rev: 25_500.0,
            shoulder_zero: 16_449.0,
            elbow_zero: 10_370.0,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

impl ArmGeometry {
    pub fn offset(&self) -> CartesianPoint {
        CartesianPoint::new(self.x_offset, self.y_offset)
    }
}

/// 轴行程（编码器计数，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i64,
    pub max: i64,
}

impl AxisRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: i64) -> bool {
        (self.min..=self.max).contains(&count)
    }

    /// 超出行程时返回 `OutOfRange`
    pub fn check(&self, axis: AxisId, target: i64) -> Result<(), ClientError> {
        if self.contains(target) {
            Ok(())
        } else {
            Err(ClientError::OutOfRange {
                axis,
                target,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// 各轴行程（未配置的轴不检查）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisRanges {
    pub gripper: Option<AxisRange>,
    pub elbow: Option<AxisRange>,
    pub shoulder: Option<AxisRange>,
    pub lift: Option<AxisRange>,
}

impl Default for AxisRanges {
    fn default() -> Self {
        Self {
            gripper: None,
            elbow: Some(AxisRange::new(0, 21_050)),
            shoulder: Some(AxisRange::new(0, 33_200)),
            lift: Some(AxisRange::new(0, 12_250)),
        }
    }
}

impl AxisRanges {
    /// 不检查任何轴
    pub fn unchecked() -> Self {
        Self {
            gripper: None,
            elbow: None,
            shoulder: None,
            lift: None,
        }
    }

    pub fn get(&self, axis: AxisId) -> Option<AxisRange> {
        match axis {
            AxisId::Gripper => self.gripper,
            AxisId::Elbow => self.elbow,
            AxisId::Shoulder => self.shoulder,
            AxisId::Lift => self.lift,
            _ => None,
        }
    }

    /// 检查一组目标，遇到第一个越界的轴即返回
    pub fn check_all(
        &self,
        targets: impl IntoIterator<Item = (AxisId, i64)>,
    ) -> Result<(), ClientError> {
        for (axis, target) in targets {
            if let Some(range) = self.get(axis) {
                range.check(axis, target)?;
            }
        }
        Ok(())
    }
}

/// 机械臂参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotParameters {
    pub geometry: ArmGeometry,
    /// 组件名称 → 固定位置
    pub components: BTreeMap<String, CartesianPoint>,
    /// 逻辑输出名称 → 输出通道号
    pub outputs: BTreeMap<String, u8>,
    pub ranges: AxisRanges,
    /// 设置输出后的等待时间（毫秒），留给执行器动作
    pub output_settle_ms: u64,
}

impl Default for RobotParameters {
    fn default() -> Self {
        let components =
            BTreeMap::from([("vial_gripper".to_string(), CartesianPoint::new(-188.36, 200.585))]);
        let outputs = BTreeMap::from([
            ("gripper".to_string(), 3),
            ("vial_gripper".to_string(), 5),
        ]);
        Self {
            geometry: ArmGeometry::default(),
            components,
            outputs,
            ranges: AxisRanges::default(),
            output_settle_ms: 200,
        }
    }
}

impl RobotParameters {
    /// 组件位置
    pub fn component(&self, name: &str) -> Result<CartesianPoint, ClientError> {
        self.components
            .get(name)
            .copied()
            .ok_or_else(|| ClientError::UnknownComponent(name.to_string()))
    }

    /// 逻辑输出对应的通道号
    pub fn output_channel(&self, name: &str) -> Result<u8, ClientError> {
        self.outputs
            .get(name)
            .copied()
            .ok_or_else(|| ClientError::UnknownOutput(name.to_string()))
    }

    pub fn output_settle(&self) -> Duration {
        Duration::from_millis(self.output_settle_ms)
    }
}

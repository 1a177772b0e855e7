//! 双连杆平面运动学
//!
//! 坐标系以肩关节为原点，y 轴指向台面远端，x 轴与之垂直：
//!
//! ```text
//!   y
//!   ^
//!   |   -+          ++
//!   |
//!   |      shoulder(o)
//!   |   --          +-
//!   +-----------------> x
//! ```
//!
//! 关节角由编码器计数换算：`(count - zero) / counts_per_rev * 2π`，
//! 肘关节方向与肩关节相反。关节坐标系相对上述坐标系旋转了 90°。

use crate::ClientError;
use crate::params::{ArmGeometry, CartesianPoint};
use nalgebra::{Rotation2, Vector2};
use n9_protocol::round_count;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// 判定目标与肩关节重合的距离阈值（mm）
const MIN_REACH_MM: f64 = 1e-9;

/// 一组关节解（编码器计数）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointSolution {
    pub shoulder: i64,
    pub elbow: i64,
}

impl JointSolution {
    pub const fn new(shoulder: i64, elbow: i64) -> Self {
        Self { shoulder, elbow }
    }
}

/// 正运动学：肩/肘计数 → 平面坐标
///
/// 结果加上标定修正量，与 [`inverse_kinematics`] 互逆。
pub fn forward_kinematics(geometry: &ArmGeometry, shoulder: i64, elbow: i64) -> CartesianPoint {
    let sh = (shoulder as f64 - geometry.shoulder_zero) / geometry.shoulder_counts_per_rev * TAU;
    let el = -(elbow as f64 - geometry.elbow_zero) / geometry.elbow_counts_per_rev * TAU;

    let joint_frame = Vector2::new(
        geometry.shoulder_elbow_mm * sh.cos() + geometry.elbow_gripper_mm * (sh + el).cos(),
        geometry.shoulder_elbow_mm * sh.sin() + geometry.elbow_gripper_mm * (sh + el).sin(),
    );
    // 关节坐标系 (x', y') 对应台面坐标 (-y', x')
    let table_frame = Rotation2::new(FRAC_PI_2) * joint_frame;
    CartesianPoint::from_vector(table_frame + geometry.offset().to_vector())
}

/// 逆运动学：平面坐标 → 两组关节解
///
/// 返回 `[肩顺时针解, 肩逆时针解]`。目标超出工作空间时返回 `UnreachablePosition`。
pub fn inverse_kinematics(
    geometry: &ArmGeometry,
    target: CartesianPoint,
) -> Result<[JointSolution; 2], ClientError> {
    let l1 = geometry.shoulder_elbow_mm;
    let l2 = geometry.elbow_gripper_mm;
    let corrected = target - geometry.offset();
    let (x, y) = (corrected.x, corrected.y);

    let pseudoline = corrected.norm();
    if !pseudoline.is_finite()
        || pseudoline > l1 + l2
        || pseudoline < (l1 - l2).abs()
        || pseudoline < MIN_REACH_MM
    {
        return Err(ClientError::UnreachablePosition {
            x: target.x,
            y: target.y,
        });
    }

    // 肘关节偏离伸直方向的角度（无符号）
    let gamma = PI - acos_clamped((x * x + y * y - l1 * l1 - l2 * l2) / (-2.0 * l1 * l2));
    let pseudoangle = y.atan2(x);
    // 肩-目标连线与上臂的夹角
    let inside = acos_clamped((l1 * l1 + pseudoline * pseudoline - l2 * l2) / (2.0 * l1 * pseudoline));

    let shoulder_counts =
        |angle: f64| angle / TAU * geometry.shoulder_counts_per_rev + geometry.shoulder_zero;
    let gamma_counts = gamma / TAU * geometry.elbow_counts_per_rev;

    let raw = [
        (
            shoulder_counts(pseudoangle - FRAC_PI_2 - inside),
            geometry.elbow_zero - gamma_counts,
        ),
        (
            shoulder_counts(pseudoangle - FRAC_PI_2 + inside),
            geometry.elbow_zero + gamma_counts,
        ),
    ];
    // 标定常数异常时不把 NaN 静默取整为 0
    if raw.iter().any(|(s, e)| !s.is_finite() || !e.is_finite()) {
        return Err(ClientError::UnreachablePosition {
            x: target.x,
            y: target.y,
        });
    }
    Ok(raw.map(|(shoulder, elbow)| JointSolution::new(round_count(shoulder), round_count(elbow))))
}

/// 选择与当前肩关节位置最近的解
///
/// 肩计数为负的解被丢弃；距离相同时取输入顺序中的第一个。
pub fn choose_branch(
    candidates: &[JointSolution],
    current_shoulder: i64,
) -> Result<JointSolution, ClientError> {
    let mut best: Option<JointSolution> = None;
    for candidate in candidates.iter().filter(|c| c.shoulder >= 0) {
        let closer = match best {
            Some(b) => {
                candidate.shoulder.abs_diff(current_shoulder) < b.shoulder.abs_diff(current_shoulder)
            },
            None => true,
        };
        if closer {
            best = Some(*candidate);
        }
    }
    best.ok_or_else(|| ClientError::NoValidSolution {
        candidates: candidates.iter().map(|c| (c.shoulder, c.elbow)).collect(),
    })
}

/// 数值误差可能让余弦略微越界
fn acos_clamped(cosine: f64) -> f64 {
    cosine.clamp(-1.0, 1.0).acos()
}

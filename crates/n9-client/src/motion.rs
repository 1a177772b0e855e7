//! 运动规划
//!
//! 把目标位置换算成各轴增量，决定执行顺序，并把相邻两轴打包成同步运动命令。
//!
//! 默认顺序（`delta = 当前 - 目标`，增量为零的轴不动）：
//!
//! | 升降轴 | 顺序 |
//! |--------|------|
//! | 上升（delta < 0） | 升降 → 夹爪 → 肘 → 肩 |
//! | 下降（delta > 0） | 肘 → 肩 → 夹爪 → 升降 |
//! | 不动 | 肘 → 肩 → 升降 → 夹爪 |
//!
//! 保留轴（4-6）总是排在最后。

use crate::ClientError;
use crate::params::CartesianPoint;
use n9_driver::{Pose, VaOverride};
use n9_protocol::{AxisId, MAX_COUNT};
use std::collections::BTreeMap;

/// 轴计数目标表，可附带一个平面坐标（由逆运动学换算成肩/肘目标后合并）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetMap {
    pub axes: BTreeMap<AxisId, i64>,
    pub cartesian: Option<CartesianPoint>,
}

impl TargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: AxisId, count: i64) -> Self {
        self.axes.insert(axis, count);
        self
    }

    pub fn cartesian(mut self, x: f64, y: f64) -> Self {
        self.cartesian = Some(CartesianPoint::new(x, y));
        self
    }
}

/// goto 目标
#[derive(Debug, Clone, PartialEq)]
pub enum GotoTarget {
    /// 单轴
    Axis(AxisId, i64),
    /// 多轴（可含平面坐标）
    Map(TargetMap),
    /// 组件表中的命名位置
    Component(String),
    /// 按顺序依次执行
    Sequence(Vec<GotoTarget>),
}

impl From<(AxisId, i64)> for GotoTarget {
    fn from((axis, count): (AxisId, i64)) -> Self {
        GotoTarget::Axis(axis, count)
    }
}

impl From<TargetMap> for GotoTarget {
    fn from(map: TargetMap) -> Self {
        GotoTarget::Map(map)
    }
}

impl From<CartesianPoint> for GotoTarget {
    fn from(point: CartesianPoint) -> Self {
        GotoTarget::Map(TargetMap {
            axes: BTreeMap::new(),
            cartesian: Some(point),
        })
    }
}

impl From<Vec<GotoTarget>> for GotoTarget {
    fn from(targets: Vec<GotoTarget>) -> Self {
        GotoTarget::Sequence(targets)
    }
}

/// goto 选项
#[derive(Debug, Clone, PartialEq)]
pub struct GotoOptions {
    /// 显式执行顺序（原样使用，不移动的轴被跳过）
    pub order: Option<Vec<AxisId>>,
    /// 是否两两打包为同步运动
    pub sync: bool,
    /// 速度/加速度覆盖
    pub va: VaOverride,
    /// 发出命令前检查轴行程
    pub check_ranges: bool,
}

impl Default for GotoOptions {
    fn default() -> Self {
        Self {
            order: None,
            sync: true,
            va: VaOverride::default(),
            check_ranges: true,
        }
    }
}

impl GotoOptions {
    /// 按轴字母设置显式顺序（如 `"sez"`）
    pub fn with_order(mut self, letters: &str) -> Result<Self, ClientError> {
        let order = AxisId::parse_order(letters).map_err(n9_driver::DriverError::from)?;
        self.order = Some(order);
        Ok(self)
    }

    pub fn without_sync(mut self) -> Self {
        self.sync = false;
        self
    }
}

/// 一条运动命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCommand {
    Move { axis: AxisId, target: i64 },
    MoveSync {
        first: (AxisId, i64),
        second: (AxisId, i64),
    },
}

impl MotionCommand {
    /// 命令注册表中的名称
    pub fn command_name(&self) -> &'static str {
        match self {
            MotionCommand::Move { .. } => "move",
            MotionCommand::MoveSync { .. } => "movesync",
        }
    }

    /// 不含速度/加速度的参数
    pub fn args(&self) -> Vec<f64> {
        match *self {
            MotionCommand::Move { axis, target } => vec![axis.index() as f64, target as f64],
            MotionCommand::MoveSync {
                first: (a, ta),
                second: (b, tb),
            } => vec![a.index() as f64, b.index() as f64, ta as f64, tb as f64],
        }
    }

    /// 命令发出后应写入跟踪位置的轴
    pub fn updates(&self) -> Vec<(AxisId, i64)> {
        match *self {
            MotionCommand::Move { axis, target } => vec![(axis, target)],
            MotionCommand::MoveSync { first, second } => vec![first, second],
        }
    }
}

/// 各轴增量（`当前 - 目标`），零增量的轴被丢弃
///
/// 绝对值超过 [`MAX_COUNT`] 的目标返回 `InvalidTarget`。
pub fn axis_deltas(
    pose: &Pose,
    targets: &BTreeMap<AxisId, i64>,
) -> Result<BTreeMap<AxisId, i64>, ClientError> {
    let mut deltas = BTreeMap::new();
    for (&axis, &target) in targets {
        let invalid = || ClientError::InvalidTarget { axis, target };
        if target.unsigned_abs() > MAX_COUNT.unsigned_abs() {
            return Err(invalid());
        }
        let delta = pose.count(axis).checked_sub(target).ok_or_else(invalid)?;
        if delta != 0 {
            deltas.insert(axis, delta);
        }
    }
    Ok(deltas)
}

/// 决定移动轴的执行顺序
pub fn order_axes(
    deltas: &BTreeMap<AxisId, i64>,
    explicit: Option<&[AxisId]>,
) -> Result<Vec<AxisId>, ClientError> {
    if let Some(explicit) = explicit {
        let mut order: Vec<AxisId> = Vec::with_capacity(deltas.len());
        for axis in explicit {
            if deltas.contains_key(axis) && !order.contains(axis) {
                order.push(*axis);
            }
        }
        if let Some(missing) = deltas.keys().find(|axis| !order.contains(*axis)) {
            return Err(ClientError::AxisNotOrdered(*missing));
        }
        return Ok(order);
    }

    let preferred: [AxisId; 4] = match deltas.get(&AxisId::Lift) {
        Some(delta) if *delta < 0 => [AxisId::Lift, AxisId::Gripper, AxisId::Elbow, AxisId::Shoulder],
        Some(_) => [AxisId::Elbow, AxisId::Shoulder, AxisId::Gripper, AxisId::Lift],
        None => [AxisId::Elbow, AxisId::Shoulder, AxisId::Lift, AxisId::Gripper],
    };
    let reserved = deltas.keys().filter(|axis| !AxisId::PRIMARY.contains(*axis));

    Ok(preferred
        .iter()
        .filter(|axis| deltas.contains_key(*axis))
        .chain(reserved)
        .copied()
        .collect())
}

/// 规划一组轴目标的运动命令
pub fn plan_moves(
    pose: &Pose,
    targets: &BTreeMap<AxisId, i64>,
    options: &GotoOptions,
) -> Result<Vec<MotionCommand>, ClientError> {
    let deltas = axis_deltas(pose, targets)?;
    let order = order_axes(&deltas, options.order.as_deref())?;
    let moves: Vec<(AxisId, i64)> = order
        .iter()
        .filter_map(|axis| targets.get(axis).map(|target| (*axis, *target)))
        .collect();

    if !options.sync {
        return Ok(moves
            .into_iter()
            .map(|(axis, target)| MotionCommand::Move { axis, target })
            .collect());
    }

    let mut commands = Vec::with_capacity(moves.len().div_ceil(2));
    for pair in moves.chunks(2) {
        commands.push(match *pair {
            [first, second] => MotionCommand::MoveSync { first, second },
            [(axis, target)] => MotionCommand::Move { axis, target },
            _ => continue,
        });
    }
    Ok(commands)
}

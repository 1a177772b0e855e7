//! 会话状态
//!
//! - `Pose`: 各轴编码器计数的唯一权威估计
//! - `ConnectionState`: 连接生命周期状态

use n9_protocol::AxisId;
use std::collections::BTreeMap;
use std::fmt;

/// 各轴位置（编码器计数）
///
/// 只有两种写入途径：位置查询（权威覆盖）和运动命令发出后的乐观更新。
/// 乐观更新不经硬件确认，运动中途失败时跟踪值会与实际位置不一致。
///
/// 更新总是整体生效：一组轴要么全部写入，要么都不写入。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pose {
    counts: BTreeMap<AxisId, i64>,
}

impl Pose {
    /// 主轴全部为零的位置（未回零前的初始估计）
    pub fn zeroed() -> Self {
        Self::from_counts(AxisId::PRIMARY.iter().map(|axis| (*axis, 0)))
    }

    pub fn from_counts(counts: impl IntoIterator<Item = (AxisId, i64)>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
        }
    }

    /// 某轴的跟踪值（未跟踪时为 `None`）
    pub fn get(&self, axis: AxisId) -> Option<i64> {
        self.counts.get(&axis).copied()
    }

    /// 某轴的跟踪值（未跟踪时视为 0）
    pub fn count(&self, axis: AxisId) -> i64 {
        self.get(axis).unwrap_or(0)
    }

    /// 写入一组轴
    pub fn apply(&mut self, updates: impl IntoIterator<Item = (AxisId, i64)>) {
        // 先收集再写入，迭代器中途 panic 不会留下部分更新
        let updates: Vec<_> = updates.into_iter().collect();
        self.counts.extend(updates);
    }

    /// 主轴清零
    pub fn reset_primary(&mut self) {
        self.apply(AxisId::PRIMARY.iter().map(|axis| (*axis, 0)));
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisId, i64)> + '_ {
        self.counts.iter().map(|(axis, count)| (*axis, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (axis, count) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", axis.name(), count)?;
            first = false;
        }
        Ok(())
    }
}

/// 连接状态
///
/// ```text
/// Connecting ──成功──> ConnectedUnhomed ──home()──> ConnectedHomed
///     │                      │                           │
///     └──尝试耗尽──> Offline  └───────disconnect()────────┴──> Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 离线模式：所有命令都是不触碰硬件的空操作
    Offline,
    /// 正在进行第 `attempt` 次连接尝试
    Connecting { attempt: u32 },
    /// 已连接，未回零
    ConnectedUnhomed,
    /// 已连接，已回零
    ConnectedHomed,
    /// 已断开（终态）
    Disconnected,
}

impl ConnectionState {
    pub fn description(&self) -> &'static str {
        match self {
            ConnectionState::Offline => "offline",
            ConnectionState::Connecting { .. } => "connecting",
            ConnectionState::ConnectedUnhomed => "connected (not homed)",
            ConnectionState::ConnectedHomed => "connected (homed)",
            ConnectionState::Disconnected => "disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            ConnectionState::ConnectedUnhomed | ConnectionState::ConnectedHomed
        )
    }
}

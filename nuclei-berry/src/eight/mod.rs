//! 邻域相关的基础操作.

use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 连通规则. 决定了哪些相邻像素被视为同一区域.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Connectivity {
    /// 4-邻接: 仅上下左右.
    #[default]
    Four,

    /// 8-邻接: 额外包括四个对角.
    Eight,
}

impl Connectivity {
    /// 获得 `pos` 在该连通规则下的邻居索引. 不检查越界.
    ///
    /// 越界方向上的索引会环绕为 `usize::MAX` 附近的值, 调用者需要自行过滤.
    pub fn neighbours(&self, pos: Idx2d) -> Vec<Idx2d> {
        match self {
            Self::Four => neighbour4(pos).to_vec(),
            Self::Eight => neighbour8(pos).to_vec(),
        }
    }
}

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

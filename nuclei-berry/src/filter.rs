//! 区域过滤器. 用于抑制阈值化产生的零星噪点.

use crate::consts::MIN_REGION_PIXELS;
use crate::BinaryMask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 以默认门限判断 `mask` 是否应当被保留.
///
/// 当且仅当前景像素数 **严格大于** [`MIN_REGION_PIXELS`] 时返回 `true`.
#[inline]
pub fn accept(mask: &BinaryMask) -> bool {
    RegionFilter::default().accept(mask)
}

/// 按前景像素数过滤区域的纯谓词.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RegionFilter {
    min_pixels: usize,
}

impl Default for RegionFilter {
    #[inline]
    fn default() -> Self {
        Self::new(MIN_REGION_PIXELS)
    }
}

impl RegionFilter {
    /// 保留像素数严格大于 `min_pixels` 的区域.
    #[inline]
    pub const fn new(min_pixels: usize) -> Self {
        Self { min_pixels }
    }

    /// 门限.
    #[inline]
    pub fn min_pixels(&self) -> usize {
        self.min_pixels
    }

    /// 像素数为 `area` 的区域是否应当被保留.
    #[inline]
    pub fn accept_area(&self, area: usize) -> bool {
        area > self.min_pixels
    }

    /// `mask` 是否应当被保留.
    #[inline]
    pub fn accept(&self, mask: &BinaryMask) -> bool {
        self.accept_area(mask.count())
    }
}

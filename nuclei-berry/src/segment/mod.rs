//! 分割器: 灰度图像 -> 标签图.
//!
//! 流程依次为:
//!
//! 1. 用 Otsu 方法从直方图中计算全局阈值;
//! 2. 二值化, 像素值严格大于阈值者为前景;
//! 3. 对前景做连通域标记.

mod label;
mod otsu;

pub use otsu::{binarize, otsu_threshold};

use crate::consts::{DEFAULT_CONNECTIVITY, OTSU_BINS};
use crate::eight::Connectivity;
use crate::{BinaryMask, IntensitySlice, LabelMap};

/// 一次分割的结果.
#[derive(Clone, Debug)]
pub struct Segmentation {
    /// Otsu 阈值. 图像为空或含有 NaN 时为 `None`.
    pub threshold: Option<f64>,

    /// 标签图.
    pub labels: LabelMap,
}

impl Segmentation {
    /// 区域个数.
    #[inline]
    pub fn region_count(&self) -> usize {
        self.labels.region_count()
    }

    /// 消费自我, 获得 `(标签图, 区域个数)`.
    #[inline]
    pub fn into_parts(self) -> (LabelMap, usize) {
        let count = self.labels.region_count();
        (self.labels, count)
    }
}

/// 以默认参数 (256 桶直方图, 4-邻接) 分割 `image`.
#[inline]
pub fn segment(image: &IntensitySlice) -> Segmentation {
    segment_with(image, OTSU_BINS, DEFAULT_CONNECTIVITY)
}

/// 以 `bins` 桶直方图计算阈值, 并按 `conn` 连通规则分割 `image`.
///
/// 常值图像与空图像不会导致 panic, 而是得到零个区域.
pub fn segment_with(image: &IntensitySlice, bins: usize, conn: Connectivity) -> Segmentation {
    let threshold = otsu_threshold(image, bins);
    let mask = match threshold {
        Some(t) => binarize(image, t),
        None => {
            log::warn!("无法为 {:?} 的图像计算阈值, 视为全背景", image.shape());
            BinaryMask::zeros(image.shape())
        }
    };
    let labels = mask.label(conn);
    log::trace!(
        "threshold = {threshold:?}, foreground = {}, regions = {}",
        mask.count(),
        labels.region_count()
    );
    Segmentation { threshold, labels }
}

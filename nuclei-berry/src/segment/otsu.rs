//! Otsu 全局阈值.

use crate::{BinaryMask, IntensitySlice};
use ordered_float::OrderedFloat;

/// 以 `bins` 个等宽桶统计 `image` 在 `[lo, hi]` 上的直方图.
///
/// 由调用者保证 `lo < hi`, 且 `image` 中不存在 NaN.
fn histogram(image: &IntensitySlice, lo: f64, hi: f64, bins: usize) -> Vec<u64> {
    debug_assert!(lo < hi);
    let scale = bins as f64 / (hi - lo);
    let mut hist = vec![0u64; bins];
    for &v in image.iter() {
        // 最大值落在最后一个桶内.
        let idx = (((v - lo) * scale) as usize).min(bins - 1);
        hist[idx] += 1;
    }
    hist
}

/// 用 Otsu 方法计算 `image` 的全局阈值.
///
/// 直方图在 `[min, max]` 上划分为 `bins` 个等宽桶 (至少 2 个),
/// 对每个候选划分计算类间方差 `w1 * w2 * (m1 - m2)^2`, 返回方差最大的划分处
/// 左侧桶的桶中心. 方差相同时取最靠左的桶. 对同一直方图, 结果是确定的.
///
/// # 返回值
///
/// - 图像为空或含有 NaN 时返回 `None`;
/// - 常值图像返回该常值. 由于二值化要求 **严格大于** 阈值, 此时不会产生前景;
/// - 其他情况下返回 `Some(threshold)`, 且 `min <= threshold < max`.
pub fn otsu_threshold(image: &IntensitySlice, bins: usize) -> Option<f64> {
    let (lo, hi) = image.min_max()?;
    if lo == hi {
        return Some(lo);
    }
    let bins = bins.max(2);
    let hist = histogram(image, lo, hi, bins);
    let bin_width = (hi - lo) / bins as f64;
    let centers: Vec<f64> = (0..bins)
        .map(|i| lo + bin_width * (i as f64 + 0.5))
        .collect();

    // 前缀: [0, i] 的权重与加权和; 后缀: [i, bins) 的权重与加权和.
    let mut weight1 = vec![0.0; bins];
    let mut moment1 = vec![0.0; bins];
    let (mut w, mut m) = (0.0, 0.0);
    for i in 0..bins {
        w += hist[i] as f64;
        m += hist[i] as f64 * centers[i];
        weight1[i] = w;
        moment1[i] = m;
    }
    let mut weight2 = vec![0.0; bins];
    let mut moment2 = vec![0.0; bins];
    let (mut w, mut m) = (0.0, 0.0);
    for i in (0..bins).rev() {
        w += hist[i] as f64;
        m += hist[i] as f64 * centers[i];
        weight2[i] = w;
        moment2[i] = m;
    }

    // 第一个桶含有最小值, 最后一个桶含有最大值, 因此下面的分母都不为 0.
    let variance12 = |i: usize| {
        let mean1 = moment1[i] / weight1[i];
        let mean2 = moment2[i + 1] / weight2[i + 1];
        weight1[i] * weight2[i + 1] * (mean1 - mean2).powi(2)
    };

    // `max_by_key` 在相等时返回最后一个, 所以倒序迭代以取到最靠左的桶.
    let best = (0..bins - 1)
        .rev()
        .max_by_key(|&i| OrderedFloat(variance12(i)))?;
    Some(centers[best])
}

/// 二值化: 像素值 **严格大于** `threshold` 的位置为前景, 否则为背景.
pub fn binarize(image: &IntensitySlice, threshold: f64) -> BinaryMask {
    BinaryMask::from_fn(image.shape(), |pos| image[pos] > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::OTSU_BINS;
    use crate::OwnedIntensitySlice;
    use ndarray::array;

    #[test]
    fn test_constant_image_has_no_foreground() {
        let img = OwnedIntensitySlice::from_shape_fn((4, 4), |_| 0.5);
        let t = otsu_threshold(&img.as_immut(), OTSU_BINS).unwrap();
        assert_eq!(t, 0.5);
        assert!(binarize(&img.as_immut(), t).is_background());
    }

    #[test]
    fn test_empty_or_nan_image() {
        let empty = OwnedIntensitySlice::from_shape_fn((0, 0), |_| 0.0);
        assert_eq!(otsu_threshold(&empty.as_immut(), OTSU_BINS), None);

        let nan = OwnedIntensitySlice::from_array(array![[0.0, f64::NAN], [1.0, 1.0]]);
        assert_eq!(otsu_threshold(&nan.as_immut(), OTSU_BINS), None);
    }

    #[test]
    fn test_two_levels_split_cleanly() {
        // 两个灰度级时, 任何落在两者之间的划分方差都相同, 取最靠左的桶.
        let img = OwnedIntensitySlice::from_array(array![
            [0.1, 0.1, 0.1, 0.1],
            [0.1, 0.9, 0.9, 0.1],
            [0.1, 0.9, 0.9, 0.1],
            [0.1, 0.1, 0.1, 0.1],
        ]);
        let t = otsu_threshold(&img.as_immut(), OTSU_BINS).unwrap();
        let expected = 0.1 + 0.8 / OTSU_BINS as f64 / 2.0;
        assert!((t - expected).abs() < 1e-12);
        let mask = binarize(&img.as_immut(), t);
        assert_eq!(mask.count(), 4);
        assert!(mask.is_foreground_at((1, 1)));
        assert!(!mask.is_foreground_at((0, 0)));
    }

    #[test]
    fn test_bimodal_threshold_between_modes() {
        // 暗背景 (0.1 ~ 0.2) 与亮目标 (0.7 ~ 0.8).
        let img = OwnedIntensitySlice::from_shape_fn((10, 10), |(h, w)| {
            let jitter = ((h * 7 + w * 3) % 10) as f64 / 100.0;
            if (3..7).contains(&h) && (3..7).contains(&w) {
                0.7 + jitter
            } else {
                0.1 + jitter
            }
        });
        let t = otsu_threshold(&img.as_immut(), OTSU_BINS).unwrap();
        assert!(t >= 0.19 && t < 0.7, "threshold {t}");
        assert_eq!(binarize(&img.as_immut(), t).count(), 16);
    }

    #[test]
    fn test_eight_bit_threshold_within_one_level() {
        // 归一化后的 8 位灰度. 按灰度级分桶时阈值恰为 12; 等宽分桶取桶中心,
        // 与之相差不到一个灰度级, 且亮的一类始终为前景.
        let levels = [10u8, 11, 12, 12, 11, 200, 201, 200];
        let img = OwnedIntensitySlice::from_raster((2, 4), &levels)
            .unwrap()
            .normalized(255.0);
        let t = otsu_threshold(&img.as_immut(), OTSU_BINS).unwrap();
        assert!((t - 12.0 / 255.0).abs() < 1.0 / 255.0, "threshold {t}");
        let mask = binarize(&img.as_immut(), t);
        for pos in [(1, 1), (1, 2), (1, 3)] {
            assert!(mask.is_foreground_at(pos));
        }
        for pos in [(0, 0), (0, 1), (1, 0)] {
            assert!(!mask.is_foreground_at(pos));
        }
    }

    #[test]
    fn test_threshold_is_deterministic() {
        let img = OwnedIntensitySlice::from_shape_fn((8, 9), |(h, w)| ((h * 31 + w * 17) % 23) as f64);
        let a = otsu_threshold(&img.as_immut(), OTSU_BINS);
        let b = otsu_threshold(&img.as_immut(), OTSU_BINS);
        assert_eq!(a, b);
        let (lo, hi) = img.as_immut().min_max().unwrap();
        let t = a.unwrap();
        assert!(lo <= t && t < hi);
    }

    #[test]
    fn test_binarize_is_strict() {
        let img = OwnedIntensitySlice::from_array(array![[0.5, 0.6], [0.4, 0.5]]);
        let mask = binarize(&img.as_immut(), 0.5);
        assert_eq!(mask.foreground_pos::<Vec<_>>(), vec![(0, 1)]);
    }
}

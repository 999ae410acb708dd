//! 完整流程: 灰度图像 -> 分割 -> 过滤 -> 编码 -> 提交表格.
//!
//! 每张图像的处理相互独立, 因此在 `rayon` feature 下可以按图像并行,
//! 并保证输出顺序与顺序执行时一致.

use crate::consts::{DEFAULT_CONNECTIVITY, MIN_REGION_PIXELS, OTSU_BINS};
use crate::dataset::{image_id_of, load_gray, LoadImageError, LoadResult};
use crate::eight::Connectivity;
use crate::filter::RegionFilter;
use crate::rle::RunLength;
use crate::segment::segment_with;
use crate::submission::{DetectionRecord, Submission};
use crate::IntensitySlice;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 流程参数.
///
/// 默认值: 像素数门限 10, 4-邻接, 256 桶直方图, 不输出占位行.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PipelineConfig {
    /// 区域像素数须严格大于该值才会被保留.
    pub min_region_pixels: usize,

    /// 连通规则.
    pub connectivity: Connectivity,

    /// Otsu 直方图桶数.
    pub bins: usize,

    /// 没有任何区域被保留的图像是否输出一行 `EncodedPixels` 为空的占位行.
    pub placeholder_rows: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_region_pixels: MIN_REGION_PIXELS,
            connectivity: DEFAULT_CONNECTIVITY,
            bins: OTSU_BINS,
            placeholder_rows: false,
        }
    }
}

impl PipelineConfig {
    /// 设置像素数门限.
    #[inline]
    pub fn with_min_region_pixels(mut self, n: usize) -> Self {
        self.min_region_pixels = n;
        self
    }

    /// 设置连通规则.
    #[inline]
    pub fn with_connectivity(mut self, conn: Connectivity) -> Self {
        self.connectivity = conn;
        self
    }

    /// 设置直方图桶数.
    ///
    /// # 注意
    ///
    /// `bins` 至少为 2, 否则程序 panic.
    #[inline]
    pub fn with_bins(mut self, bins: usize) -> Self {
        assert!(bins >= 2, "Otsu needs at least 2 bins, got {bins}");
        self.bins = bins;
        self
    }

    /// 设置是否输出占位行.
    #[inline]
    pub fn with_placeholder_rows(mut self, on: bool) -> Self {
        self.placeholder_rows = on;
        self
    }

    /// 对应的区域过滤器.
    #[inline]
    pub fn filter(&self) -> RegionFilter {
        RegionFilter::new(self.min_region_pixels)
    }
}

/// 处理一张图像, 得到该图像所有被保留区域的检测结果, 按标签升序.
pub fn scan_image(image_id: &str, image: &IntensitySlice, config: &PipelineConfig) -> Vec<DetectionRecord> {
    let seg = segment_with(image, config.bins, config.connectivity);
    let filter = config.filter();

    // 先按面积过滤, 只为被保留的区域构造掩膜.
    let mut ans: Vec<DetectionRecord> = seg
        .labels
        .labels()
        .zip(seg.labels.areas())
        .filter(|&(_, area)| filter.accept_area(area))
        .map(|(label, _)| {
            let mask = seg.labels.mask_of(label);
            DetectionRecord::new(image_id, RunLength::from_mask(&mask).to_string())
        })
        .collect();

    log::debug!(
        "{image_id}: threshold = {:?}, regions = {}, accepted = {}",
        seg.threshold,
        seg.region_count(),
        ans.len()
    );

    if ans.is_empty() && config.placeholder_rows {
        ans.push(DetectionRecord::placeholder(image_id));
    }
    ans
}

/// 读取并处理 `path` 处的图像. 图像标识取自文件上两级的目录名.
pub fn scan_path<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> LoadResult<Vec<DetectionRecord>> {
    let path = path.as_ref();
    let id = image_id_of(path).ok_or_else(|| LoadImageError::MissingImageId(path.to_owned()))?;
    let img = load_gray(path)?;
    Ok(scan_image(&id, &img.as_immut(), config))
}

/// 批量处理的结果. 单张图像的失败不会影响其它图像.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 所有成功处理的图像的检测结果, 按输入顺序拼接.
    pub submission: Submission,

    /// 处理失败的图像及原因, 按输入顺序.
    pub failures: Vec<(PathBuf, LoadImageError)>,
}

impl BatchOutcome {
    fn collect<I: IntoIterator<Item = (PathBuf, LoadResult<Vec<DetectionRecord>>)>>(it: I) -> Self {
        let mut per_image = Vec::new();
        let mut failures = Vec::new();
        for (path, res) in it {
            match res {
                Ok(records) => per_image.push(records),
                Err(e) => {
                    log::warn!("跳过 `{}`: {e}", path.display());
                    failures.push((path, e));
                }
            }
        }
        Self {
            submission: Submission::concat(per_image),
            failures,
        }
    }

    /// 是否所有图像都处理成功?
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 依次处理 `paths` 中的每张图像.
pub fn scan_paths<I: IntoIterator<Item = PathBuf>>(paths: I, config: &PipelineConfig) -> BatchOutcome {
    BatchOutcome::collect(paths.into_iter().map(|p| {
        let res = scan_path(&p, config);
        (p, res)
    }))
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;

        /// 按图像并行处理 `paths`. 输出与 [`scan_paths`] 完全相同.
        ///
        /// 使用当前所在的 `rayon` 线程池.
        pub fn par_scan_paths(paths: Vec<PathBuf>, config: &PipelineConfig) -> BatchOutcome {
            let results: Vec<_> = paths
                .into_par_iter()
                .map(|p| {
                    let res = scan_path(&p, config);
                    (p, res)
                })
                .collect();
            BatchOutcome::collect(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rle::decode;
    use crate::OwnedIntensitySlice;

    fn image_of(shape: (usize, usize), f: impl Fn(usize, usize) -> bool) -> OwnedIntensitySlice {
        OwnedIntensitySlice::from_shape_fn(shape, |(h, w)| if f(h, w) { 0.9 } else { 0.1 })
    }

    #[test]
    fn test_all_zero_image_yields_nothing() {
        let img = OwnedIntensitySlice::from_shape_fn((4, 4), |_| 0.0);
        let config = PipelineConfig::default();
        assert!(scan_image("zero", &img.as_immut(), &config).is_empty());

        let with_placeholder = config.with_placeholder_rows(true);
        assert_eq!(
            scan_image("zero", &img.as_immut(), &with_placeholder),
            vec![DetectionRecord::placeholder("zero")]
        );
    }

    #[test]
    fn test_nine_pixel_block_is_filtered_by_default() {
        let img = image_of((4, 4), |h, w| h < 3 && w < 3);
        assert!(scan_image("a", &img.as_immut(), &PipelineConfig::default()).is_empty());

        let config = PipelineConfig::default().with_min_region_pixels(8);
        assert_eq!(
            scan_image("a", &img.as_immut(), &config),
            vec![DetectionRecord::new("a", "1 3 5 3 9 3")]
        );
    }

    #[test]
    fn test_small_regions_never_emitted() {
        // 一个 4x4 (16 像素) 的块和一个 2x2 (4 像素) 的块.
        let img = image_of((10, 10), |h, w| (h < 4 && w < 4) || (h >= 7 && h < 9 && w >= 7 && w < 9));
        let records = scan_image("b", &img.as_immut(), &PipelineConfig::default());
        assert_eq!(records.len(), 1);
        let mask = decode(records[0].encoded_pixels(), (10, 10)).unwrap();
        assert_eq!(mask.count(), 16);
        assert!(mask.is_foreground_at((0, 0)));
        assert!(!mask.is_foreground_at((7, 7)));
    }

    #[test]
    fn test_records_follow_label_order() {
        // 右上方的块先被行优先扫描到, 因而标签较小.
        let img = image_of((12, 12), |h, w| (h < 4 && w >= 8) || (h >= 6 && h < 10 && w < 4));
        let records = scan_image("c", &img.as_immut(), &PipelineConfig::default());
        assert_eq!(records.len(), 2);
        let first = decode(records[0].encoded_pixels(), (12, 12)).unwrap();
        assert!(first.is_foreground_at((0, 8)));
        let second = decode(records[1].encoded_pixels(), (12, 12)).unwrap();
        assert!(second.is_foreground_at((6, 0)));
    }

    #[test]
    fn test_encoded_regions_are_disjoint() {
        let img = image_of((20, 20), |h, w| (h / 5 + w / 5) % 2 == 0 && h % 5 != 4 && w % 5 != 4);
        let records = scan_image("d", &img.as_immut(), &PipelineConfig::default());
        assert_eq!(records.len(), 8);
        let mut seen = crate::BinaryMask::zeros((20, 20));
        for r in records.iter() {
            let m = decode(r.encoded_pixels(), (20, 20)).unwrap();
            assert_eq!(m.count(), 16);
            for pos in m.foreground_pos::<Vec<_>>() {
                assert!(!seen.is_foreground_at(pos));
                seen[pos] = crate::consts::gray::FOREGROUND;
            }
        }
    }

    #[test]
    fn test_scan_paths_isolates_failures() {
        let outcome = scan_paths(
            vec![PathBuf::from("lonely.png"), PathBuf::from("/nowhere/y/images/y.png")],
            &PipelineConfig::default(),
        );
        assert!(outcome.submission.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(!outcome.is_clean());
        assert!(matches!(outcome.failures[0].1, LoadImageError::MissingImageId(_)));
        assert!(matches!(outcome.failures[1].1, LoadImageError::Decode { .. }));
    }

    #[test]
    fn test_area_filter_matches_mask_filter() {
        // 大量 1~3 像素的噪点, 夹杂少数大块.
        let img = image_of((30, 30), |h, w| {
            (h % 3 == 0 && w % 4 == 0) || (h % 3 == 0 && w % 4 == 1 && w % 8 == 1)
                || ((10..16).contains(&h) && (5..12).contains(&w))
                || ((20..28).contains(&h) && (18..21).contains(&w))
        });
        let config = PipelineConfig::default();
        let records = scan_image("e", &img.as_immut(), &config);

        let seg = segment_with(&img.as_immut(), config.bins, config.connectivity);
        let expected: Vec<_> = seg
            .labels
            .masks()
            .filter(|(_, m)| config.filter().accept(m))
            .map(|(_, m)| DetectionRecord::new("e", RunLength::from_mask(&m).to_string()))
            .collect();
        assert!(seg.region_count() > 50);
        assert_eq!(records, expected);
        assert_eq!(records.len(), 2);
    }

    #[test]
    #[should_panic]
    fn test_too_few_bins() {
        let _ = PipelineConfig::default().with_bins(1);
    }
}

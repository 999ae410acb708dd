use crate::consts::gray::*;
use crate::consts::BACKGROUND_LABEL;
use crate::eight::Connectivity;
use crate::{Area2d, Areas2d, Idx2d};
use ndarray::iter::Iter;
use ndarray::{Array2, ArrayView2, Ix2};
use num::ToPrimitive;
use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 不可变、借用的二维灰度图像.
///
/// 像素值以 `f64` 保存, 一般已归一化到 `[0, 1]`, 但分割算法本身不依赖这一点.
#[derive(Clone, Debug)]
pub struct IntensitySlice<'a> {
    /// 底层数据的轻量级视图.
    data: ArrayView2<'a, f64>,
}

impl<'a> IntensitySlice<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(data: ArrayView2<'a, f64>) -> Self {
        Self { data }
    }

    /// 获得 **底层** 数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f64, Ix2> {
        self.data.iter()
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&f64> {
        self.data.get(pos)
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 图像是否不含任何像素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 像素值的最小值与最大值.
    ///
    /// 图像为空或含有 NaN 时返回 `None`.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut it = self.data.iter().copied();
        let first = it.next()?;
        if first.is_nan() {
            return None;
        }
        let mut lo = first;
        let mut hi = first;
        for v in it {
            if v.is_nan() {
                return None;
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Some((lo, hi))
    }

    /// 图像是否为常值图像 (包括空图像).
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.min_max().map_or(true, |(lo, hi)| lo == hi)
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &f64)> {
        self.data.indexed_iter()
    }

    /// 克隆自己, 获得一个拥有所有权的图像对象.
    pub fn to_owned(&self) -> OwnedIntensitySlice {
        OwnedIntensitySlice {
            data: self.data.to_owned(),
        }
    }
}

impl<'a> From<ArrayView2<'a, f64>> for IntensitySlice<'a> {
    #[inline]
    fn from(data: ArrayView2<'a, f64>) -> Self {
        Self::new(data)
    }
}

impl Index<Idx2d> for IntensitySlice<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 拥有所有权的二维灰度图像.
///
/// `OwnedIntensitySlice` 仅提供到 `IntensitySlice` 的轻量转换和底层数据移动,
/// 以及若干构造方法.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct OwnedIntensitySlice {
    data: Array2<f64>,
}

impl OwnedIntensitySlice {
    /// 直接从底层数据初始化.
    #[inline]
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// 以 `f(索引)` 的值填充 `shape` 大小的图像.
    #[inline]
    pub fn from_shape_fn<F: FnMut(Idx2d) -> f64>(shape: Idx2d, f: F) -> Self {
        Self {
            data: Array2::from_shape_fn(shape, f),
        }
    }

    /// 从行优先存储的任意数值栅格构造图像.
    ///
    /// 当 `raster` 的长度与 `shape` 不符, 或存在无法转换为 `f64` 的值时,
    /// 返回 `None`.
    pub fn from_raster<T: ToPrimitive>(shape: Idx2d, raster: &[T]) -> Option<Self> {
        let (h, w) = shape;
        if raster.len() != h * w {
            return None;
        }
        let buf = raster
            .iter()
            .map(ToPrimitive::to_f64)
            .collect::<Option<Vec<f64>>>()?;
        Array2::from_shape_vec(shape, buf).ok().map(Self::from_array)
    }

    /// 所有像素值除以 `max`, 用于将整数栅格归一化到 `[0, 1]`.
    #[inline]
    pub fn normalized(mut self, max: f64) -> Self {
        self.data.mapv_inplace(|v| v / max);
        self
    }

    /// 获得不可变图像引用.
    #[inline]
    pub fn as_immut(&self) -> IntensitySlice<'_> {
        IntensitySlice::new(self.data.view())
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f64> {
        self.data
    }
}

/// 拥有所有权的二维二值掩膜. 像素值只有 [`BACKGROUND`] 和 [`FOREGROUND`] 两种.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryMask {
    data: Array2<u8>,
}

/// 拥有所有权的二维标签图. 0 代表背景, 每个正整数代表一个连通区域.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LabelMap {
    data: Array2<u32>,

    /// 区域个数, 即最大标签值.
    count: usize,
}

/// 掩膜与标签图共用的不可变方法集合.
macro_rules! impl_grid_immut {
    ($grid: ty, $elem: ty) => {
        /// 不可变方法集合.
        impl $grid {
            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<$elem> {
                self.data.view()
            }

            /// 直接获得底层数据.
            #[inline]
            pub fn into_raw(self) -> Array2<$elem> {
                self.data
            }

            /// 获取可以按行优先迭代像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, $elem, Ix2> {
                self.data.iter()
            }

            /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&$elem> {
                self.data.get(pos)
            }

            /// 分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                let (h, w) = self.shape();
                h * w
            }

            /// 获得高.
            #[inline]
            pub fn height(&self) -> usize {
                self.shape().0
            }

            /// 获得宽.
            #[inline]
            pub fn width(&self) -> usize {
                self.shape().1
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 获得 `pos` 在连通规则 `conn` 下的邻域像素索引. 保证返回的索引都不越界.
            pub fn neighbour_positions(&self, pos: Idx2d, conn: Connectivity) -> Vec<Idx2d> {
                conn.neighbours(pos)
                    .into_iter()
                    .filter(|p| self.check(*p))
                    .collect()
            }

            /// 以行优先规则, 获取能迭代所有索引的迭代器.
            #[inline]
            pub fn pos_iter(&self) -> impl ExactSizeIterator<Item = Idx2d> {
                ndarray::indices(self.shape()).into_iter()
            }

            /// 以行优先规则, 获取能迭代所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &$elem)> {
                self.data.indexed_iter()
            }
        }

        impl Index<Idx2d> for $grid {
            type Output = $elem;

            #[inline]
            fn index(&self, index: Idx2d) -> &Self::Output {
                &self.data[index]
            }
        }
    };
}

impl_grid_immut!(BinaryMask, u8);
impl_grid_immut!(LabelMap, u32);

impl BinaryMask {
    /// 创建 `shape` 大小的全背景掩膜.
    #[inline]
    pub fn zeros(shape: Idx2d) -> Self {
        Self {
            data: Array2::zeros(shape),
        }
    }

    /// 从底层数据初始化. 如果存在 0, 1 以外的像素值, 返回 `None`.
    pub fn from_array(data: Array2<u8>) -> Option<Self> {
        data.iter()
            .all(|&p| is_background(p) || is_foreground(p))
            .then_some(Self { data })
    }

    /// 以谓词 `f(索引)` 决定每个像素是否为前景.
    pub fn from_fn<F: FnMut(Idx2d) -> bool>(shape: Idx2d, mut f: F) -> Self {
        Self {
            data: Array2::from_shape_fn(shape, |pos| if f(pos) { FOREGROUND } else { BACKGROUND }),
        }
    }

    /// 创建 `shape` 大小的掩膜, 并将 `it` 中的每个索引设为前景.
    ///
    /// 如果有索引越界, 则程序 panic.
    pub fn from_positions<I: IntoIterator<Item = Idx2d>>(shape: Idx2d, it: I) -> Self {
        let mut mask = Self::zeros(shape);
        for pos in it {
            mask[pos] = FOREGROUND;
        }
        mask
    }

    /// 统计前景像素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&p| is_foreground(p)).count()
    }

    /// 该掩膜是否为全背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 给定位置是否是前景. 越界时返回 `false`.
    #[inline]
    pub fn is_foreground_at(&self, pos: Idx2d) -> bool {
        matches!(self.get(pos), Some(&p) if is_foreground(p))
    }

    /// 以 **列优先** (Fortran 序) 规则迭代所有像素值,
    /// 即先沿一列向下, 再前进到下一列.
    #[inline]
    pub fn column_major_iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.data.t().into_iter().copied()
    }

    /// 获取所有前景像素的索引 (行优先).
    pub fn foreground_pos<B: FromIterator<Idx2d>>(&self) -> B {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &p)| is_foreground(p).then_some(pos))
            .collect()
    }
}

impl IndexMut<Idx2d> for BinaryMask {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl LabelMap {
    /// 直接初始化. 由调用者保证 `count` 与 `data` 中的最大标签一致.
    #[inline]
    pub(crate) fn new(data: Array2<u32>, count: usize) -> Self {
        debug_assert_eq!(data.iter().copied().max().unwrap_or(0) as usize, count);
        Self { data, count }
    }

    /// 从底层数据初始化, 区域个数取最大标签值.
    pub fn from_array(data: Array2<u32>) -> Self {
        let count = data.iter().copied().max().unwrap_or(BACKGROUND_LABEL) as usize;
        Self { data, count }
    }

    /// 区域个数.
    #[inline]
    pub fn region_count(&self) -> usize {
        self.count
    }

    /// 获取所有有效标签, 升序.
    #[inline]
    pub fn labels(&self) -> impl Iterator<Item = u32> {
        1..=self.count as u32
    }

    /// 提取标签 `label` 对应的二值掩膜.
    pub fn mask_of(&self, label: u32) -> BinaryMask {
        BinaryMask {
            data: self
                .data
                .mapv(|l| if l == label && l != BACKGROUND_LABEL { FOREGROUND } else { BACKGROUND }),
        }
    }

    /// 按标签升序, 依次获取 `(标签, 掩膜)`.
    pub fn masks(&self) -> impl Iterator<Item = (u32, BinaryMask)> + '_ {
        self.labels().map(move |label| (label, self.mask_of(label)))
    }

    /// 所有区域合并后的前景掩膜.
    pub fn foreground_mask(&self) -> BinaryMask {
        BinaryMask {
            data: self
                .data
                .mapv(|l| if l == BACKGROUND_LABEL { BACKGROUND } else { FOREGROUND }),
        }
    }

    /// 每个区域的像素个数. 下标 `i` 对应标签 `i + 1`.
    pub fn areas(&self) -> Vec<usize> {
        let mut ans = vec![0; self.count];
        for &l in self.data.iter().filter(|&&l| l != BACKGROUND_LABEL) {
            ans[l as usize - 1] += 1;
        }
        ans
    }

    /// 每个区域包含的像素索引 (行优先). 下标 `i` 对应标签 `i + 1`.
    pub fn regions(&self) -> Areas2d {
        let mut ans: Areas2d = vec![Area2d::new(); self.count];
        for (pos, &l) in self.data.indexed_iter() {
            if l != BACKGROUND_LABEL {
                ans[l as usize - 1].push(pos);
            }
        }
        ans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_min_max_and_constant() {
        let img = OwnedIntensitySlice::from_array(array![[0.5, 0.1], [0.9, 0.3]]);
        assert_eq!(img.as_immut().min_max(), Some((0.1, 0.9)));
        assert!(!img.as_immut().is_constant());

        let flat = OwnedIntensitySlice::from_shape_fn((3, 3), |_| 0.25);
        assert!(flat.as_immut().is_constant());

        let nan = OwnedIntensitySlice::from_array(array![[0.5, f64::NAN]]);
        assert_eq!(nan.as_immut().min_max(), None);

        let empty = OwnedIntensitySlice::from_shape_fn((0, 4), |_| 1.0);
        assert!(empty.as_immut().is_empty());
        assert_eq!(empty.as_immut().min_max(), None);
    }

    #[test]
    fn test_from_raster() {
        let img = OwnedIntensitySlice::from_raster((2, 3), &[0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(img.shape(), (2, 3));
        assert_eq!(img.as_immut()[(1, 0)], 3.0);
        assert!(OwnedIntensitySlice::from_raster((2, 2), &[0u16, 1, 2]).is_none());

        let unit = OwnedIntensitySlice::from_raster((1, 3), &[0u16, 255, 65535])
            .unwrap()
            .normalized(65535.0);
        assert_eq!(unit.as_immut()[(0, 0)], 0.0);
        assert_eq!(unit.as_immut()[(0, 2)], 1.0);
    }

    #[test]
    fn test_mask_from_array_rejects_other_values() {
        assert!(BinaryMask::from_array(array![[0u8, 1], [1, 0]]).is_some());
        assert!(BinaryMask::from_array(array![[0u8, 2], [1, 0]]).is_none());
    }

    #[test]
    fn test_column_major_iter() {
        // 1 0
        // 1 1
        // 0 0
        let mask = BinaryMask::from_positions((3, 2), [(0, 0), (1, 0), (1, 1)]);
        let v: Vec<u8> = mask.column_major_iter().collect();
        assert_eq!(v, vec![1, 1, 0, 0, 1, 0]);
        assert_eq!(mask.count(), 3);
        assert!(mask.is_foreground_at((1, 1)));
        assert!(!mask.is_foreground_at((9, 9)));
    }

    #[test]
    fn test_label_map_masks_and_areas() {
        let labels = LabelMap::from_array(array![[1u32, 0, 2], [1, 0, 2], [0, 0, 2]]);
        assert_eq!(labels.region_count(), 2);
        assert_eq!(labels.areas(), vec![2, 3]);
        assert_eq!(labels.mask_of(1).count(), 2);
        assert_eq!(labels.mask_of(0).count(), 0);
        assert_eq!(labels.foreground_mask().count(), 5);
        assert_eq!(labels.regions()[1], vec![(0, 2), (1, 2), (2, 2)]);
        assert_eq!(labels.masks().count(), 2);
    }

    #[test]
    fn test_pos_iter_is_row_major() {
        let mask = BinaryMask::zeros((2, 3));
        let it = mask.pos_iter();
        assert_eq!(it.len(), 6);
        assert_eq!(
            it.collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(BinaryMask::zeros((0, 4)).pos_iter().len(), 0);
    }

    #[test]
    fn test_neighbour_positions_in_bounds() {
        let mask = BinaryMask::zeros((2, 2));
        assert_eq!(mask.neighbour_positions((0, 0), Connectivity::Four).len(), 2);
        assert_eq!(mask.neighbour_positions((0, 0), Connectivity::Eight).len(), 3);
    }
}

//! 游程编码 (Run-Length Encoding).
//!
//! 编码规则 (同时也是下游解码的约定):
//!
//! 1. 掩膜按 **列优先** (Fortran 序) 展平, 即先沿每一列向下, 再前进到下一列.
//!   `(h, w)` 对应的 0 起始下标为 `h + w * height`.
//! 2. 收集所有前景像素的下标, 将差值恰为 1 的连续下标合并为一个游程.
//! 3. 每个游程记为 `起点 长度`, 其中起点从 **1** 开始计数.
//! 4. 所有游程按起点升序, 以单个空格连接为 `起点 长度 起点 长度 ...`.
//!
//! 全背景掩膜编码为空字符串.

mod error;

pub use error::RleError;

use crate::consts::gray::*;
use crate::consts::RLE_SEPARATOR;
use crate::{BinaryMask, Idx2d};
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RLE 解析/解码结果.
pub type RleResult<T> = Result<T, RleError>;

/// 单个游程.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Run {
    /// 起点, 从 1 开始计数.
    pub start: usize,

    /// 长度, 至少为 1.
    pub len: usize,
}

impl Run {
    /// 紧跟在该游程之后的位置 (从 1 开始计数).
    ///
    /// 只对经过 [`RunLength::from_runs`] 检查或由掩膜编码得到的游程保证不溢出.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// 游程覆盖的所有 0 起始下标.
    #[inline]
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start - 1..self.end() - 1
    }
}

/// 一个掩膜的完整游程记录.
///
/// 不变式: 游程按起点严格递增, 互不重叠, 且每个长度都不小于 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Run>", into = "Vec<Run>"))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunLength {
    runs: Vec<Run>,
}

impl RunLength {
    /// 对 `mask` 进行游程编码.
    pub fn from_mask(mask: &BinaryMask) -> Self {
        let runs = mask
            .column_major_iter()
            .positions(is_foreground)
            .map(|idx| Run { start: idx + 1, len: 1 })
            .coalesce(|prev, cur| {
                if prev.end() == cur.start {
                    Ok(Run {
                        start: prev.start,
                        len: prev.len + 1,
                    })
                } else {
                    Err((prev, cur))
                }
            })
            .collect();
        Self { runs }
    }

    /// 从游程序列构造记录. 会检查不变式, 且保证每个游程的末尾都不溢出.
    pub fn from_runs(runs: Vec<Run>) -> RleResult<Self> {
        let mut prev_end = 1usize;
        for run in runs.iter() {
            if run.start == 0 {
                return Err(RleError::ZeroStart);
            }
            if run.len == 0 {
                return Err(RleError::ZeroLength { start: run.start });
            }
            if run.start < prev_end {
                return Err(RleError::Unordered {
                    prev_end,
                    start: run.start,
                });
            }
            prev_end = run.start.checked_add(run.len).ok_or(RleError::Overflow {
                start: run.start,
                len: run.len,
            })?;
        }
        Ok(Self { runs })
    }

    /// 所有游程.
    #[inline]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// 游程个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// 是否不含任何游程 (即全背景).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// 前景像素总数.
    #[inline]
    pub fn area(&self) -> usize {
        self.runs.iter().map(|r| r.len).sum()
    }

    /// 展平为交替的 `起点, 长度, 起点, 长度, ...` 序列.
    pub fn flattened(&self) -> Vec<usize> {
        self.runs.iter().flat_map(|r| [r.start, r.len]).collect()
    }

    /// 在给定分辨率 `(height, width)` 下还原掩膜.
    ///
    /// 如果有游程超出 `height * width` 的范围, 返回 `Err(RleError::OutOfBounds)`.
    pub fn to_mask(&self, shape: Idx2d) -> RleResult<BinaryMask> {
        let height = shape.0;
        let size = height * shape.1;
        if let Some(run) = self.runs.last() {
            let last = run.start.checked_add(run.len - 1).ok_or(RleError::Overflow {
                start: run.start,
                len: run.len,
            })?;
            if last > size {
                return Err(RleError::OutOfBounds { last, size });
            }
        }
        let mut mask = BinaryMask::zeros(shape);
        for idx in self.runs.iter().flat_map(Run::indices) {
            mask[(idx % height, idx / height)] = FOREGROUND;
        }
        Ok(mask)
    }
}

impl TryFrom<Vec<Run>> for RunLength {
    type Error = RleError;

    #[inline]
    fn try_from(runs: Vec<Run>) -> Result<Self, Self::Error> {
        Self::from_runs(runs)
    }
}

impl From<RunLength> for Vec<Run> {
    #[inline]
    fn from(rle: RunLength) -> Self {
        rle.runs
    }
}

impl From<&BinaryMask> for RunLength {
    #[inline]
    fn from(mask: &BinaryMask) -> Self {
        Self::from_mask(mask)
    }
}

/// 以单个空格连接的 `起点 长度 ...` 形式.
impl fmt::Display for RunLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flattened().iter().join(RLE_SEPARATOR))
    }
}

/// 解析 `起点 长度 ...` 形式的字符串. 任意空白都被视为分隔符; 空串得到空记录.
impl FromStr for RunLength {
    type Err = RleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|t| {
                t.parse::<usize>()
                    .map_err(|_| RleError::InvalidToken(t.to_string()))
            })
            .collect::<RleResult<Vec<usize>>>()?;
        if values.len() % 2 != 0 {
            return Err(RleError::OddTokens(values.len()));
        }
        let runs = values
            .into_iter()
            .tuples()
            .map(|(start, len)| Run { start, len })
            .collect();
        Self::from_runs(runs)
    }
}

/// 将 `mask` 编码为 RLE 字符串.
#[inline]
pub fn encode(mask: &BinaryMask) -> String {
    RunLength::from_mask(mask).to_string()
}

/// 在给定分辨率 `(height, width)` 下, 将 RLE 字符串 `rle` 解码为掩膜.
#[inline]
pub fn decode(rle: &str, shape: Idx2d) -> RleResult<BinaryMask> {
    rle.parse::<RunLength>()?.to_mask(shape)
}

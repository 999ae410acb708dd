//! RLE 解析与解码错误.

use std::fmt;

/// RLE 字符串不合法.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RleError {
    /// 数值个数为奇数, 无法配成 `(起点, 长度)` 对. 参数为数值个数.
    OddTokens(usize),

    /// 存在无法解析为非负整数的片段.
    InvalidToken(String),

    /// 起点为 0. 起点从 1 开始计数.
    ZeroStart,

    /// 游程长度为 0.
    ZeroLength {
        /// 该游程的起点.
        start: usize,
    },

    /// 游程没有严格递增, 或与前一个游程重叠.
    Unordered {
        /// 前一个游程的末尾 (不含).
        prev_end: usize,

        /// 当前游程的起点.
        start: usize,
    },

    /// 游程末尾超出了 `usize` 的表示范围.
    Overflow {
        /// 该游程的起点.
        start: usize,

        /// 该游程的长度.
        len: usize,
    },

    /// 游程超出了掩膜范围.
    OutOfBounds {
        /// 游程最后一个像素的位置 (从 1 开始计数).
        last: usize,

        /// 掩膜像素总数.
        size: usize,
    },
}

impl fmt::Display for RleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddTokens(n) => write!(f, "odd number of values in RLE: {n}"),
            Self::InvalidToken(t) => write!(f, "invalid RLE value `{t}`"),
            Self::ZeroStart => write!(f, "RLE start positions are 1-based, got 0"),
            Self::ZeroLength { start } => write!(f, "zero-length run at {start}"),
            Self::Unordered { prev_end, start } => {
                write!(f, "run at {start} overlaps or precedes previous run ending at {prev_end}")
            }
            Self::Overflow { start, len } => {
                write!(f, "run at {start} with length {len} overflows")
            }
            Self::OutOfBounds { last, size } => {
                write!(f, "run ending at {last} exceeds mask size {size}")
            }
        }
    }
}

impl std::error::Error for RleError {}

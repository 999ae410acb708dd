#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对显微镜细胞核图像进行全局阈值分割、连通域标记,
//! 并将每个细胞核区域编码为竞赛提交所需的游程编码 (RLE) 字符串.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 按 Kaggle Data Science Bowl 2018 的目录格式组织数据
//!   (`<root>/<image_id>/images/<image_id>.png`), 没有对其它源的数据进行直接适配.
//! 2. 核心算法 (分割器与编码器) 都是纯函数, 不持有共享可变状态,
//!   因此可以安全地在多张图像上并发调用.
//!
//! # 约定
//!
//! 以下约定决定了输出的正确性与 RLE 的可逆性, 全部以常量形式固定在 [`consts`] 中:
//!
//! 1. 图像按 `(h, w)` 索引, 即 `(行, 列)`.
//! 2. RLE 按 **列优先** (Fortran 序) 展平掩膜, 起始位置从 1 开始计数.
//! 3. 连通域默认按 4-邻接规则划分, 标签按行优先扫描序从 1 开始分配, 背景为 0.
//!
//! # 开发计划
//!
//! ### Otsu 全局阈值 ✅
//!
//! 以 256 个等宽直方图桶估计阈值, 取类间方差最大的桶中心.
//!
//! 实现位于 `nuclei-berry/src/segment/otsu.rs`.
//!
//! ### 连通域标记 ✅
//!
//! 4-邻接 (默认) 或 8-邻接 BFS 标记.
//!
//! 实现位于 `nuclei-berry/src/segment/label.rs`.
//!
//! ### 游程编码与解码 ✅
//!
//! 实现位于 `nuclei-berry/src/rle`.
//!
//! ### 数据集遍历与图像灰度化 ✅
//!
//! 实现位于 `nuclei-berry/src/dataset`.
//!
//! ### 提交表格 ✅
//!
//! 显式的 `DetectionRecord` 类型, 以及按固定列序写出的 CSV.
//!
//! 实现位于 `nuclei-berry/src/submission`.
//!
//! ### 小功能 ✅
//!
//! 1. 将掩膜与标签图保存为 PNG, 便于调试. ✅
//! 2. `rayon` feature 下的多图像并行扫描. ✅

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;

/// 二维图像、掩膜与标签图的基础数据结构.
mod data;

pub use data::{BinaryMask, ImgWriteRaw, ImgWriteVis, IntensitySlice, LabelMap, OwnedIntensitySlice};

pub mod consts;

pub mod eight;

pub mod segment;

pub mod filter;

pub mod rle;

pub mod dataset;

pub mod submission;

pub mod pipeline;

pub mod prelude;

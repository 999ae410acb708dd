//! 二维灰度图像、二值掩膜与标签图.

pub mod slice;

pub use slice::{BinaryMask, ImgWriteRaw, ImgWriteVis, IntensitySlice, LabelMap, OwnedIntensitySlice};

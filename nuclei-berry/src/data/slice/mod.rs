//! 灰度图像/二值掩膜/标签图对象的操作.

mod core;
mod save;

pub use core::{BinaryMask, IntensitySlice, LabelMap, OwnedIntensitySlice};

pub use save::{ImgWriteRaw, ImgWriteVis};

//! 掩膜与标签图的持久化存储, 主要用于调试.

use crate::consts::gray::*;
use crate::consts::BACKGROUND_LABEL;
use crate::{BinaryMask, LabelMap};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 这意味着, 对于 `BinaryMask`
/// 这类仅存在 0, 1 像素值的图像, 在保存时会映射为黑白两色;
/// 对于 `LabelMap`, 不同标签会被映射到肉眼较易区分的不同灰度.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的图像对象.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 使掩膜像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(pixel: u8) -> u8 {
    match pixel {
        BACKGROUND => BLACK,
        FOREGROUND => WHITE,
        any_else => panic!("只允许掩膜存在 0, 1 像素, 但发现了 `{any_else}`"),
    }
}

/// 将标签映射到 `[DARK_GRAY, WHITE]` 之间循环分布的灰度, 背景为黑色.
#[inline]
pub(crate) fn pretty_label(label: u32) -> u8 {
    const LEVELS: u32 = (WHITE - DARK_GRAY) as u32 + 1;
    if label == BACKGROUND_LABEL {
        BLACK
    } else {
        // 相邻标签间隔 37 个灰度, 避免相邻区域颜色过于接近.
        DARK_GRAY + (label.wrapping_mul(37) % LEVELS) as u8
    }
}

/// 黑色背景, 白色前景.
impl ImgWriteVis for BinaryMask {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
        }
        buf.save(path)
    }
}

/// 黑色背景, 各区域为不同灰度.
impl ImgWriteVis for LabelMap {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &label) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([pretty_label(label)]));
        }
        buf.save(path)
    }
}

/// 按原样存储.
impl ImgWriteRaw for BinaryMask {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
        }
        buf.save(path)
    }
}

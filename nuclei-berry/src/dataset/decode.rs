//! 图像解码与灰度化.

use crate::consts::LUMA_WEIGHTS;
use crate::OwnedIntensitySlice;
use std::fmt;
use std::path::{Path, PathBuf};

/// 读取单张图像时的错误.
#[derive(Debug)]
pub enum LoadImageError {
    /// 文件无法打开或解码.
    Decode {
        /// 图像路径.
        path: PathBuf,

        /// 底层错误.
        source: image::ImageError,
    },

    /// 无法从路径中得到图像标识.
    MissingImageId(PathBuf),

    /// 图像不含任何像素.
    Empty(PathBuf),

    /// 解码得到的像素个数与分辨率不符.
    Raster(PathBuf),
}

impl LoadImageError {
    /// 出错的图像路径.
    pub fn path(&self) -> &Path {
        match self {
            Self::Decode { path, .. }
            | Self::MissingImageId(path)
            | Self::Empty(path)
            | Self::Raster(path) => path,
        }
    }
}

impl fmt::Display for LoadImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, source } => {
                write!(f, "failed to decode `{}`: {source}", path.display())
            }
            Self::MissingImageId(path) => {
                write!(f, "cannot derive image id from `{}`", path.display())
            }
            Self::Empty(path) => write!(f, "image `{}` has no pixels", path.display()),
            Self::Raster(path) => {
                write!(f, "pixel count of `{}` does not match its size", path.display())
            }
        }
    }
}

impl std::error::Error for LoadImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// 图像读取结果.
pub type LoadResult<T> = Result<T, LoadImageError>;

/// 读取 `path` 处的图像, 并转换为取值 `[0, 1]` 的灰度图.
///
/// 1. 灰度图 (含带透明通道的灰度图) 按位深归一化;
/// 2. 彩色图丢弃透明通道, 以 `0.2125 R + 0.7154 G + 0.0721 B` 计算亮度.
pub fn load_gray<P: AsRef<Path>>(path: P) -> LoadResult<OwnedIntensitySlice> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| LoadImageError::Decode {
        path: path.to_owned(),
        source,
    })?;

    const SCALE: f64 = u16::MAX as f64;
    let ans = if img.color().has_color() {
        let [wr, wg, wb] = LUMA_WEIGHTS;
        let buf = img.to_rgb16();
        let (w, h) = buf.dimensions();
        OwnedIntensitySlice::from_shape_fn((h as usize, w as usize), |(y, x)| {
            let [r, g, b] = buf.get_pixel(x as u32, y as u32).0;
            (wr * r as f64 + wg * g as f64 + wb * b as f64) / SCALE
        })
    } else {
        let buf = img.to_luma16();
        let (w, h) = buf.dimensions();
        OwnedIntensitySlice::from_raster((h as usize, w as usize), buf.as_raw())
            .ok_or_else(|| LoadImageError::Raster(path.to_owned()))?
            .normalized(SCALE)
    };

    if ans.as_immut().is_empty() {
        return Err(LoadImageError::Empty(path.to_owned()));
    }
    Ok(ans)
}

//! 图像加载器.
//!
//! 提供迭代器风格的数据集获取模式.

use super::decode::{load_gray, LoadImageError, LoadResult};
use super::image_id_of;
use crate::OwnedIntensitySlice;
use std::path::PathBuf;

/// 从图像路径列表创建加载器. 加载器按 `paths` 的顺序依次读取图像.
///
/// # 注意
///
/// 路径不存在、无法解码或无法从路径得到图像标识时, 加载器不会中止,
/// 而是在对应的位置返回 `Result::Error`.
pub fn image_loader<I: IntoIterator<Item = PathBuf>>(paths: I) -> ImageLoader {
    let mut data: Vec<PathBuf> = paths.into_iter().collect();
    data.reverse();
    ImageLoader { data_rev: data }
}

/// 灰度图像加载器. 每次迭代产生 `(路径, (图像标识, 灰度图))`.
#[derive(Debug)]
pub struct ImageLoader {
    data_rev: Vec<PathBuf>,
}

impl Iterator for ImageLoader {
    type Item = (PathBuf, LoadResult<(String, OwnedIntensitySlice)>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.data_rev.pop()?;

        let data = match image_id_of(&path) {
            Some(id) => load_gray(&path).map(|img| (id, img)),
            None => Err(LoadImageError::MissingImageId(path.clone())),
        };

        Some((path, data))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.data_rev.len();
        (n, Some(n))
    }
}

impl ExactSizeIterator for ImageLoader {
    #[inline]
    fn len(&self) -> usize {
        self.data_rev.len()
    }
}

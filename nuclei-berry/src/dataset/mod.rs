//! 数据集操作.
//!
//! 数据集按如下目录格式组织, 每张图像的标识取自其上两级的目录名:
//!
//! ```text
//! <root>/
//!   <image_id>/
//!     images/
//!       <image_id>.png
//! ```

use crate::consts::{IMAGES_SUBDIR, IMAGE_EXTENSION};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

mod decode;
mod loader;

pub use decode::{load_gray, LoadImageError, LoadResult};
pub use loader::{image_loader, ImageLoader};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

/// 获取图像文件 `path` 对应的图像标识, 即文件上两级的目录名.
///
/// 例如 `stage1_test/0a84/images/0a84.png` 的标识为 `0a84`.
/// 路径层级不足或目录名不是合法 UTF-8 时返回 `None`.
pub fn image_id_of<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .parent()?
        .parent()?
        .file_name()?
        .to_str()
        .map(str::to_owned)
}

/// 遍历数据集目录时的错误.
#[derive(Debug)]
pub enum ScanError {
    /// 根目录不存在或不是目录.
    NotADirectory(PathBuf),

    /// 读取目录失败.
    Io(io::Error),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADirectory(p) => write!(f, "`{}` is not a directory", p.display()),
            Self::Io(e) => write!(f, "failed to read dataset directory: {e}"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NotADirectory(_) => None,
        }
    }
}

impl From<io::Error> for ScanError {
    #[inline]
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// 数据集遍历结果.
pub type ScanResult<T> = Result<T, ScanError>;

fn is_image_file(path: &Path) -> bool {
    path.is_file() && path.extension() == Some(OsStr::new(IMAGE_EXTENSION))
}

/// 找到 `root` 下所有形如 `<root>/*/images/*.png` 的图像文件.
///
/// 结果按路径排序, 因此对同一个目录树, 每次调用得到的顺序都相同.
/// 没有 `images` 子目录的条目会被忽略.
pub fn discover<P: AsRef<Path>>(root: P) -> ScanResult<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_owned()));
    }

    let mut ans = Vec::new();
    for entry in fs::read_dir(root)? {
        let images = entry?.path().join(IMAGES_SUBDIR);
        if !images.is_dir() {
            continue;
        }
        for file in fs::read_dir(&images)? {
            let file = file?.path();
            if is_image_file(&file) {
                ans.push(file);
            }
        }
    }
    ans.sort_unstable();
    log::debug!("在 `{}` 下找到 {} 张图像", root.display(), ans.len());
    Ok(ans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("nuclei-berry-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_image_id_is_two_levels_up() {
        assert_eq!(
            image_id_of("stage1_test/abc123/images/abc123.png").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            image_id_of("/data/x/images/other-name.png").as_deref(),
            Some("x")
        );
        assert_eq!(image_id_of("a.png"), None);
    }

    #[test]
    fn test_home_dataset_dir_with() {
        if let Some(home) = home_dataset_dir() {
            let p = home_dataset_dir_with(["stage1_test"]).unwrap();
            assert_eq!(p, home.join("stage1_test"));
        }
    }

    #[test]
    fn test_discover_follows_layout() {
        let root = temp_root("discover");
        for id in ["b", "a"] {
            let images = root.join(id).join(IMAGES_SUBDIR);
            fs::create_dir_all(&images).unwrap();
            fs::write(images.join(format!("{id}.png")), b"").unwrap();
            fs::write(images.join("notes.txt"), b"").unwrap();
        }
        // 没有 images 子目录, 被忽略.
        fs::create_dir_all(root.join("c").join("masks")).unwrap();
        fs::write(root.join("c").join("masks").join("c.png"), b"").unwrap();

        let found = discover(&root).unwrap();
        let ids: Vec<_> = found.iter().filter_map(image_id_of).collect();
        assert_eq!(ids, vec!["a", "b"]);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_discover_missing_root() {
        let root = std::env::temp_dir().join("nuclei-berry-surely-missing-dir");
        assert!(matches!(
            discover(&root),
            Err(ScanError::NotADirectory(_))
        ));
    }
}

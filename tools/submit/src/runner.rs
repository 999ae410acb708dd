//! 程序运行函数.

use crate::result::RunSummary;
use nuclei_berry::dataset::ScanError;
use nuclei_berry::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{fmt, fs, io};
use utils::loader;

/// 运行失败的原因.
#[derive(Debug)]
pub enum RunError {
    /// 既没有设置 `$NUCLEI_IMAGES_DIR`, 也找不到用户主目录.
    NoDataset,

    /// 遍历数据集失败.
    Scan(ScanError),

    /// 线程池创建失败.
    ThreadPool(rayon::ThreadPoolBuildError),

    /// 写出提交文件失败.
    Save(PathBuf, io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDataset => write!(f, "dataset directory not found, set $NUCLEI_IMAGES_DIR"),
            Self::Scan(e) => write!(f, "{e}"),
            Self::ThreadPool(e) => write!(f, "thread pool error: {e}"),
            Self::Save(p, e) => write!(f, "failed to write `{}`: {e}", p.display()),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoDataset => None,
            Self::Scan(e) => Some(e),
            Self::ThreadPool(e) => Some(e),
            Self::Save(_, e) => Some(e),
        }
    }
}

impl From<ScanError> for RunError {
    #[inline]
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for RunError {
    #[inline]
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e)
    }
}

/// 实际运行.
pub fn run() -> Result<RunSummary, RunError> {
    let root = loader::images_dir_from_env_or_home().ok_or(RunError::NoDataset)?;
    let paths = loader::image_paths(&root)?;
    let config = loader::config_from_env();
    let output = loader::submission_path_from_env();
    let n_images = paths.len();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(utils::cpus())
        .build()?;

    log::info!("Scanning {n_images} images under `{}`...", root.display());
    let start = Instant::now();
    let outcome = pool.install(|| par_scan_paths(paths, &config));
    let elapsed = start.elapsed();

    if let Some(dir) = loader::dump_dir_from_env() {
        dump_labels(&root, &dir, &config)?;
    }

    outcome
        .submission
        .save(&output)
        .map_err(|e| RunError::Save(output.clone(), e))?;
    log::info!("Submission written to `{}`", output.display());

    Ok(RunSummary::new(n_images, outcome, elapsed, output))
}

/// 将每张图像的标签图与前景掩膜保存到 `dir`, 便于人工检查.
///
/// 单张图像失败只记录日志.
fn dump_labels(root: &Path, dir: &Path, config: &PipelineConfig) -> Result<(), RunError> {
    fs::create_dir_all(dir).map_err(|e| RunError::Save(dir.to_owned(), e))?;
    log::info!("Dumping label maps into `{}`...", dir.display());

    for (path, data) in loader::image_loader(root)? {
        let (id, img) = match data {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Skipping dump of `{}`: {e}", path.display());
                continue;
            }
        };
        let seg = segment_with(&img.as_immut(), config.bins, config.connectivity);
        let labels_at = dir.join(format!("{id}_labels.png"));
        let mask_at = dir.join(format!("{id}_mask.png"));
        if let Err(e) = seg.labels.save(&labels_at) {
            log::warn!("Cannot save `{}`: {e}", labels_at.display());
        }
        if let Err(e) = seg.labels.foreground_mask().save_raw(&mask_at) {
            log::warn!("Cannot save `{}`: {e}", mask_at.display());
        }
    }
    Ok(())
}

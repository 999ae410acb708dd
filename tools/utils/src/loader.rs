//! 对 `nuclei-berry::dataset` 的更一层封装. 从环境变量读取运行配置.

use log::LevelFilter;
use nuclei_berry::dataset::{self, ImageLoader, ScanResult};
use nuclei_berry::pipeline::PipelineConfig;
use std::env;
use std::path::{Path, PathBuf};

/// 读取非空的环境变量.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// 获取待处理图像的数据集根目录.
///
/// 1. 若环境变量 `$NUCLEI_IMAGES_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/stage1_test`.
///
/// 两者都不可用时返回 `None`.
pub fn images_dir_from_env_or_home() -> Option<PathBuf> {
    match non_empty_var("NUCLEI_IMAGES_DIR") {
        Some(d) => Some(PathBuf::from(d)),
        None => dataset::home_dataset_dir_with(["stage1_test"]),
    }
}

/// 列出 `root` 下所有待处理图像.
#[inline]
pub fn image_paths<P: AsRef<Path>>(root: P) -> ScanResult<Vec<PathBuf>> {
    dataset::discover(root)
}

/// 获取 `root` 下所有图像的加载器.
pub fn image_loader<P: AsRef<Path>>(root: P) -> ScanResult<ImageLoader> {
    Ok(dataset::image_loader(image_paths(root)?))
}

/// 获取提交文件的输出路径.
///
/// 1. 若环境变量 `$NUCLEI_SUBMISSION` 非空, 则返回其值;
/// 2. 否则, 返回 `./submission.csv`.
pub fn submission_path_from_env() -> PathBuf {
    non_empty_var("NUCLEI_SUBMISSION").map_or_else(|| PathBuf::from("submission.csv"), PathBuf::from)
}

/// 若环境变量 `$NUCLEI_DUMP_DIR` 非空, 返回调试图像的输出目录.
pub fn dump_dir_from_env() -> Option<PathBuf> {
    non_empty_var("NUCLEI_DUMP_DIR").map(PathBuf::from)
}

/// 环境变量 `$NUCLEI_PLACEHOLDER` 是否为 `1` 或 `true` (忽略大小写).
pub fn placeholder_from_env() -> bool {
    non_empty_var("NUCLEI_PLACEHOLDER").is_some_and(|v| parse_flag(&v))
}

fn parse_flag(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// 从环境变量构造流程参数. 除占位行外均为默认值.
pub fn config_from_env() -> PipelineConfig {
    PipelineConfig::default().with_placeholder_rows(placeholder_from_env())
}

/// 日志等级. 取自环境变量 `$NUCLEI_LOG`, 缺失或无法解析时为 `Info`.
pub fn log_level_from_env() -> LevelFilter {
    non_empty_var("NUCLEI_LOG")
        .and_then(|v| v.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

//! 对数据集中的所有图像进行细胞核分割, 并写出提交表格.
//!
//! 运行配置全部来自环境变量, 参见 `utils::loader`.

mod result;
mod runner;

use simple_logger::SimpleLogger;
use utils::loader;

fn main() {
    if let Err(e) = SimpleLogger::new()
        .with_level(loader::log_level_from_env())
        .init()
    {
        eprintln!("Logger initialization error: {e}");
    }

    match runner::run() {
        Ok(summary) => summary.analyze(),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

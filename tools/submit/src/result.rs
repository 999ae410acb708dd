//! 运行结果.

use nuclei_berry::pipeline::BatchOutcome;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// 一次完整运行的统计信息.
pub struct RunSummary {
    images: usize,
    rows: usize,
    placeholders: usize,
    images_with_rows: usize,
    failures: Vec<(PathBuf, String)>,
    elapsed: Duration,
    output: PathBuf,
}

impl RunSummary {
    pub fn new(images: usize, outcome: BatchOutcome, elapsed: Duration, output: PathBuf) -> Self {
        let sub = &outcome.submission;
        Self {
            images,
            rows: sub.len(),
            placeholders: sub.records().iter().filter(|r| r.is_placeholder()).count(),
            images_with_rows: sub.image_count(),
            failures: outcome
                .failures
                .into_iter()
                .map(|(p, e)| (p, e.to_string()))
                .collect(),
            elapsed,
            output,
        }
    }

    /// 将统计信息写进 `w` 中.
    fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        const S4: &str = "    ";

        writeln!(w, "Run summary:")?;
        writeln!(w, "{S4}Images found: {}", self.images)?;
        writeln!(w, "{S4}Images failed: {}", self.failures.len())?;
        writeln!(w, "{S4}Images with rows: {}", self.images_with_rows)?;
        writeln!(w, "{S4}Rows written: {}", self.rows)?;
        writeln!(w, "{S4}Placeholder rows: {}", self.placeholders)?;
        writeln!(w, "{S4}Total time: {} ms", self.elapsed.as_millis())?;
        write!(w, "{S4}Output: {}", self.output.display())?;
        for (p, e) in self.failures.iter() {
            write!(w, "\n{S4}Failed `{}`: {e}", p.display())?;
        }
        Ok(())
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);
        match self.describe_into(&mut buf) {
            Ok(()) => println!("{}", String::from_utf8_lossy(&buf)),
            Err(e) => log::error!("Cannot describe run summary: {e}"),
        }
        utils::sep();
    }
}

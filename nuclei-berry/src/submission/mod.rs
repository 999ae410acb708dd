//! 提交表格.
//!
//! 每个被保留的细胞核区域对应一行 `ImageId,EncodedPixels`.
//! 同一张图像的各行按标签升序排列.

use crate::consts::CSV_COLUMNS;
use itertools::Itertools;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一个细胞核检测结果.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DetectionRecord {
    #[cfg_attr(feature = "serde", serde(rename = "ImageId"))]
    image_id: String,

    #[cfg_attr(feature = "serde", serde(rename = "EncodedPixels"))]
    encoded_pixels: String,
}

impl DetectionRecord {
    /// 直接初始化.
    #[inline]
    pub fn new<S: Into<String>, T: Into<String>>(image_id: S, encoded_pixels: T) -> Self {
        Self {
            image_id: image_id.into(),
            encoded_pixels: encoded_pixels.into(),
        }
    }

    /// 没有检测到任何区域的图像所用的占位行, `EncodedPixels` 为空.
    #[inline]
    pub fn placeholder<S: Into<String>>(image_id: S) -> Self {
        Self::new(image_id, String::new())
    }

    /// 图像标识.
    #[inline]
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// RLE 字符串.
    #[inline]
    pub fn encoded_pixels(&self) -> &str {
        &self.encoded_pixels
    }

    /// 是否是占位行?
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.encoded_pixels.is_empty()
    }
}

/// 按 CSV 规则转义单个字段.
fn escape(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}

/// 所有图像的检测结果.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Submission {
    records: Vec<DetectionRecord>,
}

impl Submission {
    /// 按图像依次拼接每张图像的检测结果.
    pub fn concat<I: IntoIterator<Item = Vec<DetectionRecord>>>(per_image: I) -> Self {
        Self {
            records: per_image.into_iter().flatten().collect(),
        }
    }

    /// 按图像标识稳定排序. 同一图像内各行的相对顺序不变.
    pub fn sort_by_image_id(mut self) -> Self {
        self.records.sort_by(|a, b| a.image_id.cmp(&b.image_id));
        self
    }

    /// 所有行.
    #[inline]
    pub fn records(&self) -> &[DetectionRecord] {
        &self.records
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否没有任何行?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 出现过的不同图像个数.
    pub fn image_count(&self) -> usize {
        self.records.iter().map(|r| r.image_id()).unique().count()
    }

    /// 以 CSV 格式写入 `w`. 首行为表头 `ImageId,EncodedPixels`.
    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", CSV_COLUMNS.join(","))?;
        for r in self.records.iter() {
            writeln!(w, "{},{}", escape(&r.image_id), escape(&r.encoded_pixels))?;
        }
        w.flush()
    }

    /// 以 CSV 格式保存到 `path`. 已存在的文件会被覆盖.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// 消费自我, 获得所有行.
    #[inline]
    pub fn into_records(self) -> Vec<DetectionRecord> {
        self.records
    }
}

impl FromIterator<DetectionRecord> for Submission {
    fn from_iter<I: IntoIterator<Item = DetectionRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<DetectionRecord> for Submission {
    fn extend<I: IntoIterator<Item = DetectionRecord>>(&mut self, iter: I) {
        self.records.extend(iter)
    }
}

impl IntoIterator for Submission {
    type Item = DetectionRecord;
    type IntoIter = std::vec::IntoIter<DetectionRecord>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_of(s: &Submission) -> String {
        let mut buf = Vec::new();
        s.write_csv(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_submission_has_only_header() {
        let s = Submission::default();
        assert_eq!(csv_of(&s), "ImageId,EncodedPixels\n");
        assert_eq!(s.image_count(), 0);
    }

    #[test]
    fn test_concat_keeps_order() {
        let s = Submission::concat([
            vec![
                DetectionRecord::new("b", "1 12"),
                DetectionRecord::new("b", "20 11"),
            ],
            vec![],
            vec![DetectionRecord::new("a", "3 15")],
        ]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.image_count(), 2);
        assert_eq!(
            csv_of(&s),
            "ImageId,EncodedPixels\nb,1 12\nb,20 11\na,3 15\n"
        );

        let sorted = s.sort_by_image_id();
        let ids: Vec<_> = sorted.records().iter().map(|r| r.encoded_pixels()).collect();
        assert_eq!(ids, vec!["3 15", "1 12", "20 11"]);
    }

    #[test]
    fn test_placeholder_row() {
        let r = DetectionRecord::placeholder("empty");
        assert!(r.is_placeholder());
        let s: Submission = [r].into_iter().collect();
        assert_eq!(csv_of(&s), "ImageId,EncodedPixels\nempty,\n");
    }

    #[test]
    fn test_fields_are_escaped() {
        let s: Submission = [DetectionRecord::new("a,\"b\"", "1 2")].into_iter().collect();
        assert_eq!(csv_of(&s), "ImageId,EncodedPixels\n\"a,\"\"b\"\"\",1 2\n");
    }

    #[test]
    fn test_save_writes_file() {
        let path = std::env::temp_dir().join(format!("nuclei-berry-{}-sub.csv", std::process::id()));
        let s: Submission = [DetectionRecord::new("x", "1 11")].into_iter().collect();
        s.save(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "ImageId,EncodedPixels\nx,1 11\n"
        );
        std::fs::remove_file(&path).unwrap();
    }
}

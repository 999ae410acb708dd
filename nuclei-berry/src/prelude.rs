//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::data::{
    BinaryMask, ImgWriteRaw, ImgWriteVis, IntensitySlice, LabelMap, OwnedIntensitySlice,
};

pub use crate::consts::gray::{BACKGROUND, FOREGROUND};
pub use crate::consts::{BACKGROUND_LABEL, MIN_REGION_PIXELS, OTSU_BINS};

pub use crate::eight::Connectivity;

pub use crate::segment::{segment, segment_with, Segmentation};

pub use crate::filter::RegionFilter;

pub use crate::rle::{decode, encode, RleError, RunLength};

pub use crate::dataset::{self, discover, home_dataset_dir_with, image_id_of, load_gray};

pub use crate::submission::{DetectionRecord, Submission};

pub use crate::pipeline::{scan_image, scan_path, scan_paths, BatchOutcome, PipelineConfig};

#[cfg(feature = "rayon")]
pub use crate::pipeline::par_scan_paths;

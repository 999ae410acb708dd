//! 通用常量.
//!
//! 列优先展平、标签扫描序、默认连通规则这几项约定属于输出格式的一部分,
//! 修改它们会改变提交文件的内容.

use crate::eight::Connectivity;

/// 单通道颜色与二值掩膜像素值.
pub mod gray {
    /// 二值掩膜中, 背景的像素值.
    pub const BACKGROUND: u8 = 0;

    /// 二值掩膜中, 前景 (细胞核) 的像素值.
    pub const FOREGROUND: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道暗灰色.
    pub const DARK_GRAY: u8 = 0b_0100_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        matches!(p, FOREGROUND)
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }
}

/// 标签图中背景的标签. 有效区域的标签从 1 开始.
pub const BACKGROUND_LABEL: u32 = 0;

/// 区域过滤器的默认门限. 像素数 **严格大于** 该值的区域才会被保留.
pub const MIN_REGION_PIXELS: usize = 10;

/// Otsu 阈值计算使用的直方图桶数.
pub const OTSU_BINS: usize = 256;

/// 默认连通规则.
pub const DEFAULT_CONNECTIVITY: Connectivity = Connectivity::Four;

/// RLE 字符串中数值之间的分隔符.
pub const RLE_SEPARATOR: &str = " ";

/// 提交表格的列名, 按输出顺序排列.
pub const CSV_COLUMNS: [&str; 2] = ["ImageId", "EncodedPixels"];

/// 彩色图像灰度化时 R, G, B 三个通道的亮度权重.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2125, 0.7154, 0.0721];

/// 数据集中存放原始图像的子目录名.
pub const IMAGES_SUBDIR: &str = "images";

/// 数据集中原始图像的扩展名.
pub const IMAGE_EXTENSION: &str = "png";

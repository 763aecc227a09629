//! 外部识别服务客户端
//!
//! `Recognizer` 是识别能力的协议无关接口：批次管线只依赖这个
//! trait，不绑定任何具体云服务。`vision` 模块提供基于
//! Google Cloud Vision REST API 的生产实现，测试使用内存 mock。

pub mod auth;
pub mod vision;

use crate::error::AppResult;
use async_trait::async_trait;
use std::path::Path;

pub use vision::VisionClient;

/// 识别出的一个文本块及其水平中心位置
///
/// `center_x` 以原图像素为单位，双页模式据此把文本块
/// 分配到左页或右页。
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub text: String,
    pub center_x: f32,
}

/// 单张图片的识别结果（协议无关表示）
#[derive(Debug, Clone, Default)]
pub struct RecognizedText {
    /// 图片宽度（像素），0 表示未知
    pub width: f32,
    /// 按识别顺序排列的文本块
    pub blocks: Vec<TextBlock>,
}

impl RecognizedText {
    /// 所有文本块拼接为一页文本
    pub fn joined(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// 识别引擎接口
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// 识别一张图片中的文本
    ///
    /// # 参数
    /// - `image_path`: 图片文件路径
    /// - `languages`: 语言提示代码列表
    async fn recognize(&self, image_path: &Path, languages: &[String])
        -> AppResult<RecognizedText>;
}

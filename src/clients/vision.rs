//! Google Cloud Vision API 客户端
//!
//! 调用 `images:annotate` 的 DOCUMENT_TEXT_DETECTION 特性，
//! 把响应还原为协议无关的 `RecognizedText`（文本块 + 水平中心坐标）。
//! 符号间的断行信息（空格、换行、连字符）在拼接文本时保留。

use super::auth::{get_access_token, load_credentials, ServiceAccountCredentials};
use super::{RecognizedText, Recognizer, TextBlock};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const VISION_API_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Vision API 客户端
pub struct VisionClient {
    credentials: ServiceAccountCredentials,
    access_token: Arc<RwLock<Option<String>>>,
    http_client: reqwest::Client,
}

impl VisionClient {
    /// 从服务账号凭证文件创建客户端
    ///
    /// 凭证文件缺失或无法解析时同步失败，批次不会启动。
    pub fn new(credential_ref: impl AsRef<Path>) -> AppResult<Self> {
        let credentials = load_credentials(credential_ref)?;
        Ok(Self {
            credentials,
            access_token: Arc::new(RwLock::new(None)),
            http_client: reqwest::Client::new(),
        })
    }

    /// 获取访问令牌（带缓存）
    async fn get_token(&self) -> AppResult<String> {
        {
            let token = self.access_token.read().await;
            if let Some(ref t) = *token {
                return Ok(t.clone());
            }
        }

        let new_token = get_access_token(&self.credentials).await?;

        {
            let mut token = self.access_token.write().await;
            *token = Some(new_token.clone());
        }

        Ok(new_token)
    }
}

#[async_trait]
impl Recognizer for VisionClient {
    async fn recognize(
        &self,
        image_path: &Path,
        languages: &[String],
    ) -> AppResult<RecognizedText> {
        let image_data = std::fs::read(image_path)
            .map_err(|e| AppError::file(image_path.display().to_string(), e))?;
        let base64_image = STANDARD.encode(&image_data);
        drop(image_data);

        let request = VisionRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: base64_image,
                },
                features: vec![Feature {
                    feature_type: "DOCUMENT_TEXT_DETECTION".to_string(),
                }],
                image_context: Some(ImageContext {
                    language_hints: languages.to_vec(),
                }),
            }],
        };

        let token = self.get_token().await?;

        let response = self
            .http_client
            .post(VISION_API_URL)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Api(format!("请求失败: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let vision_response: VisionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Api(format!("响应解析失败: {}", e)))?;

        let Some(annotate) = vision_response.responses.into_iter().next() else {
            return Err(AppError::Api("响应为空".to_string()));
        };
        if let Some(error) = annotate.error {
            return Err(AppError::Api(error.message));
        }

        let recognized = extract_recognized_text(&annotate);
        debug!(
            "识别完成: {} 个文本块 (宽度 {})",
            recognized.blocks.len(),
            recognized.width
        );
        Ok(recognized)
    }
}

/// 把一次标注响应还原为文本块列表
fn extract_recognized_text(annotate: &AnnotateImageResponse) -> RecognizedText {
    let Some(ref annotation) = annotate.full_text_annotation else {
        return RecognizedText::default();
    };

    let mut blocks = Vec::new();
    let mut width = 0.0f32;

    for page in &annotation.pages {
        if page.width > 0.0 && width == 0.0 {
            width = page.width;
        }
        for block in &page.blocks {
            let text = extract_block_text(block);
            if text.is_empty() {
                continue;
            }
            blocks.push(TextBlock {
                text,
                center_x: block_center_x(block),
            });
        }
    }

    // 页面未携带宽度时退回到文本标注顶点的最大 X
    if width == 0.0 {
        for ann in &annotate.text_annotations {
            if let Some(ref poly) = ann.bounding_poly {
                for v in &poly.vertices {
                    if v.x > width {
                        width = v.x;
                    }
                }
            }
        }
    }

    RecognizedText { width, blocks }
}

/// 文本块中心的 X 坐标
fn block_center_x(block: &Block) -> f32 {
    let Some(ref bounding) = block.bounding_box else {
        return 0.0;
    };
    if bounding.vertices.is_empty() {
        return 0.0;
    }
    let sum: f32 = bounding.vertices.iter().map(|v| v.x).sum();
    sum / bounding.vertices.len() as f32
}

/// 拼接一个文本块内的所有符号，按断行类型插入空格/换行
fn extract_block_text(block: &Block) -> String {
    let mut parts = Vec::new();
    for para in &block.paragraphs {
        let mut line = String::new();
        for word in &para.words {
            for symbol in &word.symbols {
                line.push_str(&symbol.text);
                if let Some(ref break_type) = symbol
                    .property
                    .as_ref()
                    .and_then(|p| p.detected_break.as_ref())
                    .map(|b| b.break_type.as_str())
                {
                    match *break_type {
                        "SPACE" | "SURE_SPACE" => line.push(' '),
                        "EOL_SURE_SPACE" | "HYPHEN" | "LINE_BREAK" => line.push('\n'),
                        _ => {}
                    }
                }
            }
        }
        parts.push(line);
    }
    parts.join("\n").trim().to_string()
}

// ========== Vision API 请求/响应结构体 ==========

#[derive(Serialize)]
struct VisionRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<String>,
}

#[derive(Deserialize)]
struct VisionResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    pages: Vec<AnnotationPage>,
}

#[derive(Deserialize)]
struct AnnotationPage {
    #[serde(default)]
    width: f32,
    #[serde(default)]
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Block {
    bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Deserialize)]
struct Paragraph {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Deserialize)]
struct Word {
    #[serde(default)]
    symbols: Vec<Symbol>,
}

#[derive(Deserialize)]
struct Symbol {
    #[serde(default)]
    text: String,
    property: Option<TextProperty>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextProperty {
    detected_break: Option<DetectedBreak>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedBreak {
    #[serde(rename = "type")]
    break_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Deserialize, Default)]
struct Vertex {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    #[allow(dead_code)]
    y: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAnnotation {
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

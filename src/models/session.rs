//! 批次设置与可恢复会话数据模型

use crate::models::image::ScanMode;
use serde::{Deserialize, Serialize};

/// 一次 OCR 批次的全部设置
///
/// 由宿主层（UI）在启动批次时提供
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSettings {
    /// 已重命名图片所在目录
    pub image_dir: String,
    /// 识别结果输出目录
    pub output_dir: String,
    /// 凭证引用（服务账号 JSON 文件路径）
    pub credential_ref: String,
    /// 识别语言提示，至少一个
    pub languages: Vec<String>,
    /// 并发识别数量
    pub concurrency: usize,
    /// 批次结束后是否合并输出
    pub merge_output: bool,
    /// 合并输出文件名
    pub merge_name: String,
    /// 扫描模式
    pub scan_mode: ScanMode,
}

/// 持久化的批次会话，用于中断后恢复
///
/// 批次启动时创建，每完成一个文件就更新并落盘（`processed_files`
/// 单调增长），批次成功结束或操作者显式放弃时清除。
/// 不变式：`processed_files` 是会话创建时 `image_dir` + `scan_mode`
/// 所描述文件集合的子集。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSession {
    pub image_dir: String,
    pub output_dir: String,
    pub credential_ref: String,
    pub languages: Vec<String>,
    pub concurrency: usize,
    pub merge_output: bool,
    pub merge_name: String,
    pub scan_mode: ScanMode,
    /// 会话创建时匹配到的文件总数
    pub total_files: usize,
    /// 已完成文件的文件名（basename）
    pub processed_files: Vec<String>,
    /// 会话创建时间
    #[serde(default)]
    pub started_at: String,
}

impl BatchSession {
    /// 从批次设置创建新会话
    pub fn from_settings(settings: &OcrSettings, total_files: usize) -> Self {
        Self {
            image_dir: settings.image_dir.clone(),
            output_dir: settings.output_dir.clone(),
            credential_ref: settings.credential_ref.clone(),
            languages: settings.languages.clone(),
            concurrency: settings.concurrency,
            merge_output: settings.merge_output,
            merge_name: settings.merge_name.clone(),
            scan_mode: settings.scan_mode,
            total_files,
            processed_files: Vec::new(),
            started_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// 已完成文件数量（供恢复提示显示）
    pub fn processed_count(&self) -> usize {
        self.processed_files.len()
    }
}

//! 程序配置
//!
//! 配置从 config.toml 读取（缺失或损坏时退回默认值），
//! 环境变量可以逐项覆盖

use crate::error::{AppError, AppResult};
use crate::models::image::ScanMode;
use crate::models::session::OcrSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认配置文件名（可执行文件同目录）
pub const CONFIG_FILE: &str = "config.toml";

/// 程序配置文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 已重命名图片所在目录
    pub image_dir: String,
    /// 识别结果输出目录（为空时按图片目录推导）
    pub output_dir: String,
    /// 服务账号凭证文件路径
    pub credential_ref: String,
    /// 识别语言提示
    pub languages: Vec<String>,
    /// 同时进行的识别调用数量
    pub concurrency: usize,
    /// 批次结束后是否合并输出
    pub merge_output: bool,
    /// 合并输出文件名
    pub merge_name: String,
    /// 扫描模式
    pub scan_mode: ScanMode,
    /// 会话文件路径
    pub session_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_dir: String::new(),
            output_dir: String::new(),
            credential_ref: String::new(),
            languages: vec!["en".to_string()],
            concurrency: 5,
            merge_output: true,
            merge_name: "Merged.txt".to_string(),
            scan_mode: ScanMode::Dual,
            session_file: "session.json".to_string(),
        }
    }
}

impl Config {
    /// 从配置文件读取，文件缺失或无法解析时使用默认配置
    pub fn load(path: impl AsRef<Path>) -> Self {
        let Ok(data) = std::fs::read_to_string(path.as_ref()) else {
            return Self::default();
        };
        toml::from_str(&data).unwrap_or_default()
    }

    /// 把配置写回文件
    pub fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let data = toml::to_string_pretty(self)
            .map_err(|e| AppError::Validation(format!("配置序列化失败: {}", e)))?;
        std::fs::write(path, data).map_err(|e| AppError::file(path.display().to_string(), e))
    }

    /// 读取配置文件并应用环境变量覆盖
    pub fn from_env() -> Self {
        let base = Self::load(CONFIG_FILE);
        Self {
            image_dir: std::env::var("IMAGE_DIR").unwrap_or(base.image_dir),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(base.output_dir),
            credential_ref: std::env::var("CREDENTIAL_FILE").unwrap_or(base.credential_ref),
            languages: std::env::var("LANGUAGES")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(base.languages),
            concurrency: std::env::var("CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.concurrency),
            merge_output: std::env::var("MERGE_OUTPUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.merge_output),
            merge_name: std::env::var("MERGE_NAME").unwrap_or(base.merge_name),
            scan_mode: std::env::var("SCAN_MODE")
                .ok()
                .map(|v| {
                    if v.eq_ignore_ascii_case("single") {
                        ScanMode::Single
                    } else {
                        ScanMode::Dual
                    }
                })
                .unwrap_or(base.scan_mode),
            session_file: std::env::var("SESSION_FILE").unwrap_or(base.session_file),
        }
    }

    /// 由配置构建一次批次的设置
    pub fn ocr_settings(&self) -> OcrSettings {
        OcrSettings {
            image_dir: self.image_dir.clone(),
            output_dir: self.output_dir.clone(),
            credential_ref: self.credential_ref.clone(),
            languages: self.languages.clone(),
            concurrency: self.concurrency,
            merge_output: self.merge_output,
            merge_name: self.merge_name.clone(),
            scan_mode: self.scan_mode,
        }
    }
}

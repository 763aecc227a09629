//! 会话持久化 - 业务能力层
//!
//! 把批次会话以 JSON 形式落盘，进程重启后仍可恢复。
//! 读取失败（文件缺失或内容损坏）一律按"无待恢复会话"处理，
//! 绝不阻止新批次启动。

use crate::error::{AppError, AppResult};
use crate::models::session::BatchSession;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 会话存储
#[derive(Debug, Clone)]
pub struct SessionStore {
    session_path: PathBuf,
}

impl SessionStore {
    /// 使用指定的会话文件路径创建存储
    pub fn new(session_path: impl Into<PathBuf>) -> Self {
        Self {
            session_path: session_path.into(),
        }
    }

    /// 默认会话文件路径：可执行文件同目录下的 session.json
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("session.json")
    }

    /// 会话文件路径
    pub fn path(&self) -> &Path {
        &self.session_path
    }

    /// 读取持久化的会话
    ///
    /// 文件不存在、不可读或内容损坏时返回 None（损坏时记录警告）。
    pub fn load(&self) -> Option<BatchSession> {
        let data = std::fs::read(&self.session_path).ok()?;
        match serde_json::from_slice::<BatchSession>(&data) {
            Ok(session) => {
                debug!(
                    "读取到会话: {} ({}/{} 已完成)",
                    session.image_dir,
                    session.processed_count(),
                    session.total_files
                );
                Some(session)
            }
            Err(e) => {
                warn!("⚠️ 会话文件损坏，按无会话处理: {}", e);
                None
            }
        }
    }

    /// 保存会话到磁盘
    pub fn save(&self, session: &BatchSession) -> AppResult<()> {
        let data = serde_json::to_vec_pretty(session)
            .map_err(|e| AppError::Session(format!("序列化会话失败: {}", e)))?;
        std::fs::write(&self.session_path, data)
            .map_err(|e| AppError::file(self.session_path.display().to_string(), e))?;
        Ok(())
    }

    /// 删除持久化的会话（不存在时静默成功）
    pub fn clear(&self) {
        let _ = std::fs::remove_file(&self.session_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::ScanMode;
    use crate::models::session::OcrSettings;

    fn settings(dir: &str) -> OcrSettings {
        OcrSettings {
            image_dir: dir.to_string(),
            output_dir: "out".to_string(),
            credential_ref: "cred.json".to_string(),
            languages: vec!["en".to_string()],
            concurrency: 5,
            merge_output: false,
            merge_name: "Merged.txt".to_string(),
            scan_mode: ScanMode::Dual,
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let mut session = BatchSession::from_settings(&settings("/scans"), 3);
        session.processed_files.push("Page-001-002.JPG".to_string());
        store.save(&session).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.image_dir, "/scans");
        assert_eq!(loaded.total_files, 3);
        assert_eq!(loaded.processed_files, vec!["Page-001-002.JPG"]);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_corrupt_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not valid json").unwrap();

        let store = SessionStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&BatchSession::from_settings(&settings("/scans"), 1))
            .unwrap();
        assert!(store.load().is_some());

        store.clear();
        assert!(store.load().is_none());
        // 再次清除不报错
        store.clear();
    }
}

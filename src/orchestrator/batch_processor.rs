//! 批次处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **设置校验**：非法设置在任何工作开始前同步拒绝
//! 2. **工作列表**：扫描已重命名的图片目录，按规范文件名过滤
//! 3. **断点续传**：结合持久化会话跳过已完成的文件
//! 4. **并发控制**：使用 Semaphore 限制同时进行的识别调用数量
//! 5. **协作取消**：取消标志只在认领新文件的边界检查，
//!    进行中的识别调用允许自然完成
//! 6. **事件推送**：进度/日志/结束事件经单一通道发往宿主层
//!
//! ## 状态机
//!
//! `Idle → Running → (Finished | Cancelled | Failed)`
//!
//! Running 期间拒绝再次启动；终止状态下可以启动新批次。
//! 取消的批次保留持久化会话供恢复；成功结束的批次清除会话。

use crate::clients::Recognizer;
use crate::error::{AppError, AppResult};
use crate::models::events::EventSender;
use crate::models::image::ScanMode;
use crate::models::session::{BatchSession, OcrSettings};
use crate::orchestrator::page_processor::{self, matches_ocr_pattern, output_path_for};
use crate::services::session_store::SessionStore;
use crate::utils::logging;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::warn;

/// 并发识别数量的上限（操作者可在 1..=20 范围内调整）
const MAX_CONCURRENCY: usize = 20;

/// 批次状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// 尚未启动过批次
    Idle,
    /// 批次进行中
    Running,
    /// 工作列表处理完毕（允许包含单文件失败）
    Finished,
    /// 操作者取消，会话保留供恢复
    Cancelled,
    /// 批次未能开始实际工作（输出目录、工作列表等前置步骤失败）
    Failed,
}

/// OCR 批次管线
pub struct OcrPipeline {
    store: SessionStore,
    events: EventSender,
    state: Arc<Mutex<BatchState>>,
    cancel: Arc<AtomicBool>,
}

impl OcrPipeline {
    /// 创建批次管线
    pub fn new(store: SessionStore, events: EventSender) -> Self {
        Self {
            store,
            events,
            state: Arc::new(Mutex::new(BatchState::Idle)),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 当前批次状态
    pub fn state(&self) -> BatchState {
        *self.state.lock().expect("state 锁中毒")
    }

    /// 批次是否正在运行
    pub fn is_running(&self) -> bool {
        self.state() == BatchState::Running
    }

    /// 请求取消当前批次
    ///
    /// 协作式取消：worker 在认领下一个文件时观察标志，
    /// 进行中的识别调用不会被强行中断。
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 启动批次
    ///
    /// 同步校验设置并检查状态机，随后在后台任务中运行管线。
    /// 返回的句柄可等待批次的最终状态；事件经构造时传入的通道推送。
    pub fn start(
        &self,
        settings: OcrSettings,
        recognizer: Arc<dyn Recognizer>,
    ) -> AppResult<JoinHandle<BatchState>> {
        validate_settings(&settings)?;

        {
            let mut state = self.state.lock().expect("state 锁中毒");
            if *state == BatchState::Running {
                return Err(AppError::validation("OCR 批次已在运行中"));
            }
            *state = BatchState::Running;
        }
        self.cancel.store(false, Ordering::SeqCst);

        let store = self.store.clone();
        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let cancel = Arc::clone(&self.cancel);

        Ok(tokio::spawn(async move {
            let final_state = run_pipeline(store, recognizer, events.clone(), cancel, settings).await;
            *state.lock().expect("state 锁中毒") = final_state;
            // 无论以何种方式结束都通知宿主层一次
            events.finished();
            final_state
        }))
    }
}

/// 校验批次设置，非法设置同步拒绝且不改变任何状态
fn validate_settings(settings: &OcrSettings) -> AppResult<()> {
    if settings.image_dir.trim().is_empty() {
        return Err(AppError::validation("图片目录不能为空"));
    }
    if settings.credential_ref.trim().is_empty() {
        return Err(AppError::validation("缺少凭证文件"));
    }
    if settings.languages.is_empty() {
        return Err(AppError::validation("至少选择一种识别语言"));
    }
    Ok(())
}

/// 运行批次管线，返回最终状态
async fn run_pipeline(
    store: SessionStore,
    recognizer: Arc<dyn Recognizer>,
    events: EventSender,
    cancel: Arc<AtomicBool>,
    settings: OcrSettings,
) -> BatchState {
    // 输出目录
    if let Err(e) = std::fs::create_dir_all(&settings.output_dir) {
        events.log(None, format!("无法创建输出目录: {}", e), true);
        return BatchState::Failed;
    }

    let mode_label = match settings.scan_mode {
        ScanMode::Dual => "双页",
        ScanMode::Single => "单页",
    };
    events.log(None, format!("扫描模式: {}", mode_label), false);

    // 工作列表：匹配规范文件名的全部文件
    let files = match build_work_list(&settings.image_dir, &settings) {
        Ok(files) => files,
        Err(e) => {
            events.log(None, format!("扫描目录失败: {}", e), true);
            return BatchState::Failed;
        }
    };
    if files.is_empty() {
        events.log(None, "没有找到匹配的文件（需要 Page-NNN 格式的规范文件名）", true);
        return BatchState::Failed;
    }

    // 恢复：同一目录的持久化会话提供已完成集合
    let mut processed: HashSet<String> = store
        .load()
        .filter(|s| s.image_dir == settings.image_dir)
        .map(|s| s.processed_files.into_iter().collect())
        .unwrap_or_default();

    // 已在会话中、或输出已存在的文件不再处理
    let mut remaining = Vec::new();
    for path in &files {
        let Some(base) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if processed.contains(base) {
            continue;
        }
        if output_path_for(base, Path::new(&settings.output_dir)).exists() {
            processed.insert(base.to_string());
            continue;
        }
        remaining.push(path.clone());
    }

    let total = files.len();
    let already_done = total - remaining.len();
    events.log(
        None,
        format!(
            "找到 {} 个匹配文件，{} 个已完成，{} 个待处理",
            total,
            already_done,
            remaining.len()
        ),
        false,
    );

    if remaining.is_empty() {
        events.log(None, "所有文件都已处理完成", false);
        if settings.merge_output {
            merge_outputs(&settings, &events);
        }
        store.clear();
        return BatchState::Finished;
    }

    let concurrency = settings.concurrency.clamp(1, MAX_CONCURRENCY);
    logging::log_batch_startup(remaining.len(), concurrency);

    // 初始化并立即落盘会话，启动后任意时刻中断都可恢复
    let mut session = BatchSession::from_settings(&settings, total);
    session.processed_files = {
        let mut names: Vec<String> = processed.iter().cloned().collect();
        names.sort();
        names
    };
    if let Err(e) = store.save(&session) {
        warn!("⚠️ 会话保存失败: {}", e);
    }
    let session = Arc::new(AsyncMutex::new(session));

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::new();
    let mut cancelled = false;

    for path in remaining {
        // 取消只在认领边界生效，已认领的文件继续完成
        if cancel.load(Ordering::SeqCst) {
            cancelled = true;
            events.log(None, "🛑 批次已停止，等待进行中的文件完成", false);
            break;
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let recognizer = Arc::clone(&recognizer);
        let events = events.clone();
        let session = Arc::clone(&session);
        let store = store.clone();
        let settings = settings.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            let base = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            match page_processor::process_one_image(recognizer.as_ref(), &path, &settings).await {
                Ok(_) => {
                    // 短临界区：追加完成记录、落盘、推送进度。
                    // 在锁内推送保证 current 在事件流中单调不减。
                    let mut s = session.lock().await;
                    s.processed_files.push(base.clone());
                    let current = s.processed_files.len();
                    if let Err(e) = store.save(&s) {
                        warn!("⚠️ 会话保存失败: {}", e);
                    }
                    events.log(Some(&base), "OK", false);
                    events.progress(current, total);
                    true
                }
                Err(e) => {
                    // 单文件失败不中断批次；未记入会话，恢复时会重试
                    events.log(Some(&base), format!("错误: {}", e), true);
                    false
                }
            }
        });
        handles.push(handle);
    }

    // 等待所有已认领的文件完成（取消时同样等待）
    let results = join_all(handles).await;
    let success = results
        .iter()
        .filter(|r| matches!(r, Ok(true)))
        .count();
    let failed = results.len() - success;

    // 最终落盘
    {
        let s = session.lock().await;
        if let Err(e) = store.save(&s) {
            warn!("⚠️ 会话保存失败: {}", e);
        }
    }

    if cancelled {
        events.log(
            None,
            format!("批次已取消，已完成 {} 个文件，会话已保留", success),
            false,
        );
        return BatchState::Cancelled;
    }

    logging::log_batch_complete(success, failed);
    events.log(
        None,
        format!("✅ OCR 完成！成功 {} 个，失败 {} 个", success, failed),
        false,
    );

    if settings.merge_output {
        merge_outputs(&settings, &events);
    }

    // 工作列表耗尽即清除会话（失败的文件留给下一次全新批次重试）
    store.clear();
    BatchState::Finished
}

/// 扫描目录，返回匹配规范文件名、按名称排序的文件列表
fn build_work_list(image_dir: &str, settings: &OcrSettings) -> AppResult<Vec<PathBuf>> {
    let read_dir =
        std::fs::read_dir(image_dir).map_err(|e| AppError::file(image_dir.to_string(), e))?;

    let mut files = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| AppError::file(image_dir.to_string(), e))?;
        let path = item.path();
        if path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if matches_ocr_pattern(name, settings.scan_mode) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 合并输出目录中的全部页面结果
fn merge_outputs(settings: &OcrSettings, events: &EventSender) {
    events.log(None, "合并所有识别结果...", false);

    let output_dir = Path::new(&settings.output_dir);
    let merge_name = if settings.merge_name.trim().is_empty() {
        "Merged.txt"
    } else {
        settings.merge_name.as_str()
    };

    let mut page_files = Vec::new();
    match std::fs::read_dir(output_dir) {
        Ok(read_dir) => {
            for item in read_dir.flatten() {
                let path = item.path();
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if name.starts_with("Page-") && name.ends_with(".txt") && name != merge_name {
                    page_files.push(path);
                }
            }
        }
        Err(e) => {
            events.log(None, format!("合并失败，无法读取输出目录: {}", e), true);
            return;
        }
    }
    page_files.sort();

    if page_files.is_empty() {
        events.log(None, "没有可合并的结果文件", true);
        return;
    }

    let merged_path = output_dir.join(merge_name);
    let _ = std::fs::remove_file(&merged_path);

    let mut merged = String::new();
    for path in &page_files {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                merged.push_str(&content);
                merged.push('\n');
            }
            Err(e) => {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
                events.log(Some(name), format!("读取失败: {}", e), true);
            }
        }
    }

    match std::fs::write(&merged_path, merged) {
        Ok(()) => events.log(
            None,
            format!(
                "✅ 合并完成！{} 个文件合并至: {}",
                page_files.len(),
                merged_path.display()
            ),
            false,
        ),
        Err(e) => events.log(None, format!("合并失败: {}", e), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::ScanMode;

    fn settings() -> OcrSettings {
        OcrSettings {
            image_dir: "/scans".to_string(),
            output_dir: "/out".to_string(),
            credential_ref: "cred.json".to_string(),
            languages: vec!["en".to_string()],
            concurrency: 5,
            merge_output: false,
            merge_name: "Merged.txt".to_string(),
            scan_mode: ScanMode::Dual,
        }
    }

    #[test]
    fn test_validate_settings_ok() {
        assert!(validate_settings(&settings()).is_ok());
    }

    #[test]
    fn test_validate_settings_rejects_empty_fields() {
        let mut s = settings();
        s.image_dir = "  ".to_string();
        assert!(matches!(
            validate_settings(&s),
            Err(AppError::Validation(_))
        ));

        let mut s = settings();
        s.credential_ref = String::new();
        assert!(validate_settings(&s).is_err());

        let mut s = settings();
        s.languages.clear();
        assert!(validate_settings(&s).is_err());
    }
}

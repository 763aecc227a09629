//! 应用门面
//!
//! 宿主层（UI、命令行、测试）唯一需要接触的入口：
//! 目录扫描、重命名预览与执行、OCR 批次启动/停止、会话查询。
//! 每次预览或批次都以参数形式接收自己的输入快照，
//! 门面本身不持有可变的目录/列表状态。

use crate::clients::{Recognizer, VisionClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::events::{EventSender, PipelineEvent};
use crate::models::image::ImageEntry;
use crate::models::language::{available_languages, LangOption};
use crate::models::loaders;
use crate::models::plan::RenamePlanEntry;
use crate::models::session::{BatchSession, OcrSettings};
use crate::orchestrator::batch_processor::{BatchState, OcrPipeline};
use crate::services::numbering::{compute_rename_plan, NumberingParams};
use crate::services::rename::{execute_rename, RenameReport};
use crate::services::session_store::SessionStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// 应用主结构
pub struct App {
    config: Config,
    store: SessionStore,
    pipeline: OcrPipeline,
}

impl App {
    /// 创建应用实例
    ///
    /// 返回实例和事件接收端；批次运行期间的进度/日志/结束事件
    /// 都从这一个通道送出。
    pub fn new(config: Config) -> (Self, UnboundedReceiver<PipelineEvent>) {
        let (events, rx) = EventSender::channel();
        let store = SessionStore::new(&config.session_file);
        let pipeline = OcrPipeline::new(store.clone(), events);
        (
            Self {
                config,
                store,
                pipeline,
            },
            rx,
        )
    }

    /// 当前配置
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ========== 重命名流程 ==========

    /// 扫描目录，返回按文件名排序的图片条目
    pub fn load_images_from_folder(&self, dir: impl AsRef<Path>) -> AppResult<Vec<ImageEntry>> {
        loaders::load_images_from_folder(dir)
    }

    /// 重新扫描后，把旧条目的分类与页码覆盖按原始文件名关联到新条目
    ///
    /// 物理顺序和索引在重新扫描后可能变化，只有文件名仍存在的条目
    /// 保留原有分类。
    pub fn reassociate_classifications(&self, old: &[ImageEntry], new: &mut [ImageEntry]) {
        loaders::reassociate_classifications(old, new);
    }

    /// 计算重命名预览
    ///
    /// 同时按正文起始索引刷新条目的前言标记（供宿主层展示）。
    pub fn compute_rename_preview(
        &self,
        entries: &mut [ImageEntry],
        params: &NumberingParams,
    ) -> AppResult<Vec<RenamePlanEntry>> {
        loaders::apply_front_matter(entries, params.body_start_index);
        compute_rename_plan(entries, params)
    }

    /// 执行确认后的重命名计划
    pub fn execute_rename(
        &self,
        dir: impl AsRef<Path>,
        plan: &[RenamePlanEntry],
    ) -> AppResult<RenameReport> {
        execute_rename(dir, plan)
    }

    // ========== OCR 批次 ==========

    /// 启动 OCR 批次（使用 Google Vision 识别）
    ///
    /// 凭证文件无法读取、设置非法时同步失败且不改变状态。
    pub fn start_ocr(&self, settings: OcrSettings) -> AppResult<JoinHandle<BatchState>> {
        let client = VisionClient::new(&settings.credential_ref)?;
        self.pipeline.start(settings, Arc::new(client))
    }

    /// 使用自定义识别实现启动批次（测试或替代识别引擎）
    pub fn start_ocr_with(
        &self,
        settings: OcrSettings,
        recognizer: Arc<dyn Recognizer>,
    ) -> AppResult<JoinHandle<BatchState>> {
        self.pipeline.start(settings, recognizer)
    }

    /// 请求取消当前批次（进行中的识别调用允许完成）
    pub fn stop_ocr(&self) {
        self.pipeline.stop();
    }

    /// 批次是否正在运行
    pub fn is_ocr_running(&self) -> bool {
        self.pipeline.is_running()
    }

    /// 当前批次状态
    pub fn batch_state(&self) -> BatchState {
        self.pipeline.state()
    }

    // ========== 会话 ==========

    /// 程序启动时查询未完成的会话（供恢复提示）
    pub fn pending_session(&self) -> Option<BatchSession> {
        self.store.load()
    }

    /// 操作者显式放弃未完成的会话
    pub fn clear_session(&self) {
        self.store.clear();
    }

    // ========== 杂项 ==========

    /// 给定图片目录的默认输出目录：可执行文件同目录下 output/<目录名>
    pub fn default_output_dir(&self, image_dir: impl AsRef<Path>) -> PathBuf {
        let base = image_dir
            .as_ref()
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output"));
        exe_dir().join("output").join(base)
    }

    /// 全部可选识别语言
    pub fn available_languages() -> Vec<LangOption> {
        available_languages()
    }
}

/// 可执行文件所在目录，取不到时退回当前目录
fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

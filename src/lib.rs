//! # Book Scan OCR
//!
//! 书籍扫描数字化核心：按页面分类和罗马/阿拉伯编号方案计算
//! 规范文件名，并驱动改名后的图片通过可恢复的并发 OCR 批次。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 纯数据：图片条目、分类、重命名计划、批次会话、事件
//!
//! ### ② 业务能力层（Services）
//! - `services/numbering` - 编号引擎（纯函数，无 I/O）
//! - `services/rename` - 重命名执行器（两阶段改名）
//! - `services/session_store` - 会话持久化（中断恢复）
//!
//! ### ③ 客户端层（Clients）
//! - `clients/` - 识别能力接口 `Recognizer` 与 Google Vision 实现
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批次状态机、并发控制、断点续传
//! - `orchestrator/page_processor` - 单张图片的识别与输出
//!
//! ### ⑤ 门面（App）
//! - `app` - 宿主层（UI/CLI）调用的全部操作入口
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use clients::{RecognizedText, Recognizer, TextBlock, VisionClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    BatchSession, EventSender, ImageEntry, OcrSettings, PageType, PipelineEvent, RenamePlanEntry,
    ScanMode,
};
pub use orchestrator::{BatchState, OcrPipeline};
pub use services::{
    compute_rename_plan, execute_rename, find_name_conflicts, NumberingParams, RenameReport,
    SessionStore,
};

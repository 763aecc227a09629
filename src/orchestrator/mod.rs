//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批次处理器
//! - 管理批次状态机（Idle → Running → 终止状态）
//! - 构建并过滤工作列表（断点续传）
//! - 控制并发数量（Semaphore）
//! - 协作式取消与事件推送
//!
//! ### `page_processor` - 单页处理器
//! - 处理单张图片（识别 → 左右页拆分 → 写出结果）
//! - 持有规范文件名的识别模式与页码标签还原
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<文件>)
//!     ↓
//! page_processor (处理单张图片)
//!     ↓
//! clients (识别能力: Recognizer)
//!     ↓
//! services (会话持久化: SessionStore)
//! ```

pub mod batch_processor;
pub mod page_processor;

pub use batch_processor::{BatchState, OcrPipeline};
pub use page_processor::process_one_image;

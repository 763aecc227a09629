//! 应用程序错误类型
//!
//! ## 错误分类
//!
//! - `Validation` - 参数校验错误，在任何工作开始前同步拒绝
//! - `Conflict` - 重命名计划中的目标文件名冲突，在任何重命名执行前拒绝
//! - `Rename` - 重命名执行中途失败，携带已完成部分的状态（不自动回滚）
//! - `Api` - 识别 API 调用错误（单文件级别，批次不中断）
//! - `File` - 文件读写错误
//! - `Session` - 会话持久化错误（读取损坏时按"无待恢复会话"处理，永不致命）

use thiserror::Error;

/// 应用程序错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 参数校验错误（目录为空、缺少凭证、没有目标语言等）
    #[error("参数错误: {0}")]
    Validation(String),

    /// 重命名计划冲突：多个条目映射到同一个目标文件名
    #[error("文件名冲突: {}", .duplicates.join(", "))]
    Conflict {
        /// 冲突的目标文件名列表
        duplicates: Vec<String>,
    },

    /// 重命名中途失败，`completed` 记录已经生效的重命名（不回滚）
    #[error("重命名失败 ({failed}): {source}，已完成 {} 个", .completed.len())]
    Rename {
        /// 已成功重命名的原始文件名
        completed: Vec<String>,
        /// 失败的文件名
        failed: String,
        #[source]
        source: std::io::Error,
    },

    /// 识别 API 调用错误
    #[error("识别 API 错误: {0}")]
    Api(String),

    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 会话持久化错误
    #[error("会话错误: {0}")]
    Session(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建参数校验错误
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// 创建文件操作错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

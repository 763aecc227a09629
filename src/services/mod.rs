//! 业务能力层（Services Layer）
//!
//! 每个服务只描述"我能做什么"，不关心批次流程：
//!
//! - `numbering` - 编号引擎：分类 + 编号参数 → 重命名计划（纯函数）
//! - `rename` - 重命名执行器：把计划应用到文件系统
//! - `session_store` - 会话持久化：批次状态落盘与恢复

pub mod numbering;
pub mod rename;
pub mod session_store;

pub use numbering::{compute_rename_plan, find_name_conflicts, NumberingParams};
pub use rename::{execute_rename, RenameReport};
pub use session_store::SessionStore;

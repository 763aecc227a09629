//! 重命名执行器 - 业务能力层
//!
//! 把确认后的重命名计划应用到文件系统。
//!
//! 执行分两个阶段：先把所有待改名文件移动到唯一的临时名，
//! 再从临时名移动到目标名。这样即使计划的目标名与其他条目的
//! 原始名重叠（如整体平移页码），也不会互相覆盖。
//!
//! 失败语义：
//! - 目标名冲突在执行任何重命名之前检出并拒绝
//! - 第一阶段失败时把已临时改名的文件恢复原名后报错
//! - 第二阶段失败时停止执行，未完成的临时文件恢复原名，
//!   错误中携带已生效的部分（不回滚已生效的重命名）

use crate::error::{AppError, AppResult};
use crate::models::plan::RenamePlanEntry;
use crate::services::numbering::find_name_conflicts;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 重命名执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameReport {
    /// 实际改名的文件数
    pub renamed: usize,
    /// 原名与新名相同、无需操作的文件数
    pub unchanged: usize,
}

/// 单个待执行的重命名操作
struct RenameOp {
    original_name: String,
    from: PathBuf,
    temp: PathBuf,
    to: PathBuf,
}

/// 按计划执行目录内的重命名
///
/// # 参数
/// - `dir`: 图片所在目录
/// - `plan`: 编号引擎产出并经操作者确认的计划
///
/// # 返回
/// 全部成功时返回统计报告；目标冲突返回 `Conflict`；
/// 中途 I/O 失败返回 `Rename`，其中 `completed` 列出已生效的原始文件名。
pub fn execute_rename(dir: impl AsRef<Path>, plan: &[RenamePlanEntry]) -> AppResult<RenameReport> {
    let dir = dir.as_ref();

    // 执行前检查目标名冲突，冲突计划一个文件都不动
    let duplicates = find_name_conflicts(plan);
    if !duplicates.is_empty() {
        return Err(AppError::Conflict { duplicates });
    }

    let mut ops = Vec::new();
    let mut unchanged = 0usize;
    for (i, entry) in plan.iter().enumerate() {
        if entry.is_noop() {
            unchanged += 1;
            continue;
        }
        ops.push(RenameOp {
            original_name: entry.original_name.clone(),
            from: dir.join(&entry.original_name),
            temp: dir.join(format!("__temp_rename_{:04}__", i)),
            to: dir.join(&entry.new_name),
        });
    }

    // 第一阶段：原名 → 临时名
    for (done, op) in ops.iter().enumerate() {
        if let Err(e) = std::fs::rename(&op.from, &op.temp) {
            // 恢复已临时改名的文件，保持目录处于原始状态
            for prev in &ops[..done] {
                if let Err(revert_err) = std::fs::rename(&prev.temp, &prev.from) {
                    warn!("恢复临时文件失败 ({}): {}", prev.original_name, revert_err);
                }
            }
            return Err(AppError::Rename {
                completed: Vec::new(),
                failed: op.original_name.clone(),
                source: e,
            });
        }
    }

    // 第二阶段：临时名 → 目标名
    let mut completed = Vec::new();
    for (done, op) in ops.iter().enumerate() {
        if let Err(e) = std::fs::rename(&op.temp, &op.to) {
            // 未到达的条目从临时名恢复原名；已生效的保持不变
            for rest in &ops[done..] {
                if let Err(revert_err) = std::fs::rename(&rest.temp, &rest.from) {
                    warn!("恢复临时文件失败 ({}): {}", rest.original_name, revert_err);
                }
            }
            return Err(AppError::Rename {
                completed,
                failed: op.original_name.clone(),
                source: e,
            });
        }
        completed.push(op.original_name.clone());
    }

    info!(
        "✓ 重命名完成: 改名 {} 个，未变化 {} 个",
        completed.len(),
        unchanged
    );

    Ok(RenameReport {
        renamed: completed.len(),
        unchanged,
    })
}

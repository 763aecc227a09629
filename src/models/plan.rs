//! 重命名计划数据模型

use crate::models::image::PageType;
use serde::{Deserialize, Serialize};

/// 重命名计划中的一行：旧文件名 → 新文件名的映射
///
/// 由编号引擎生成，与输入条目一一对应、顺序一致。
/// `left_page_label` / `right_page_label` 在不适用时为空字符串
/// （如 Skip 条目、单页模式的右页）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlanEntry {
    /// 原始文件名
    pub original_name: String,
    /// 计算出的新文件名（Skip 条目保持原名）
    pub new_name: String,
    /// 左页页码标签
    pub left_page_label: String,
    /// 右页页码标签
    pub right_page_label: String,
    /// 该条目的页面分类
    pub page_type: PageType,
}

impl RenamePlanEntry {
    /// 该条目是否为无变化的空操作
    pub fn is_noop(&self) -> bool {
        self.original_name == self.new_name
    }
}

//! 图片条目与页面分类数据模型
//!
//! 这些是纯数据结构：分类由操作者提供，不由系统计算

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 页面布局分类
///
/// 旧版操作者标签 TypeA / TypeB / TypeC 分别对应
/// RightOnly / Combined / LeftOnly，通过 serde alias 兼容读取。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    /// 跨页扫描：左右两个逻辑页，各消耗一个页码槽位
    Normal,
    /// 仅右页计页码，消耗一个槽位
    #[serde(alias = "TypeA")]
    RightOnly,
    /// 双页模式下的单一逻辑页（如整幅插图），消耗一个槽位
    #[serde(alias = "TypeB")]
    Combined,
    /// 仅左页计页码，消耗一个槽位
    #[serde(alias = "TypeC")]
    LeftOnly,
    /// 跳过：保留原文件名，不消耗页码
    Skip,
}

/// 扫描模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// 双页模式：一张图片是一个跨页（两个物理书页）
    #[default]
    Dual,
    /// 单页模式：一张图片是一个物理书页
    Single,
}

impl ScanMode {
    /// 模式的字符串表示（与持久化格式一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Dual => "dual",
            ScanMode::Single => "single",
        }
    }
}

/// 重命名序列中的一张扫描图片
///
/// 扫描目录时创建；两次扫描之间只由操作者修改（分类、页码覆盖）；
/// 重新扫描时整体丢弃重建，原有分类按 `original_name` 重新关联。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// 图片完整路径
    pub path: PathBuf,
    /// 原始文件名
    pub original_name: String,
    /// 在操作者排序的扫描序列中的位置，一经分配不可变，决定编号顺序
    pub sequence_index: usize,
    /// 页面布局分类
    pub page_type: PageType,
    /// 是否属于前言部分（正文起始索引之前），决定罗马/阿拉伯数字
    pub is_front_matter: bool,
    /// 左页页码覆盖：Some(n) 时该条目左页固定为 n，后续编号从 n 重新锚定
    #[serde(default)]
    pub left_page_override: Option<u32>,
}

impl ImageEntry {
    /// 创建一个默认分类（Normal、无覆盖）的条目
    pub fn new(path: PathBuf, original_name: String, sequence_index: usize) -> Self {
        Self {
            path,
            original_name,
            sequence_index,
            page_type: PageType::Normal,
            is_front_matter: false,
            left_page_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_type_legacy_alias() {
        // 旧版标签应映射到新分类
        let t: PageType = serde_json::from_str("\"TypeA\"").unwrap();
        assert_eq!(t, PageType::RightOnly);
        let t: PageType = serde_json::from_str("\"TypeB\"").unwrap();
        assert_eq!(t, PageType::Combined);
        let t: PageType = serde_json::from_str("\"TypeC\"").unwrap();
        assert_eq!(t, PageType::LeftOnly);
    }

    #[test]
    fn test_scan_mode_serde() {
        let m: ScanMode = serde_json::from_str("\"dual\"").unwrap();
        assert_eq!(m, ScanMode::Dual);
        assert_eq!(serde_json::to_string(&ScanMode::Single).unwrap(), "\"single\"");
    }
}

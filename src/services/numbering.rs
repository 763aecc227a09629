//! 编号引擎 - 业务能力层
//!
//! 根据页面分类和罗马/阿拉伯编号方案，为有序的扫描图片序列
//! 计算规范的输出文件名。
//!
//! 职责：
//! - 纯函数：相同输入产生逐字节相同的计划，不访问文件系统
//! - 维护罗马、阿拉伯两个单调递增的页码计数器
//! - 按页面分类决定每个条目消耗的页码槽位数
//! - 检测计划内的目标文件名冲突
//!
//! 文件名格式（与批次管线的识别模式一一对应）：
//! - 双页阿拉伯: `Page-004-005.JPG`
//! - 双页罗马:   `Page-r-iv-v.JPG`
//! - 单槽阿拉伯: `Page-004.JPG`
//! - 单槽罗马:   `Page-r-iv.JPG`

use crate::error::{AppError, AppResult};
use crate::models::image::{ImageEntry, PageType, ScanMode};
use crate::models::plan::RenamePlanEntry;
use crate::utils::roman::to_roman;
use std::collections::HashMap;
use std::path::Path;

/// 编号参数
#[derive(Debug, Clone, Copy)]
pub struct NumberingParams {
    /// 扫描模式
    pub scan_mode: ScanMode,
    /// 第一个按正文（阿拉伯数字）编号的条目索引；
    /// 0 表示没有前言，超过列表长度表示全部为前言
    pub body_start_index: usize,
    /// 罗马计数器起始值
    pub roman_start: u32,
    /// 阿拉伯计数器起始值
    pub arabic_start: u32,
}

/// 计算重命名计划
///
/// 输出与输入等长、顺序一致、一一对应。
///
/// # 参数
/// - `entries`: 按 `sequence_index` 排序的图片条目
/// - `params`: 编号参数
///
/// # 返回
/// 单页模式下出现 `RightOnly` / `LeftOnly` 分类时返回参数错误
/// （这两种分类只在双页模式下提供给操作者）。
pub fn compute_rename_plan(
    entries: &[ImageEntry],
    params: &NumberingParams,
) -> AppResult<Vec<RenamePlanEntry>> {
    let mut plan = Vec::with_capacity(entries.len());

    // 正文起始为 0 时没有前言部分，直接从阿拉伯计数器开始
    let mut is_roman = params.body_start_index > 0;
    let mut current = if is_roman {
        params.roman_start
    } else {
        params.arabic_start
    };

    for (i, entry) in entries.iter().enumerate() {
        // 到达正文起始索引时切换到阿拉伯计数器
        if params.body_start_index > 0 && i == params.body_start_index {
            is_roman = false;
            current = params.arabic_start;
        }

        // 页码覆盖只改变数值并重新锚定后续编号，不影响罗马/阿拉伯切换点
        if let Some(ov) = entry.left_page_override.filter(|v| *v > 0) {
            current = ov;
        }

        let ext = extension_of(&entry.original_name);

        let planned = match (params.scan_mode, entry.page_type) {
            (_, PageType::Skip) => RenamePlanEntry {
                original_name: entry.original_name.clone(),
                new_name: entry.original_name.clone(),
                left_page_label: String::new(),
                right_page_label: String::new(),
                page_type: entry.page_type,
            },

            (ScanMode::Dual, PageType::Normal) => {
                let (left, right) = (current, current + 1);
                current += 2;
                RenamePlanEntry {
                    original_name: entry.original_name.clone(),
                    new_name: dual_name(left, right, is_roman, &ext),
                    left_page_label: label(left, is_roman),
                    right_page_label: label(right, is_roman),
                    page_type: entry.page_type,
                }
            }

            // 仅左页计页码：文件名仍是跨页对 (N, N+1)，但只有左页进入编号
            (ScanMode::Dual, PageType::LeftOnly) => {
                let left = current;
                current += 1;
                RenamePlanEntry {
                    original_name: entry.original_name.clone(),
                    new_name: dual_name(left, left + 1, is_roman, &ext),
                    left_page_label: label(left, is_roman),
                    right_page_label: String::new(),
                    page_type: entry.page_type,
                }
            }

            // 仅右页计页码：跨页对 (N-1, N)，只有右页进入编号
            (ScanMode::Dual, PageType::RightOnly) => {
                let right = current;
                current += 1;
                RenamePlanEntry {
                    original_name: entry.original_name.clone(),
                    new_name: dual_name(right.saturating_sub(1), right, is_roman, &ext),
                    left_page_label: String::new(),
                    right_page_label: label(right, is_roman),
                    page_type: entry.page_type,
                }
            }

            // 双页模式下的单一逻辑页：消耗一个槽位，使用单槽文件名
            (ScanMode::Dual, PageType::Combined) => {
                let page = current;
                current += 1;
                RenamePlanEntry {
                    original_name: entry.original_name.clone(),
                    new_name: single_name(page, is_roman, &ext),
                    left_page_label: label(page, is_roman),
                    right_page_label: String::new(),
                    page_type: entry.page_type,
                }
            }

            // 单页模式：Normal 与 Combined 行为相同，都是一个逻辑页
            (ScanMode::Single, PageType::Normal | PageType::Combined) => {
                let page = current;
                current += 1;
                RenamePlanEntry {
                    original_name: entry.original_name.clone(),
                    new_name: single_name(page, is_roman, &ext),
                    left_page_label: label(page, is_roman),
                    right_page_label: String::new(),
                    page_type: entry.page_type,
                }
            }

            (ScanMode::Single, PageType::RightOnly | PageType::LeftOnly) => {
                return Err(AppError::validation(format!(
                    "单页模式不支持 {:?} 分类 (条目: {})",
                    entry.page_type, entry.original_name
                )));
            }
        };

        plan.push(planned);
    }

    Ok(plan)
}

/// 找出计划中重复的目标文件名
///
/// 多个条目映射到同一个目标时，重复的名字按字典序返回；
/// 空结果表示计划可以安全执行。
pub fn find_name_conflicts(plan: &[RenamePlanEntry]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in plan {
        *counts.entry(entry.new_name.as_str()).or_default() += 1;
    }

    let mut duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_string())
        .collect();
    duplicates.sort();
    duplicates
}

/// 取原始文件名的扩展名（统一大写，缺失时默认 .JPG）
fn extension_of(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_uppercase()),
        _ => ".JPG".to_string(),
    }
}

/// 页码标签（罗马或阿拉伯的字符串表示）
fn label(n: u32, is_roman: bool) -> String {
    if is_roman {
        to_roman(n)
    } else {
        n.to_string()
    }
}

/// 跨页文件名
fn dual_name(left: u32, right: u32, is_roman: bool, ext: &str) -> String {
    if is_roman {
        format!("Page-r-{}-{}{}", to_roman(left), to_roman(right), ext)
    } else {
        format!("Page-{:03}-{:03}{}", left, right, ext)
    }
}

/// 单槽文件名
fn single_name(page: u32, is_roman: bool, ext: &str) -> String {
    if is_roman {
        format!("Page-r-{}{}", to_roman(page), ext)
    } else {
        format!("Page-{:03}{}", page, ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, idx: usize, page_type: PageType) -> ImageEntry {
        let mut e = ImageEntry::new(PathBuf::from(name), name.to_string(), idx);
        e.page_type = page_type;
        e
    }

    fn dual_params(body_start: usize) -> NumberingParams {
        NumberingParams {
            scan_mode: ScanMode::Dual,
            body_start_index: body_start,
            roman_start: 1,
            arabic_start: 1,
        }
    }

    #[test]
    fn test_plan_length_and_order_preserved() {
        let entries = vec![
            entry("c.jpg", 0, PageType::Normal),
            entry("a.jpg", 1, PageType::Skip),
            entry("b.jpg", 2, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert_eq!(plan.len(), entries.len());
        let originals: Vec<_> = plan.iter().map(|p| p.original_name.as_str()).collect();
        assert_eq!(originals, vec!["c.jpg", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_idempotence() {
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("b.jpg", 1, PageType::RightOnly),
            entry("c.jpg", 2, PageType::Combined),
        ];
        let first = compute_rename_plan(&entries, &dual_params(1)).unwrap();
        let second = compute_rename_plan(&entries, &dual_params(1)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_roman_then_arabic_scenario() {
        // 双页模式，正文从索引 2 开始：条目 0-1 罗马，2 起阿拉伯
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("b.jpg", 1, PageType::Normal),
            entry("c.jpg", 2, PageType::Normal),
        ];
        let params = NumberingParams {
            scan_mode: ScanMode::Dual,
            body_start_index: 2,
            roman_start: 1,
            arabic_start: 1,
        };
        let plan = compute_rename_plan(&entries, &params).unwrap();

        assert_eq!(plan[0].left_page_label, "i");
        assert_eq!(plan[0].right_page_label, "ii");
        assert_eq!(plan[0].new_name, "Page-r-i-ii.JPG");
        assert_eq!(plan[1].left_page_label, "iii");
        assert_eq!(plan[1].right_page_label, "iv");
        assert_eq!(plan[2].left_page_label, "1");
        assert_eq!(plan[2].right_page_label, "2");
        assert_eq!(plan[2].new_name, "Page-001-002.JPG");
    }

    #[test]
    fn test_arabic_counter_continues_across_spreads() {
        // bodyStart=2 时第三个条目从阿拉伯 1,2 开始，后续继续 3,4
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("b.jpg", 1, PageType::Normal),
            entry("c.jpg", 2, PageType::Normal),
            entry("d.jpg", 3, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(2)).unwrap();
        assert_eq!(plan[1].new_name, "Page-r-iii-iv.JPG");
        assert_eq!(plan[2].new_name, "Page-001-002.JPG");
        assert_eq!(plan[3].new_name, "Page-003-004.JPG");
    }

    #[test]
    fn test_body_start_zero_all_arabic() {
        let entries = vec![entry("a.jpg", 0, PageType::Normal)];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert_eq!(plan[0].new_name, "Page-001-002.JPG");
    }

    #[test]
    fn test_body_start_beyond_length_all_roman() {
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("b.jpg", 1, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(10)).unwrap();
        assert_eq!(plan[0].new_name, "Page-r-i-ii.JPG");
        assert_eq!(plan[1].new_name, "Page-r-iii-iv.JPG");
    }

    #[test]
    fn test_override_reanchors_subsequent_entries() {
        // e1 覆盖为 50：e1 左页 = 50，e2 从 50 + 消耗槽位继续
        let mut e1 = entry("b.jpg", 1, PageType::Normal);
        e1.left_page_override = Some(50);
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            e1,
            entry("c.jpg", 2, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert_eq!(plan[0].left_page_label, "1");
        assert_eq!(plan[1].left_page_label, "50");
        assert_eq!(plan[1].right_page_label, "51");
        assert_eq!(plan[2].left_page_label, "52");
        assert_eq!(plan[2].new_name, "Page-052-053.JPG");
    }

    #[test]
    fn test_skip_keeps_name_and_consumes_nothing() {
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("keep-me.png", 1, PageType::Skip),
            entry("c.jpg", 2, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert_eq!(plan[1].new_name, "keep-me.png");
        assert_eq!(plan[1].left_page_label, "");
        assert_eq!(plan[1].right_page_label, "");
        // Skip 不消耗页码，c.jpg 紧接 a.jpg 之后
        assert_eq!(plan[2].new_name, "Page-003-004.JPG");
    }

    #[test]
    fn test_right_only_and_left_only_slots() {
        let entries = vec![
            entry("a.jpg", 0, PageType::RightOnly),
            entry("b.jpg", 1, PageType::LeftOnly),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        // 右页 = 1，配对左页为 0
        assert_eq!(plan[0].left_page_label, "");
        assert_eq!(plan[0].right_page_label, "1");
        assert_eq!(plan[0].new_name, "Page-000-001.JPG");
        // 左页 = 2，配对右页为 3（不计入编号）
        assert_eq!(plan[1].left_page_label, "2");
        assert_eq!(plan[1].right_page_label, "");
        assert_eq!(plan[1].new_name, "Page-002-003.JPG");
    }

    #[test]
    fn test_combined_single_slot_single_name() {
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("b.jpg", 1, PageType::Combined),
            entry("c.jpg", 2, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert_eq!(plan[1].new_name, "Page-003.JPG");
        assert_eq!(plan[1].left_page_label, "3");
        assert_eq!(plan[1].right_page_label, "");
        assert_eq!(plan[2].new_name, "Page-004-005.JPG");
    }

    #[test]
    fn test_single_mode_normal_and_combined_identical() {
        let entries_normal = vec![entry("a.jpg", 0, PageType::Normal)];
        let entries_combined = vec![entry("a.jpg", 0, PageType::Combined)];
        let params = NumberingParams {
            scan_mode: ScanMode::Single,
            body_start_index: 0,
            roman_start: 1,
            arabic_start: 7,
        };
        let p1 = compute_rename_plan(&entries_normal, &params).unwrap();
        let p2 = compute_rename_plan(&entries_combined, &params).unwrap();
        assert_eq!(p1[0].new_name, "Page-007.JPG");
        assert_eq!(p1[0].new_name, p2[0].new_name);
        assert_eq!(p1[0].left_page_label, p2[0].left_page_label);
    }

    #[test]
    fn test_single_mode_rejects_dual_only_types() {
        let entries = vec![entry("a.jpg", 0, PageType::LeftOnly)];
        let params = NumberingParams {
            scan_mode: ScanMode::Single,
            body_start_index: 0,
            roman_start: 1,
            arabic_start: 1,
        };
        assert!(matches!(
            compute_rename_plan(&entries, &params),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_monotonic_labels_without_override() {
        let entries: Vec<_> = (0..6)
            .map(|i| entry(&format!("{:02}.jpg", i), i, PageType::Normal))
            .collect();
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        let mut prev = 0u32;
        for p in &plan {
            let left: u32 = p.left_page_label.parse().unwrap();
            assert!(left >= prev);
            prev = left;
        }
    }

    #[test]
    fn test_extension_preserved_uppercase() {
        let entries = vec![
            entry("a.png", 0, PageType::Normal),
            entry("b.tiff", 1, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert_eq!(plan[0].new_name, "Page-001-002.PNG");
        assert_eq!(plan[1].new_name, "Page-003-004.TIFF");
    }

    #[test]
    fn test_conflict_detection() {
        // 覆盖把 b 拉回到与 a 相同的页码，产生同名目标
        let mut b = entry("b.jpg", 1, PageType::Normal);
        b.left_page_override = Some(1);
        let entries = vec![entry("a.jpg", 0, PageType::Normal), b];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        let conflicts = find_name_conflicts(&plan);
        assert_eq!(conflicts, vec!["Page-001-002.JPG".to_string()]);
    }

    #[test]
    fn test_no_conflicts_on_clean_plan() {
        let entries = vec![
            entry("a.jpg", 0, PageType::Normal),
            entry("b.jpg", 1, PageType::Normal),
        ];
        let plan = compute_rename_plan(&entries, &dual_params(0)).unwrap();
        assert!(find_name_conflicts(&plan).is_empty());
    }
}

//! 图片目录扫描与条目加载
//!
//! 扫描目录生成 `ImageEntry` 列表；重新扫描后按原始文件名
//! 把旧条目上的分类重新关联到新条目

use crate::error::{AppError, AppResult};
use crate::models::image::ImageEntry;
use std::collections::HashMap;
use std::path::Path;

/// 支持的图片扩展名（小写）
const IMAGE_EXTS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

/// 扫描目录，返回按文件名排序、索引连续的图片条目列表
///
/// 子目录和非图片文件被忽略。条目的 `sequence_index`
/// 在排序后重新分配，保证与列表位置一致。
pub fn load_images_from_folder(dir: impl AsRef<Path>) -> AppResult<Vec<ImageEntry>> {
    let dir = dir.as_ref();
    let read_dir = std::fs::read_dir(dir)
        .map_err(|e| AppError::file(dir.display().to_string(), e))?;

    let mut entries = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| AppError::file(dir.display().to_string(), e))?;
        let path = item.path();
        if path.is_dir() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !IMAGE_EXTS.contains(&ext.as_str()) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        entries.push(ImageEntry::new(path.clone(), name.to_string(), 0));
    }

    entries.sort_by(|a, b| a.original_name.cmp(&b.original_name));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.sequence_index = i;
    }

    Ok(entries)
}

/// 把旧条目的分类与页码覆盖按 `original_name` 关联到新扫描的条目上
///
/// 重新扫描会整体重建条目列表（物理顺序和索引可能变化），
/// 只有文件名仍然存在的条目保留原有分类。
pub fn reassociate_classifications(old: &[ImageEntry], new: &mut [ImageEntry]) {
    let by_name: HashMap<&str, &ImageEntry> = old
        .iter()
        .map(|e| (e.original_name.as_str(), e))
        .collect();

    for entry in new.iter_mut() {
        if let Some(prev) = by_name.get(entry.original_name.as_str()) {
            entry.page_type = prev.page_type;
            entry.left_page_override = prev.left_page_override;
        }
    }
}

/// 按正文起始索引刷新每个条目的前言标记
pub fn apply_front_matter(entries: &mut [ImageEntry], body_start_index: usize) {
    for entry in entries.iter_mut() {
        entry.is_front_matter = entry.sequence_index < body_start_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::PageType;
    use std::path::PathBuf;

    fn entry(name: &str, idx: usize) -> ImageEntry {
        ImageEntry::new(PathBuf::from(name), name.to_string(), idx)
    }

    #[test]
    fn test_load_images_sorted_with_contiguous_indices() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.png", "c.txt", "d.TIF"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let entries = load_images_from_folder(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.original_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "d.TIF"]);
        let indices: Vec<_> = entries.iter().map(|e| e.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_load_images_missing_dir() {
        assert!(load_images_from_folder("/nonexistent/path/here").is_err());
    }

    #[test]
    fn test_reassociate_by_original_name() {
        let mut old_a = entry("a.jpg", 0);
        old_a.page_type = PageType::Skip;
        old_a.left_page_override = Some(7);
        let old = vec![old_a, entry("b.jpg", 1)];

        // 重新扫描后 a.jpg 的位置变了，新增了 c.jpg
        let mut new = vec![entry("b.jpg", 0), entry("a.jpg", 1), entry("c.jpg", 2)];
        reassociate_classifications(&old, &mut new);

        assert_eq!(new[1].page_type, PageType::Skip);
        assert_eq!(new[1].left_page_override, Some(7));
        assert_eq!(new[0].page_type, PageType::Normal);
        assert_eq!(new[2].page_type, PageType::Normal);
    }

    #[test]
    fn test_apply_front_matter() {
        let mut entries = vec![entry("a.jpg", 0), entry("b.jpg", 1), entry("c.jpg", 2)];
        apply_front_matter(&mut entries, 2);
        assert!(entries[0].is_front_matter);
        assert!(entries[1].is_front_matter);
        assert!(!entries[2].is_front_matter);
    }
}

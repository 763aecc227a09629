//! 单页处理器 - 编排层
//!
//! 处理批次中的一张图片：调用识别接口，按扫描模式把文本块
//! 分配到左右页，带页码标题写出文本结果。
//!
//! 同时持有规范文件名的识别模式（与编号引擎的输出格式对应），
//! 批次管线用它过滤工作列表，这里用它从文件名还原页码标签。

use crate::clients::{RecognizedText, Recognizer};
use crate::error::{AppError, AppResult};
use crate::models::image::ScanMode;
use crate::models::session::OcrSettings;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// 规范文件名的识别模式集合
struct FilePatterns {
    dual_arabic: Regex,
    dual_roman: Regex,
    single_arabic: Regex,
    single_roman: Regex,
}

/// 编号引擎可能产出的扩展名（原始扩展名统一大写后保留）
const EXT_GROUP: &str = r"\.(?i:jpg|jpeg|png|tif|tiff|bmp)";

fn patterns() -> &'static FilePatterns {
    static PATTERNS: OnceLock<FilePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FilePatterns {
        dual_arabic: Regex::new(&format!(r"^Page-(\d{{3}})-(\d{{3}})(-[a-zA-Z])?{}$", EXT_GROUP))
            .expect("dual arabic 模式非法"),
        dual_roman: Regex::new(&format!(
            r"^Page-r-([ivxlcdm]+)-([ivxlcdm]+)(-[a-zA-Z])?{}$",
            EXT_GROUP
        ))
        .expect("dual roman 模式非法"),
        single_arabic: Regex::new(&format!(r"^Page-(\d{{3}})(-[a-zA-Z])?{}$", EXT_GROUP))
            .expect("single arabic 模式非法"),
        single_roman: Regex::new(&format!(r"^Page-r-([ivxlcdm]+)(-[a-zA-Z])?{}$", EXT_GROUP))
            .expect("single roman 模式非法"),
    })
}

/// 文件名是否匹配指定扫描模式的规范格式
///
/// 双页模式也接受单槽文件名（Combined 条目的产出）。
pub fn matches_ocr_pattern(name: &str, scan_mode: ScanMode) -> bool {
    let p = patterns();
    match scan_mode {
        ScanMode::Single => p.single_arabic.is_match(name) || p.single_roman.is_match(name),
        ScanMode::Dual => {
            p.dual_arabic.is_match(name)
                || p.dual_roman.is_match(name)
                || p.single_arabic.is_match(name)
                || p.single_roman.is_match(name)
        }
    }
}

/// 从跨页文件名还原左右页标签，如 ("Page 4", "Page 5")
///
/// 单槽文件名只有左标签；无法识别时两个都为空。
pub fn page_labels_from_filename(name: &str) -> (String, String) {
    let p = patterns();
    if let Some(m) = p.dual_roman.captures(name) {
        return (format!("Page {}", &m[1]), format!("Page {}", &m[2]));
    }
    if let Some(m) = p.dual_arabic.captures(name) {
        return (
            format!("Page {}", strip_leading_zeros(&m[1])),
            format!("Page {}", strip_leading_zeros(&m[2])),
        );
    }
    (page_label_from_filename_single(name), String::new())
}

/// 从单槽文件名还原页标签，如 "Page iv"
pub fn page_label_from_filename_single(name: &str) -> String {
    let p = patterns();
    if let Some(m) = p.single_roman.captures(name) {
        return format!("Page {}", &m[1]);
    }
    if let Some(m) = p.single_arabic.captures(name) {
        return format!("Page {}", strip_leading_zeros(&m[1]));
    }
    String::new()
}

/// 去掉显示用页码的前导零（全零时保留一个 "0"）
fn strip_leading_zeros(s: &str) -> String {
    let trimmed = s.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 一张图片对应的输出文件路径（同名 .txt）
pub fn output_path_for(image_name: &str, output_dir: &Path) -> PathBuf {
    let stem = Path::new(image_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(image_name);
    output_dir.join(format!("{}.txt", stem))
}

/// 处理一张图片：识别 → 左右页拆分 → 写出带页码标题的文本
///
/// # 返回
/// 成功时返回输出文件路径；识别或写出失败时返回错误，
/// 调用方记录日志后继续处理其余文件。
pub async fn process_one_image(
    recognizer: &dyn Recognizer,
    image_path: &Path,
    settings: &OcrSettings,
) -> AppResult<PathBuf> {
    let base_name = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("文件名非法: {}", image_path.display())))?;
    let output_path = output_path_for(base_name, Path::new(&settings.output_dir));

    let recognized = recognizer.recognize(image_path, &settings.languages).await?;

    let content = match settings.scan_mode {
        ScanMode::Single => {
            let label = page_label_from_filename_single(base_name);
            render_page(&label, &recognized.joined())
        }
        ScanMode::Dual => render_dual_page(base_name, &recognized),
    };

    std::fs::write(&output_path, content)
        .map_err(|e| AppError::file(output_path.display().to_string(), e))?;

    debug!("✓ 输出: {}", output_path.display());
    Ok(output_path)
}

/// 双页模式：按图片中线把文本块分到左右页
fn render_dual_page(base_name: &str, recognized: &RecognizedText) -> String {
    let (left_label, right_label) = page_labels_from_filename(base_name);

    // 单槽文件名（Combined 条目）整页不拆分
    if right_label.is_empty() {
        return render_page(&left_label, &recognized.joined());
    }

    let mid_x = recognized.width / 2.0;
    let mut left_texts = Vec::new();
    let mut right_texts = Vec::new();
    for block in &recognized.blocks {
        if block.center_x < mid_x {
            left_texts.push(block.text.as_str());
        } else {
            right_texts.push(block.text.as_str());
        }
    }

    format!(
        "{}\n\n{}",
        render_page(&left_label, &left_texts.join("\n\n")),
        render_page(&right_label, &right_texts.join("\n\n"))
    )
}

/// 渲染一页输出：页码标题 + 正文
fn render_page(label: &str, text: &str) -> String {
    if label.is_empty() {
        format!("{}\n", text)
    } else {
        format!("[{}]\n{}\n", label, text)
    }
}

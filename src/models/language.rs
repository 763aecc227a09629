//! 识别语言选项
//!
//! 静态的语言代码 → 显示名称对照表，供宿主层展示下拉选项、
//! 校验语言提示时查询

use phf::phf_map;
use serde::Serialize;

/// 语言代码 → 显示名称
static LANGUAGE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "en" => "English",
    "ja" => "日本語",
    "ru" => "Русский",
    "de" => "Deutsch",
    "it" => "Italiano",
    "es" => "Español",
    "fr" => "Français",
    "zh-TW" => "繁體中文",
    "zh-CN" => "簡體中文",
    "nl" => "Nederlands",
    "fa" => "فارسی",
    "vi" => "Tiếng Việt",
    "pl" => "Polski",
    "pt" => "Português",
};

/// 下拉选项的展示顺序
const DISPLAY_ORDER: [&str; 14] = [
    "en", "ja", "ru", "de", "it", "es", "fr", "zh-TW", "zh-CN", "nl", "fa", "vi", "pl", "pt",
];

/// 一个语言选项
#[derive(Debug, Clone, Serialize)]
pub struct LangOption {
    pub display: &'static str,
    pub code: &'static str,
}

/// 返回全部可用语言选项（按展示顺序）
pub fn available_languages() -> Vec<LangOption> {
    DISPLAY_ORDER
        .iter()
        .map(|&code| LangOption {
            display: LANGUAGE_NAMES.get(code).copied().unwrap_or(code),
            code,
        })
        .collect()
}

/// 语言代码是否在支持列表中
pub fn is_supported(code: &str) -> bool {
    LANGUAGE_NAMES.contains_key(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_languages_order() {
        let langs = available_languages();
        assert_eq!(langs.len(), 14);
        assert_eq!(langs[0].code, "en");
        assert_eq!(langs[0].display, "English");
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported("zh-TW"));
        assert!(!is_supported("xx"));
    }
}

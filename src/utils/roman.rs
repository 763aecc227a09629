//! 罗马数字转换工具
//!
//! 前言页（front matter）的页码使用小写罗马数字，如 i, iv, xii

/// 数值与罗马符号的对照表，从大到小
const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// 将整数转换为小写罗马数字
///
/// 0 没有罗马数字表示，返回 "0"（出现在 RightOnly 条目右页为 1 时的左侧配对页码）
pub fn to_roman(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut result = String::new();
    for (value, symbol) in ROMAN_TABLE {
        while n >= value {
            result.push_str(symbol);
            n -= value;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_roman_basic() {
        assert_eq!(to_roman(1), "i");
        assert_eq!(to_roman(2), "ii");
        assert_eq!(to_roman(4), "iv");
        assert_eq!(to_roman(9), "ix");
        assert_eq!(to_roman(14), "xiv");
        assert_eq!(to_roman(40), "xl");
        assert_eq!(to_roman(90), "xc");
        assert_eq!(to_roman(400), "cd");
        assert_eq!(to_roman(1987), "mcmlxxxvii");
    }

    #[test]
    fn test_to_roman_zero() {
        assert_eq!(to_roman(0), "0");
    }
}

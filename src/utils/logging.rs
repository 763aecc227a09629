//! 日志工具模块
//!
//! 提供 tracing 订阅器初始化和批次日志的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 默认级别 info，可通过 RUST_LOG 环境变量覆盖。
/// 重复调用是安全的（测试中会多次初始化）。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录批次启动信息
///
/// # 参数
/// - `total`: 待处理文件总数
/// - `concurrency`: 最大并发数
pub fn log_batch_startup(total: usize, concurrency: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 OCR 批次启动 - 并发识别模式");
    info!("📄 待处理文件: {} 个", total);
    info!("📊 最大并发数: {}", concurrency);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成统计
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
pub fn log_batch_complete(success: usize, failed: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批次处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}", success);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

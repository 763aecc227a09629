use anyhow::{bail, Result};
use book_scan_ocr::utils::logging;
use book_scan_ocr::{App, Config, PipelineEvent};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（config.toml + 环境变量覆盖）
    let mut config = Config::from_env();

    if config.image_dir.is_empty() {
        bail!("请通过 config.toml 或 IMAGE_DIR 环境变量指定图片目录");
    }

    let (app, mut events) = App::new(config.clone());

    // 输出目录缺省时按图片目录推导
    if config.output_dir.is_empty() {
        config.output_dir = app
            .default_output_dir(&config.image_dir)
            .display()
            .to_string();
    }

    // 恢复提示：存在未完成的会话时继续处理剩余文件
    if let Some(session) = app.pending_session() {
        info!(
            "🔄 发现未完成的会话: {} ({}/{} 已完成)，将续传处理",
            session.image_dir,
            session.processed_count(),
            session.total_files
        );
    }

    // 启动批次并消费事件直到结束
    let handle = app.start_ocr(config.ocr_settings())?;

    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Progress { current, total, .. } => {
                info!("📊 进度: {}/{}", current, total);
            }
            PipelineEvent::Finished => break,
            // 日志事件在发送端已写入 tracing
            PipelineEvent::Log { .. } => {}
        }
    }

    let state = handle.await?;
    info!("批次结束: {:?}", state);

    Ok(())
}

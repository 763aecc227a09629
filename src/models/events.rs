//! 批次事件模型
//!
//! 批次管线通过单一事件通道向宿主层（UI、日志、测试）推送类型化事件。
//! 所有事件经由同一个发送端出口，单个消费者观察到的顺序与发送顺序一致。

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

/// 批次运行期间推送给宿主层的事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PipelineEvent {
    /// 进度更新：已完成 current / 共 total
    #[serde(rename_all = "camelCase")]
    Progress {
        current: usize,
        total: usize,
        percent: f64,
    },
    /// 日志行，is_error 标记错误级别
    #[serde(rename_all = "camelCase")]
    Log {
        filename: Option<String>,
        message: String,
        is_error: bool,
    },
    /// 批次结束（完成、取消或失败后都会发出一次）
    Finished,
}

/// 事件发送端
///
/// 可克隆；所有 worker 共享同一个底层通道，构成单一序列化出口。
/// 接收端被丢弃后事件静默丢弃（宿主不关心时批次照常运行）。
#[derive(Clone)]
pub struct EventSender {
    tx: UnboundedSender<PipelineEvent>,
}

impl EventSender {
    /// 创建事件通道，返回发送端与接收端
    pub fn channel() -> (Self, UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// 推送进度事件
    pub fn progress(&self, current: usize, total: usize) {
        let percent = if total > 0 {
            current as f64 / total as f64
        } else {
            0.0
        };
        let _ = self.tx.send(PipelineEvent::Progress {
            current,
            total,
            percent,
        });
    }

    /// 推送日志事件，同时写入 tracing 日志
    pub fn log(&self, filename: Option<&str>, message: impl Into<String>, is_error: bool) {
        let message = message.into();
        match (is_error, filename) {
            (true, Some(name)) => error!("[{}] {}", name, message),
            (true, None) => error!("{}", message),
            (false, Some(name)) => info!("[{}] {}", name, message),
            (false, None) => info!("{}", message),
        }
        let _ = self.tx.send(PipelineEvent::Log {
            filename: filename.map(str::to_string),
            message,
            is_error,
        });
    }

    /// 推送批次结束事件
    pub fn finished(&self) {
        let _ = self.tx.send(PipelineEvent::Finished);
    }
}

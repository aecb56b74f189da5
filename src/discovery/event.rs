//! 查询事件
//!
//! resolver 本身不直接打日志，而是把每个 lookup 节点的查询结果作为结构化事件交给
//! [`LookupObserver`]，由宿主程序决定如何处理。默认的 [`TracingObserver`] 输出到 tracing。

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::discovery::endpoint::Endpoint;

/// 单个 lookup 节点的查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// HTTP 200，响应已解析
    Found {
        /// 该节点返回的 producer 数
        producers: usize,
        /// 其中首次出现（被合并进结果）的个数
        added: usize,
        /// 格式不对被丢弃的条目数
        skipped: usize,
    },

    /// HTTP 404：该节点上没有这个 topic
    NotFound,

    /// HTTP 200 但响应体不是合法 JSON，按 0 个 producer 处理
    Malformed { detail: String },

    /// 其他失败，整个 resolve 调用随之中止
    Failed {
        status: Option<u16>,
        detail: String,
        body: String,
    },
}

/// 查询事件
#[derive(Debug, Clone)]
pub struct LookupEvent {
    pub topic: String,
    pub endpoint: Endpoint,
    pub url: String,
    pub outcome: LookupOutcome,
    pub timestamp: DateTime<Utc>,
}

impl LookupEvent {
    pub fn new(
        topic: impl Into<String>,
        endpoint: &Endpoint,
        url: impl Into<String>,
        outcome: LookupOutcome,
    ) -> Self {
        Self {
            topic: topic.into(),
            endpoint: endpoint.clone(),
            url: url.into(),
            outcome,
            timestamp: Utc::now(),
        }
    }
}

/// 查询事件接收者
pub trait LookupObserver: Send + Sync {
    fn on_event(&self, event: &LookupEvent);
}

impl<F> LookupObserver for F
where
    F: Fn(&LookupEvent) + Send + Sync,
{
    fn on_event(&self, event: &LookupEvent) {
        self(event)
    }
}

/// 默认观察者：把事件写入 tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LookupObserver for TracingObserver {
    fn on_event(&self, event: &LookupEvent) {
        match &event.outcome {
            LookupOutcome::Found {
                producers,
                added,
                skipped,
            } => {
                debug!(
                    topic = %event.topic,
                    endpoint = %event.endpoint,
                    producers = *producers,
                    added = *added,
                    skipped = *skipped,
                    "Lookup succeeded"
                );
            }
            LookupOutcome::NotFound => {
                info!(
                    topic = %event.topic,
                    endpoint = %event.endpoint,
                    url = %event.url,
                    "Topic not found at lookup endpoint"
                );
            }
            LookupOutcome::Malformed { detail } => {
                warn!(
                    topic = %event.topic,
                    endpoint = %event.endpoint,
                    error = %detail,
                    "Lookup response is not valid JSON, treating as no producers"
                );
            }
            LookupOutcome::Failed {
                status,
                detail,
                body,
            } => {
                error!(
                    topic = %event.topic,
                    endpoint = %event.endpoint,
                    url = %event.url,
                    status = ?status,
                    error = %detail,
                    body = %body,
                    "Lookup request failed"
                );
            }
        }
    }
}

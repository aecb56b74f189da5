//! topic → producer 解析器
//!
//! 对每个 lookup 节点发起一次查询，合并各节点返回的 producer 并按
//! `broadcast_address:tcp_port` 去重：
//! - 200：解析响应并合并
//! - 404：该节点上没有这个 topic，跳过
//! - 其他状态码 / 网络错误 / 超时：整个调用失败，不返回部分结果
//!
//! 本层不做重试，每次调用每个节点只查询一次。

use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::Url;

use crate::config::{LookupConfig, QueryMode};
use crate::discovery::backend::{HttpBackend, LookupBackend};
use crate::discovery::endpoint::Endpoint;
use crate::discovery::event::{LookupEvent, LookupObserver, LookupOutcome, TracingObserver};
use crate::discovery::response::LookupResponse;
use crate::discovery::result::ResolutionResult;
use crate::error::{LookupError, Result};

/// 单个节点查询后可合并的内容
enum Reply {
    Found(LookupResponse),
    /// 404 或响应体无法解析
    Empty,
}

/// lookup 解析器
///
/// 不持有任何跨调用的可变状态，可以在多个任务中并发调用 [`LookupResolver::resolve`]
#[derive(Clone)]
pub struct LookupResolver {
    endpoints: Vec<Endpoint>,
    backend: Arc<dyn LookupBackend>,
    observer: Arc<dyn LookupObserver>,
    query_mode: QueryMode,
}

impl LookupResolver {
    /// 从配置创建（HTTP 后端）
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::with_backend(config.endpoints()?, Arc::new(backend))
            .with_query_mode(config.query_mode))
    }

    /// 使用自定义后端创建
    ///
    /// 地址列表为空时使用 `localhost:4161`
    pub fn with_backend(endpoints: Vec<Endpoint>, backend: Arc<dyn LookupBackend>) -> Self {
        Self {
            endpoints: Endpoint::or_default(endpoints),
            backend,
            observer: Arc::new(TracingObserver),
            query_mode: QueryMode::Sequential,
        }
    }

    /// 替换事件观察者（默认输出到 tracing）
    pub fn with_observer(mut self, observer: Arc<dyn LookupObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_query_mode(mut self, query_mode: QueryMode) -> Self {
        self.query_mode = query_mode;
        self
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn query_mode(&self) -> QueryMode {
        self.query_mode
    }

    /// 解析 topic 对应的 producer
    ///
    /// # 返回
    /// * `Ok(ResolutionResult)` - 去重后的 producer 及其 channel 列表（所有节点都 404 时为空）
    /// * `Err(LookupError::EmptyTopic)` - topic 为空
    /// * `Err(LookupError::Status | LookupError::Transport)` - 某个节点查询失败
    pub async fn resolve(&self, topic: &str) -> Result<ResolutionResult> {
        if topic.is_empty() {
            return Err(LookupError::EmptyTopic);
        }

        match self.query_mode {
            QueryMode::Sequential => self.resolve_sequential(topic).await,
            QueryMode::Concurrent => self.resolve_concurrent(topic).await,
        }
    }

    async fn resolve_sequential(&self, topic: &str) -> Result<ResolutionResult> {
        let mut result = ResolutionResult::new();
        for endpoint in &self.endpoints {
            let (url, reply) = self.query(endpoint, topic).await?;
            self.merge(&mut result, topic, endpoint, &url, reply);
        }
        Ok(result)
    }

    /// 同时查询所有节点；任一失败即返回错误，其余请求随之取消。
    /// 合并按地址列表顺序进行，去重优先级与顺序查询一致
    async fn resolve_concurrent(&self, topic: &str) -> Result<ResolutionResult> {
        let queries = self.endpoints.iter().map(|endpoint| async move {
            let (url, reply) = self.query(endpoint, topic).await?;
            Ok::<_, LookupError>((endpoint, url, reply))
        });
        let replies = try_join_all(queries).await?;

        let mut result = ResolutionResult::new();
        for (endpoint, url, reply) in replies {
            self.merge(&mut result, topic, endpoint, &url, reply);
        }
        Ok(result)
    }

    async fn query(&self, endpoint: &Endpoint, topic: &str) -> Result<(Url, Reply)> {
        let url = endpoint.lookup_url(topic)?;

        let reply = match self.backend.get(&url).await {
            Ok(reply) => reply,
            Err(source) => {
                self.emit(
                    topic,
                    endpoint,
                    &url,
                    LookupOutcome::Failed {
                        status: None,
                        detail: source.to_string(),
                        body: String::new(),
                    },
                );
                return Err(LookupError::Transport {
                    endpoint: endpoint.clone(),
                    source,
                });
            }
        };

        match reply.status {
            200 => match LookupResponse::parse(&reply.body) {
                Ok(response) => Ok((url, Reply::Found(response))),
                Err(e) => {
                    self.emit(
                        topic,
                        endpoint,
                        &url,
                        LookupOutcome::Malformed {
                            detail: e.to_string(),
                        },
                    );
                    Ok((url, Reply::Empty))
                }
            },
            404 => {
                self.emit(topic, endpoint, &url, LookupOutcome::NotFound);
                Ok((url, Reply::Empty))
            }
            status => {
                self.emit(
                    topic,
                    endpoint,
                    &url,
                    LookupOutcome::Failed {
                        status: Some(status),
                        detail: format!("unexpected status {}", status),
                        body: reply.body.clone(),
                    },
                );
                Err(LookupError::Status {
                    endpoint: endpoint.clone(),
                    status,
                    body: reply.body,
                })
            }
        }
    }

    fn merge(
        &self,
        result: &mut ResolutionResult,
        topic: &str,
        endpoint: &Endpoint,
        url: &Url,
        reply: Reply,
    ) {
        let Reply::Found(LookupResponse {
            producers,
            channels,
            skipped,
            ..
        }) = reply
        else {
            return;
        };

        let total = producers.len();
        let mut added = 0;
        for producer in producers {
            if result.insert(producer, &channels) {
                added += 1;
            }
        }

        self.emit(
            topic,
            endpoint,
            url,
            LookupOutcome::Found {
                producers: total,
                added,
                skipped,
            },
        );
    }

    fn emit(&self, topic: &str, endpoint: &Endpoint, url: &Url, outcome: LookupOutcome) {
        self.observer
            .on_event(&LookupEvent::new(topic, endpoint, url.as_str(), outcome));
    }
}

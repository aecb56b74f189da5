//! resolver 行为测试
//!
//! 使用内存中的后端模拟多个 lookup 节点，统计调用次数与顺序。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nsq_lookup::{
    BackendError, Endpoint, LookupBackend, LookupConfig, LookupError, LookupEvent, LookupOutcome,
    LookupObserver, LookupReply, LookupResolver, ProducerKey, ProducerRecord, QueryMode,
};
use reqwest::Url;
use serde_json::json;

/// 按 `host:port` 返回预设响应的后端
#[derive(Default)]
struct MockBackend {
    replies: HashMap<String, std::result::Result<LookupReply, String>>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockBackend {
    fn reply(mut self, endpoint: &str, status: u16, body: serde_json::Value) -> Self {
        self.replies
            .insert(endpoint.to_string(), Ok(LookupReply::new(status, body.to_string())));
        self
    }

    fn raw(mut self, endpoint: &str, status: u16, body: &str) -> Self {
        self.replies
            .insert(endpoint.to_string(), Ok(LookupReply::new(status, body)));
        self
    }

    fn fail(mut self, endpoint: &str, error: &str) -> Self {
        self.replies.insert(endpoint.to_string(), Err(error.to_string()));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupBackend for MockBackend {
    async fn get(&self, url: &Url) -> Result<LookupReply, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        let key = format!(
            "{}:{}",
            url.host_str().unwrap_or_default(),
            url.port().unwrap_or(80)
        );
        match self.replies.get(&key) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(e)) => Err(e.clone().into()),
            None => Ok(LookupReply::new(404, "")),
        }
    }
}

fn producer(address: &str, tcp_port: u16) -> serde_json::Value {
    json!({
        "broadcast_address": address,
        "tcp_port": tcp_port,
        "http_port": tcp_port + 1,
        "hostname": address,
        "version": "1.2.1"
    })
}

fn current_body(producers: Vec<serde_json::Value>, channels: &[&str]) -> serde_json::Value {
    json!({ "producers": producers, "channels": channels })
}

fn legacy_body(producers: Vec<serde_json::Value>, channels: &[&str]) -> serde_json::Value {
    json!({
        "status_code": 200,
        "status_txt": "OK",
        "data": { "producers": producers, "channels": channels }
    })
}

fn endpoints(list: &[&str]) -> Vec<Endpoint> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

fn resolver(list: &[&str], backend: Arc<MockBackend>) -> LookupResolver {
    LookupResolver::with_backend(endpoints(list), backend)
}

/// 收集事件的观察者
fn recorder() -> (Arc<Mutex<Vec<LookupEvent>>>, Arc<dyn LookupObserver>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let observer: Arc<dyn LookupObserver> = Arc::new(move |event: &LookupEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    (events, observer)
}

#[tokio::test]
async fn test_merge_keeps_first_seen_order_and_channels() {
    let backend = Arc::new(
        MockBackend::default()
            .reply(
                "lookup-a:4161",
                200,
                current_body(vec![producer("10.0.0.1", 4150), producer("10.0.0.2", 4150)], &["a-ch"]),
            )
            .reply(
                "lookup-b:4161",
                200,
                current_body(vec![producer("10.0.0.2", 4150), producer("10.0.0.3", 4150)], &["b-ch"]),
            ),
    );

    let result = resolver(&["lookup-a:4161", "lookup-b:4161"], backend.clone())
        .resolve("orders")
        .await
        .unwrap();

    let addresses = result.tcp_addresses();
    assert_eq!(addresses, vec!["10.0.0.1:4150", "10.0.0.2:4150", "10.0.0.3:4150"]);

    let p2 = ProducerKey::new("10.0.0.2", 4150);
    assert_eq!(result.channels(&p2).unwrap(), ["a-ch".to_string()]);
    let p3 = ProducerKey::new("10.0.0.3", 4150);
    assert_eq!(result.channels(&p3).unwrap(), ["b-ch".to_string()]);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_no_duplicate_keys_within_single_response() {
    let backend = Arc::new(MockBackend::default().reply(
        "lookup-a:4161",
        200,
        current_body(
            vec![
                producer("10.0.0.1", 4150),
                producer("10.0.0.1", 4150),
                producer("10.0.0.1", 4152),
            ],
            &[],
        ),
    ));

    let result = resolver(&["lookup-a:4161"], backend).resolve("orders").await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.tcp_addresses(), vec!["10.0.0.1:4150", "10.0.0.1:4152"]);
    let first = &result.producers()[0];
    assert_eq!(result.channels_for(first).unwrap(), &[] as &[String]);
}

#[tokio::test]
async fn test_all_not_found_yields_empty_result() {
    let backend = Arc::new(
        MockBackend::default()
            .raw("lookup-a:4161", 404, r#"{"message":"TOPIC_NOT_FOUND"}"#)
            .raw("lookup-b:4161", 404, r#"{"message":"TOPIC_NOT_FOUND"}"#),
    );

    let result = resolver(&["lookup-a:4161", "lookup-b:4161"], backend.clone())
        .resolve("missing")
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_bad_status_aborts_remaining_endpoints() {
    let backend = Arc::new(
        MockBackend::default()
            .reply("lookup-a:4161", 200, current_body(vec![producer("10.0.0.1", 4150)], &[]))
            .raw("lookup-b:4161", 500, "internal error")
            .reply("lookup-c:4161", 200, current_body(vec![producer("10.0.0.9", 4150)], &[])),
    );
    let (events, observer) = recorder();

    let err = resolver(&["lookup-a:4161", "lookup-b:4161", "lookup-c:4161"], backend.clone())
        .with_observer(observer)
        .resolve("orders")
        .await
        .unwrap_err();

    assert_eq!(backend.calls(), 2);
    assert!(err.is_lookup_failure());
    assert!(err.is_retryable());
    match &err {
        LookupError::Status {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, &Endpoint::new("lookup-b", 4161));
            assert_eq!(*status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let events = events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.endpoint, Endpoint::new("lookup-b", 4161));
    assert_eq!(
        last.outcome,
        LookupOutcome::Failed {
            status: Some(500),
            detail: "unexpected status 500".to_string(),
            body: "internal error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_transport_error_aborts_resolve() {
    let backend = Arc::new(
        MockBackend::default()
            .fail("lookup-a:4161", "connection refused")
            .reply("lookup-b:4161", 200, current_body(vec![producer("10.0.0.1", 4150)], &[])),
    );

    let err = resolver(&["lookup-a:4161", "lookup-b:4161"], backend.clone())
        .resolve("orders")
        .await
        .unwrap_err();

    assert_eq!(backend.calls(), 1);
    assert!(matches!(err, LookupError::Transport { .. }));
    assert_eq!(err.endpoint(), Some(&Endpoint::new("lookup-a", 4161)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_not_found_then_success() {
    let backend = Arc::new(
        MockBackend::default()
            .raw("lookup-a:4161", 404, "")
            .reply("lookup-b:4161", 200, current_body(vec![producer("10.0.0.5", 4150)], &["c1"])),
    );
    let (events, observer) = recorder();

    let result = resolver(&["lookup-a:4161", "lookup-b:4161"], backend)
        .with_observer(observer)
        .resolve("orders")
        .await
        .unwrap();

    assert_eq!(result.tcp_addresses(), vec!["10.0.0.5:4150"]);

    let outcomes: Vec<_> = events.lock().unwrap().iter().map(|e| e.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![
            LookupOutcome::NotFound,
            LookupOutcome::Found {
                producers: 1,
                added: 1,
                skipped: 0
            },
        ]
    );
}

#[tokio::test]
async fn test_legacy_and_current_shapes_parse_identically() {
    let producers = vec![producer("10.0.0.1", 4150), producer("10.0.0.2", 4250)];
    let legacy = Arc::new(MockBackend::default().reply(
        "lookup-a:4161",
        200,
        legacy_body(producers.clone(), &["ch"]),
    ));
    let current = Arc::new(MockBackend::default().reply(
        "lookup-a:4161",
        200,
        current_body(producers, &["ch"]),
    ));

    let from_legacy = resolver(&["lookup-a:4161"], legacy).resolve("t").await.unwrap();
    let from_current = resolver(&["lookup-a:4161"], current).resolve("t").await.unwrap();

    assert_eq!(from_legacy, from_current);
    assert_eq!(from_legacy.len(), 2);
    assert_eq!(
        from_legacy.producers()[1],
        ProducerRecord::new("10.0.0.2", 4250, 4251)
            .with_hostname("10.0.0.2")
            .with_version("1.2.1")
    );
}

#[tokio::test]
async fn test_malformed_body_counts_as_no_producers() {
    let backend = Arc::new(
        MockBackend::default()
            .raw("lookup-a:4161", 200, "<html>not json</html>")
            .reply("lookup-b:4161", 200, current_body(vec![producer("10.0.0.1", 4150)], &[])),
    );
    let (events, observer) = recorder();

    let result = resolver(&["lookup-a:4161", "lookup-b:4161"], backend.clone())
        .with_observer(observer)
        .resolve("orders")
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(backend.calls(), 2);
    assert!(matches!(
        events.lock().unwrap()[0].outcome,
        LookupOutcome::Malformed { .. }
    ));
}

#[tokio::test]
async fn test_incomplete_producer_records_are_skipped() {
    let body = json!({
        "producers": [
            { "broadcast_address": "10.0.0.1", "http_port": 4151 },
            { "broadcast_address": "10.0.0.2", "tcp_port": "not-a-port", "http_port": 4151 },
            { "broadcast_address": "10.0.0.3", "tcp_port": 4150, "http_port": 4151 }
        ]
    });
    let backend = Arc::new(MockBackend::default().reply("lookup-a:4161", 200, body));
    let (events, observer) = recorder();

    let result = resolver(&["lookup-a:4161"], backend)
        .with_observer(observer)
        .resolve("orders")
        .await
        .unwrap();

    assert_eq!(result.tcp_addresses(), vec!["10.0.0.3:4150"]);
    assert_eq!(
        events.lock().unwrap()[0].outcome,
        LookupOutcome::Found {
            producers: 1,
            added: 1,
            skipped: 2
        }
    );
}

#[tokio::test]
async fn test_response_without_producers_is_empty() {
    let backend = Arc::new(
        MockBackend::default().reply("lookup-a:4161", 200, json!({ "channels": ["x"] })),
    );

    let result = resolver(&["lookup-a:4161"], backend).resolve("orders").await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_empty_topic_is_rejected_without_io() {
    let backend = Arc::new(MockBackend::default());

    let err = resolver(&["lookup-a:4161"], backend.clone())
        .resolve("")
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::EmptyTopic));
    assert!(!err.is_lookup_failure());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_topic_is_url_encoded() {
    let backend = Arc::new(MockBackend::default());

    resolver(&["lookup-a:4161"], backend.clone())
        .resolve("a topic&b=c")
        .await
        .unwrap();

    assert_eq!(
        backend.urls(),
        vec!["http://lookup-a:4161/lookup?topic=a+topic%26b%3Dc".to_string()]
    );
}

#[tokio::test]
async fn test_empty_endpoint_list_defaults_to_localhost() {
    let backend = Arc::new(MockBackend::default());
    let resolver = LookupResolver::with_backend(Vec::new(), backend.clone());

    assert_eq!(resolver.endpoints(), &[Endpoint::new("localhost", 4161)]);

    resolver.resolve("orders").await.unwrap();
    assert_eq!(
        backend.urls(),
        vec!["http://localhost:4161/lookup?topic=orders".to_string()]
    );
}

#[test]
fn test_config_without_hosts_yields_single_default_endpoint() {
    let resolver = LookupResolver::new(&LookupConfig::default()).unwrap();
    assert_eq!(resolver.endpoints(), &[Endpoint::new("localhost", 4161)]);
    assert_eq!(resolver.query_mode(), QueryMode::Sequential);
}

#[tokio::test]
async fn test_consecutive_resolves_are_equal() {
    let backend = Arc::new(
        MockBackend::default()
            .reply(
                "lookup-a:4161",
                200,
                current_body(vec![producer("10.0.0.1", 4150)], &["c1", "c2"]),
            )
            .reply(
                "lookup-b:4161",
                200,
                legacy_body(vec![producer("10.0.0.2", 4150)], &["c3"]),
            ),
    );
    let resolver = resolver(&["lookup-a:4161", "lookup-b:4161"], backend.clone());

    let first = resolver.resolve("topic-x").await.unwrap();
    let second = resolver.resolve("topic-x").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.calls(), 4);
}

#[tokio::test]
async fn test_concurrent_mode_keeps_list_order_precedence() {
    let backend = Arc::new(
        MockBackend::default()
            .reply(
                "lookup-a:4161",
                200,
                current_body(vec![producer("10.0.0.1", 4150), producer("10.0.0.2", 4150)], &["a"]),
            )
            .raw("lookup-b:4161", 404, "")
            .reply(
                "lookup-c:4161",
                200,
                legacy_body(vec![producer("10.0.0.2", 4150), producer("10.0.0.3", 4150)], &["c"]),
            ),
    );
    let list = ["lookup-a:4161", "lookup-b:4161", "lookup-c:4161"];

    let sequential = resolver(&list, backend.clone()).resolve("orders").await.unwrap();
    let concurrent = resolver(&list, backend.clone())
        .with_query_mode(QueryMode::Concurrent)
        .resolve("orders")
        .await
        .unwrap();

    assert_eq!(sequential, concurrent);
    assert_eq!(
        concurrent.channels(&ProducerKey::new("10.0.0.2", 4150)).unwrap(),
        ["a".to_string()]
    );
}

#[tokio::test]
async fn test_concurrent_mode_fails_on_any_error() {
    let backend = Arc::new(
        MockBackend::default()
            .reply("lookup-a:4161", 200, current_body(vec![producer("10.0.0.1", 4150)], &[]))
            .raw("lookup-b:4161", 503, "unavailable"),
    );

    let err = resolver(&["lookup-a:4161", "lookup-b:4161"], backend)
        .with_query_mode(QueryMode::Concurrent)
        .resolve("orders")
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Status { status: 503, .. }));
}

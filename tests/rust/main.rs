use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use _sketch_search::core::errors::{CoreError, FailureCategory};
use _sketch_search::index::backend::{
    BackendFailure, BackendResult, ClusterInfo, SearchBackend, TransportCause,
};
use _sketch_search::{ClusterConfigPayload, OpenSearchDataStore, QueryFilter};
use async_trait::async_trait;
use rstest::rstest;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn cluster_info_payload() -> Value {
    json!({
        "name": "mock_opensearch_node",
        "cluster_name": "mock_cluster",
        "cluster_uuid": "mock_uuid",
        "version": {
            "number": "7.0.0",
            "build_flavor": "default",
            "build_type": "tar",
            "lucene_version": "8.0.0",
            "minimum_wire_compatibility_version": "6.8.0",
            "minimum_index_compatibility_version": "6.0.0-beta1"
        },
        "tagline": "The Open Source Search Engine"
    })
}

struct FakeCluster {
    info: BackendResult<ClusterInfo>,
    search_outcome: BackendResult<Value>,
    search_calls: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

impl FakeCluster {
    fn failing_with(failure: BackendFailure) -> Self {
        Self {
            info: Ok(serde_json::from_value(cluster_info_payload()).unwrap()),
            search_outcome: Err(failure),
            search_calls: AtomicUsize::new(0),
            last_body: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for FakeCluster {
    async fn info(&self) -> BackendResult<ClusterInfo> {
        self.info.clone()
    }

    async fn search(&self, _indices: &[String], body: &Value) -> BackendResult<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(body.clone());
        self.search_outcome.clone()
    }
}

fn read_timeout() -> BackendFailure {
    BackendFailure::ConnectionTimeout {
        url: "http://mockhost:1234".to_string(),
        message: "TIMEOUT".to_string(),
        cause: Some(TransportCause::ReadTimeout("Read timed out.".to_string())),
    }
}

fn structured_transport() -> BackendFailure {
    BackendFailure::Transport {
        status: Some(400),
        error: "search_phase_execution_exception".to_string(),
        info: json!({
            "error": {
                "root_cause": [
                    {"type": "query_shard_exception", "reason": "Failed to parse query"}
                ],
                "type": "search_phase_execution_exception",
                "reason": "all shards failed"
            },
            "status": 400
        }),
    }
}

fn unstructured_transport() -> BackendFailure {
    BackendFailure::Transport {
        status: Some(500),
        error: "generic_transport_error".to_string(),
        info: json!("A generic transport error occurred"),
    }
}

#[rstest]
#[case(read_timeout(), FailureCategory::ReadTimeout, "Read timed out.")]
#[case(
    structured_transport(),
    FailureCategory::StructuredTransport,
    "[query_shard_exception] Failed to parse query"
)]
#[case(
    unstructured_transport(),
    FailureCategory::UnstructuredTransport,
    "A generic transport error occurred"
)]
#[tokio::test]
async fn search_failures_are_normalized(
    #[case] failure: BackendFailure,
    #[case] category: FailureCategory,
    #[case] message: &str,
) {
    let cluster = Arc::new(FakeCluster::failing_with(failure));
    let datastore = OpenSearchDataStore::with_backend(cluster.clone())
        .await
        .unwrap();
    assert_eq!(datastore.server_version().raw, "7.0.0");

    let error = datastore
        .search(1, &["test_index".to_string()], "test_query", None)
        .await
        .unwrap_err();

    match &error {
        CoreError::QueryExecution(normalized) => {
            assert_eq!(normalized.category, category);
            assert_eq!(normalized.message, message);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(error.to_string(), message);
    assert_eq!(cluster.calls(), 1);
}

#[tokio::test]
async fn version_drives_query_body() {
    let cluster = Arc::new(FakeCluster::failing_with(unstructured_transport()));
    let datastore = OpenSearchDataStore::with_backend(cluster.clone())
        .await
        .unwrap();

    let filter = QueryFilter {
        size: 25,
        ..QueryFilter::default()
    };
    let _ = datastore
        .search(3, &["test_index".to_string()], "message:foo", Some(filter))
        .await;

    let body = cluster.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["track_total_hits"], json!(true));
    assert_eq!(body["size"], json!(25));
    assert_eq!(
        body["query"]["bool"]["must"][0]["query_string"]["query"],
        json!("message:foo")
    );
}

#[rstest]
#[case(Err(BackendFailure::Other("unreachable".to_string())))]
#[case(Ok(ClusterInfo::default()))]
#[tokio::test]
async fn bootstrap_failures_are_connection_errors(#[case] info: BackendResult<ClusterInfo>) {
    let cluster = Arc::new(FakeCluster {
        info,
        search_outcome: Ok(json!({})),
        search_calls: AtomicUsize::new(0),
        last_body: Mutex::new(None),
    });

    let result = OpenSearchDataStore::with_backend(cluster.clone()).await;
    assert!(matches!(result, Err(CoreError::Connection(_))));
    assert_eq!(cluster.calls(), 0);
}

#[tokio::test]
async fn concurrent_searches_share_one_handle() {
    let cluster = Arc::new(FakeCluster::failing_with(structured_transport()));
    let datastore = OpenSearchDataStore::with_backend(cluster.clone())
        .await
        .unwrap();
    let indices = vec!["test_index".to_string()];

    let (first, second) = tokio::join!(
        datastore.search(1, &indices, "a", None),
        datastore.search(2, &indices, "b", None)
    );

    assert_eq!(first.unwrap_err().to_string(), second.unwrap_err().to_string());
    assert_eq!(cluster.calls(), 2);
}

enum StubReply {
    Json(u16, Value),
    Text(u16, &'static str),
    Hang,
}

struct HttpStub {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn spawn_stub(replies: Vec<StubReply>) -> HttpStub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let queue = Arc::new(Mutex::new(VecDeque::from(replies)));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let accept_requests = requests.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let queue = queue.clone();
            let requests = accept_requests.clone();
            tokio::spawn(serve_connection(stream, queue, requests));
        }
    });

    HttpStub { addr, requests }
}

async fn serve_connection(
    mut stream: TcpStream,
    queue: Arc<Mutex<VecDeque<StubReply>>>,
    requests: Arc<Mutex<Vec<String>>>,
) {
    while let Some(request_line) = read_request(&mut stream).await {
        requests.lock().unwrap().push(request_line);
        let reply = queue.lock().unwrap().pop_front();

        let (status, content_type, body) = match reply {
            Some(StubReply::Json(status, value)) => (status, "application/json", value.to_string()),
            Some(StubReply::Text(status, text)) => (status, "text/plain", text.to_string()),
            Some(StubReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                return;
            }
            None => (404, "text/plain", "no reply queued".to_string()),
        };

        let response = format!(
            "HTTP/1.1 {} STUB\r\ncontent-type: {}\r\ncontent-length: {}\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        if stream.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    head.lines().next().map(str::to_string)
}

fn stub_config(stub: &HttpStub, timeout_ms: u64) -> ClusterConfigPayload {
    ClusterConfigPayload {
        timeout_ms,
        use_env_proxy: false,
        ..ClusterConfigPayload::new("127.0.0.1", stub.addr.port())
    }
}

#[tokio::test]
async fn http_backend_surfaces_first_root_cause() {
    let stub = spawn_stub(vec![
        StubReply::Json(200, cluster_info_payload()),
        StubReply::Json(
            400,
            json!({
                "error": {
                    "root_cause": [{"type": "query_shard_exception", "reason": "Failed to parse query"}],
                    "type": "search_phase_execution_exception",
                    "reason": "all shards failed"
                },
                "status": 400
            }),
        ),
    ])
    .await;

    let datastore = OpenSearchDataStore::connect(&stub_config(&stub, 2_000))
        .await
        .unwrap();
    assert_eq!(datastore.server_version().major, 7);

    let error = datastore
        .search(1, &["test_index".to_string()], "test_query", None)
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "[query_shard_exception] Failed to parse query");

    let requests = stub.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("GET / "));
    assert!(requests[1].starts_with("POST /test_index/_search "));
}

#[tokio::test]
async fn http_backend_surfaces_plain_text_errors() {
    let stub = spawn_stub(vec![
        StubReply::Json(200, cluster_info_payload()),
        StubReply::Text(500, "A generic transport error occurred"),
    ])
    .await;

    let datastore = OpenSearchDataStore::connect(&stub_config(&stub, 2_000))
        .await
        .unwrap();
    let error = datastore
        .search(1, &["test_index".to_string()], "test_query", None)
        .await
        .unwrap_err();

    match error {
        CoreError::QueryExecution(normalized) => {
            assert_eq!(normalized.category, FailureCategory::UnstructuredTransport);
            assert_eq!(normalized.message, "A generic transport error occurred");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn http_backend_reports_read_timeouts() {
    let stub = spawn_stub(vec![
        StubReply::Json(200, cluster_info_payload()),
        StubReply::Hang,
    ])
    .await;

    let datastore = OpenSearchDataStore::connect(&stub_config(&stub, 300))
        .await
        .unwrap();
    let error = datastore
        .search(1, &["test_index".to_string()], "test_query", None)
        .await
        .unwrap_err();

    match error {
        CoreError::QueryExecution(normalized) => {
            assert_eq!(normalized.category, FailureCategory::ReadTimeout);
            assert!(!normalized.message.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(stub.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn unreachable_cluster_fails_bootstrap() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ClusterConfigPayload {
        use_env_proxy: false,
        ..ClusterConfigPayload::new("127.0.0.1", port)
    };
    let result = OpenSearchDataStore::connect(&config).await;
    assert!(matches!(result, Err(CoreError::Connection(_))));
}

#[tokio::test]
async fn bootstrap_rejects_invalid_config_before_connecting() {
    let result = OpenSearchDataStore::connect(&ClusterConfigPayload::new("", 9200)).await;
    assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
}

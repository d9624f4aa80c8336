//! Shared utilities for integration testing.
//!
//! Two backends are provided:
//! - [`MockLedger`]: an in-memory ledger served by axum, speaking the wire
//!   protocol (snake_case bodies, `Chain-Request-Id` on every response)
//! - [`start_programmable_backend`]: a raw TCP server whose replies are
//!   scripted per request, for failures axum cannot produce (dropped
//!   connections, missing correlation header)

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ledger_client::config::RetryConfig;
use ledger_client::{Client, ClientConfig};

pub const LEDGER: &str = "test-ledger";
pub const CREDENTIAL: &str = "test-credential";

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub body: Value,
    pub idempotency_key: Option<String>,
    pub attempt: Option<String>,
    pub credential: Option<String>,
}

impl Captured {
    /// Last path segment, e.g. `list-accounts`.
    pub fn operation(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// In-memory ledger
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LedgerData {
    keys: Vec<Value>,
    accounts: Vec<Value>,
    flavors: Vec<Value>,
    transactions: Vec<Value>,
    actions: Vec<Value>,
    balances: BTreeMap<(String, String), u64>,
    cursors: HashMap<String, PendingCursor>,
    next_id: u64,
}

#[derive(Clone)]
struct PendingCursor {
    operation: String,
    params: Value,
    offset: usize,
    size: usize,
}

pub struct MockState {
    pub addr: SocketAddr,
    pub team: Option<String>,
    pub ttl_seconds: Option<u64>,
    pub hello_delay: Duration,
    pub hello_count: AtomicU32,
    /// Return an empty first page, with a cursor, for sum queries.
    pub empty_first_sum_page: AtomicBool,
    requests: Mutex<Vec<Captured>>,
    injected: Mutex<VecDeque<(u16, Value)>>,
    data: Mutex<LedgerData>,
    request_counter: AtomicU32,
}

impl MockState {
    /// Every ledger request received so far (handshakes excluded).
    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, operation: &str) -> Vec<Captured> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation() == operation)
            .collect()
    }

    /// Answer the next ledger request with `status` and `body` instead of
    /// handling it.
    pub fn inject(&self, status: u16, body: Value) {
        self.injected.lock().unwrap().push_back((status, body));
    }

    pub fn balance(&self, account: &str, flavor: &str) -> u64 {
        let data = self.data.lock().unwrap();
        data.balances
            .get(&(account.to_string(), flavor.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn ledger_prefix(&self) -> String {
        match &self.team {
            Some(team) => format!("/{}/{}/", team, LEDGER),
            None => format!("/{}/", LEDGER),
        }
    }

    fn next_request_id(&self) -> String {
        format!("mock-{}", self.request_counter.fetch_add(1, Ordering::SeqCst))
    }
}

/// Options for [`MockLedger::start_with`].
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    pub team: Option<String>,
    pub ttl_seconds: Option<u64>,
    pub hello_delay: Duration,
}

pub struct MockLedger {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockLedger {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            addr,
            team: options.team,
            ttl_seconds: options.ttl_seconds,
            hello_delay: options.hello_delay,
            hello_count: AtomicU32::new(0),
            empty_first_sum_page: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            injected: Mutex::new(VecDeque::new()),
            data: Mutex::new(LedgerData::default()),
            request_counter: AtomicU32::new(1),
        });

        let app = Router::new()
            .route("/hello", post(hello))
            .fallback(dispatch)
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this mock, with short retry delays.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(LEDGER)
            .with_credential(CREDENTIAL)
            .with_api_url(self.api_url());
        config.retries = fast_retries();
        config
    }

    pub fn client(&self) -> Client {
        Client::new(self.config()).unwrap()
    }
}

/// Retry settings that keep test runtimes short.
pub fn fast_retries() -> RetryConfig {
    RetryConfig {
        base_delay_ms: 5,
        max_delay_ms: 50,
        connectivity_timeout_ms: 1_000,
        retriable_timeout_ms: 2_000,
        non_retriable_codes: Vec::new(),
    }
}

fn reply(state: &MockState, status: u16, body: Option<Value>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = [("chain-request-id", state.next_request_id())];
    match body {
        Some(body) => (status, headers, Json(body)).into_response(),
        None => (status, headers).into_response(),
    }
}

fn api_error(code: &str, message: &str) -> Value {
    json!({ "seq_code": code, "message": message, "retriable": false })
}

async fn hello(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.hello_count.fetch_add(1, Ordering::SeqCst);
    if !state.hello_delay.is_zero() {
        tokio::time::sleep(state.hello_delay).await;
    }
    if body.get("ledger_name").and_then(Value::as_str) != Some(LEDGER) {
        return reply(&state, 404, Some(api_error("SEQ002", "Ledger not found")));
    }

    let mut hello = json!({ "addr": state.addr.to_string() });
    if let Some(ttl) = state.ttl_seconds {
        hello["addr_ttl_seconds"] = json!(ttl);
    }
    if let Some(team) = &state.team {
        hello["team_name"] = json!(team);
    }
    reply(&state, 200, Some(hello))
}

async fn dispatch(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Captured {
        path: path.clone(),
        body: body.clone(),
        idempotency_key: header(&headers, "idempotency-key"),
        attempt: header(&headers, "chain-request-attempt"),
        credential: header(&headers, "credential"),
    });

    if let Some((status, body)) = state.injected.lock().unwrap().pop_front() {
        return reply(&state, status, Some(body));
    }

    let Some(operation) = path.strip_prefix(&state.ledger_prefix()) else {
        return reply(&state, 404, Some(api_error("SEQ002", "Ledger not found")));
    };
    if header(&headers, "credential").as_deref() != Some(CREDENTIAL) {
        return reply(&state, 401, Some(api_error("SEQ000", "Unauthorized")));
    }

    let operation = operation.to_string();
    let mut data = state.data.lock().unwrap();
    let (status, body) = handle(&state, &mut data, &operation, body);
    drop(data);
    reply(&state, status, body)
}

type Handled = (u16, Option<Value>);

fn handle(state: &MockState, data: &mut LedgerData, operation: &str, body: Value) -> Handled {
    match operation {
        "create-key" => {
            let id = body_id(data, &body);
            let key = json!({ "id": id });
            data.keys.push(key.clone());
            (200, Some(key))
        }
        "create-account" | "create-flavor" => {
            let record = json!({
                "id": body_id(data, &body),
                "key_ids": body.get("key_ids").cloned().unwrap_or(json!([])),
                "quorum": body.get("quorum").cloned().unwrap_or(json!(1)),
                "tags": body.get("tags").cloned().unwrap_or(json!({})),
            });
            if operation == "create-account" {
                data.accounts.push(record.clone());
            } else {
                data.flavors.push(record.clone());
            }
            (200, Some(record))
        }
        "update-account-tags" | "update-flavor-tags" => {
            let records = if operation == "update-account-tags" {
                &mut data.accounts
            } else {
                &mut data.flavors
            };
            let id = body.get("id").cloned().unwrap_or(Value::Null);
            match records.iter_mut().find(|r| r["id"] == id) {
                Some(record) => {
                    record["tags"] = body.get("tags").cloned().unwrap_or(json!({}));
                    (204, None)
                }
                None => (404, Some(api_error("SEQ051", "Not found"))),
            }
        }
        "stats" => (
            200,
            Some(json!({
                "flavor_count": data.flavors.len(),
                "account_count": data.accounts.len(),
                "tx_count": data.transactions.len(),
            })),
        ),
        "reset" => {
            *data = LedgerData::default();
            (204, None)
        }
        "transact" => transact(data, &body),
        "build-transaction" => {
            let mut template = body;
            template["signatures"] = json!([]);
            (200, Some(template))
        }
        "sign-transaction" => {
            let mut template = body.get("transaction").cloned().unwrap_or(Value::Null);
            template["signatures"] = json!([CREDENTIAL]);
            (200, Some(template))
        }
        "submit-transaction" => {
            let template = body.get("transaction").cloned().unwrap_or(Value::Null);
            let signed = template
                .get("signatures")
                .and_then(Value::as_array)
                .map(|s| !s.is_empty())
                .unwrap_or(false);
            if !signed {
                return (400, Some(api_error("SEQ720", "Transaction is not signed")));
            }
            transact(data, &template)
        }
        "list-keys" | "list-accounts" | "list-flavors" | "list-transactions" | "list-actions"
        | "list-balances" => page(state, data, operation, body),
        _ => (404, Some(api_error("SEQ001", "Unknown endpoint"))),
    }
}

fn body_id(data: &mut LedgerData, body: &Value) -> String {
    match body.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            data.next_id += 1;
            format!("gen{}", data.next_id)
        }
    }
}

fn transact(data: &mut LedgerData, body: &Value) -> Handled {
    let actions = body
        .get("actions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut balances = data.balances.clone();
    let mut failures = Vec::new();
    for (index, action) in actions.iter().enumerate() {
        let flavor = action["flavor_id"].as_str().unwrap_or_default().to_string();
        let amount = action["amount"].as_u64().unwrap_or(0);
        if let Some(source) = action.get("source_account_id").and_then(Value::as_str) {
            let held = balances.entry((source.to_string(), flavor.clone())).or_insert(0);
            if *held < amount {
                failures.push(json!({
                    "seq_code": "SEQ760",
                    "message": "Insufficient funds",
                    "data": { "index": index },
                }));
                continue;
            }
            *held -= amount;
        }
        if let Some(dest) = action.get("destination_account_id").and_then(Value::as_str) {
            *balances.entry((dest.to_string(), flavor)).or_insert(0) += amount;
        }
    }

    if !failures.is_empty() {
        return (
            400,
            Some(json!({
                "seq_code": "SEQ706",
                "message": "One or more actions had an error",
                "retriable": false,
                "data": { "actions": failures },
            })),
        );
    }

    data.balances = balances;
    let sequence_number = data.transactions.len() + 1;
    let tx_id = format!("tx{}", sequence_number);
    let recorded: Vec<Value> = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            json!({
                "id": format!("{}-{}", tx_id, i),
                "type": action["type"],
                "transaction_id": tx_id,
                "flavor_id": action["flavor_id"],
                "amount": action["amount"],
                "source_account_id": action.get("source_account_id"),
                "destination_account_id": action.get("destination_account_id"),
                "tags": action.get("action_tags").cloned().unwrap_or(json!({})),
            })
        })
        .collect();
    data.actions.extend(recorded.iter().cloned());

    let tx = json!({
        "id": tx_id,
        "timestamp": "2026-01-01T00:00:00Z",
        "sequence_number": sequence_number,
        "actions": recorded,
        "tags": body.get("transaction_tags").cloned().unwrap_or(json!({})),
    });
    data.transactions.push(tx.clone());
    (200, Some(tx))
}

fn page(state: &MockState, data: &mut LedgerData, operation: &str, body: Value) -> Handled {
    let cursor = match body.get("cursor").and_then(Value::as_str) {
        Some(token) => match data.cursors.remove(token) {
            Some(cursor) if cursor.operation == operation => cursor,
            _ => return (400, Some(api_error("SEQ005", "Invalid cursor"))),
        },
        None => PendingCursor {
            operation: operation.to_string(),
            size: body.get("page_size").and_then(Value::as_u64).unwrap_or(100) as usize,
            params: body,
            offset: 0,
        },
    };

    let all = collection(data, operation, &cursor.params);

    let pad = operation == "list-balances"
        && cursor.offset == 0
        && cursor.params.get("padded").is_none()
        && state.empty_first_sum_page.load(Ordering::SeqCst);
    let (items, next_offset) = if pad {
        (Vec::new(), 0)
    } else {
        let end = (cursor.offset + cursor.size).min(all.len());
        (all[cursor.offset..end].to_vec(), end)
    };
    let last_page = !pad && next_offset >= all.len();

    let mut response = json!({ "items": items, "last_page": last_page });
    if !last_page {
        data.next_id += 1;
        let token = format!("cur{}", data.next_id);
        let mut params = cursor.params.clone();
        if pad {
            params["padded"] = json!(true);
        }
        data.cursors.insert(
            token.clone(),
            PendingCursor {
                offset: next_offset,
                params,
                ..cursor
            },
        );
        response["cursor"] = json!(token);
    }
    (200, Some(response))
}

fn collection(data: &LedgerData, operation: &str, params: &Value) -> Vec<Value> {
    let records: Vec<Value> = match operation {
        "list-keys" => {
            let ids: Vec<&str> = params
                .get("ids")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            data.keys
                .iter()
                .filter(|k| ids.is_empty() || ids.contains(&k["id"].as_str().unwrap_or_default()))
                .cloned()
                .collect()
        }
        "list-accounts" => data.accounts.clone(),
        "list-flavors" => data.flavors.clone(),
        "list-transactions" => data.transactions.iter().rev().cloned().collect(),
        "list-actions" => data.actions.clone(),
        "list-balances" => return sum_balances(data, params),
        _ => Vec::new(),
    };
    records.into_iter().filter(|r| matches_filter(r, params)).collect()
}

fn sum_balances(data: &LedgerData, params: &Value) -> Vec<Value> {
    let sum_by: Vec<String> = params
        .get("sum_by")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let mut groups: BTreeMap<String, (Map<String, Value>, u64)> = BTreeMap::new();
    for ((account, flavor), amount) in &data.balances {
        if *amount == 0 {
            continue;
        }
        let row = json!({ "account_id": account, "flavor_id": flavor });
        if !matches_filter(&row, params) {
            continue;
        }
        let mut group = Map::new();
        for field in &sum_by {
            group.insert(field.clone(), row.get(field).cloned().unwrap_or(Value::Null));
        }
        let key = Value::Object(group.clone()).to_string();
        groups.entry(key).or_insert((group, 0)).1 += amount;
    }

    groups
        .into_values()
        .map(|(group, amount)| json!({ "amount": amount, "sum_by": group }))
        .collect()
}

/// Supports a single `<field>=$1` clause, where field is a top-level key or
/// `tags.<key>`.
fn matches_filter(record: &Value, params: &Value) -> bool {
    let Some(filter) = params.get("filter").and_then(Value::as_str) else {
        return true;
    };
    let Some((field, _)) = filter.split_once("=$1") else {
        return true;
    };
    let expected = params
        .get("filter_params")
        .and_then(|p| p.get(0))
        .cloned()
        .unwrap_or(Value::Null);
    let actual = match field.trim().strip_prefix("tags.") {
        Some(tag) => record.get("tags").and_then(|t| t.get(tag)),
        None => record.get(field.trim()),
    };
    actual == Some(&expected)
}

// ---------------------------------------------------------------------------
// Programmable raw backend
// ---------------------------------------------------------------------------

/// A parsed request received by the programmable backend.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// How the programmable backend answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond; `request_id: None` omits the `Chain-Request-Id` header.
    Respond {
        status: u16,
        request_id: Option<String>,
        body: String,
    },
    /// Close the connection without writing a response.
    Drop,
    /// Keep the connection open without ever answering.
    Hang,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Respond {
            status: 200,
            request_id: Some("raw-1".to_string()),
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Reply::Respond {
            status,
            request_id: Some("raw-1".to_string()),
            body: body.to_string(),
        }
    }
}

/// Handshake body pointing the client back at `addr` with no team.
pub fn hello_body(addr: SocketAddr) -> Value {
    json!({ "addr": addr.to_string(), "addr_ttl_seconds": 300 })
}

/// Start a programmable backend. `/hello` is answered automatically; every
/// other request is passed to `f`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RawRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let reply = if request.path == "/hello" {
                            Reply::ok(hello_body(addr))
                        } else {
                            f(request).await
                        };
                        write_reply(&mut socket, reply).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<RawRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RawRequest {
        path,
        headers,
        body,
    })
}

async fn write_reply(socket: &mut TcpStream, reply: Reply) {
    match reply {
        Reply::Drop => {
            let _ = socket.shutdown().await;
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        Reply::Respond {
            status,
            request_id,
            body,
        } => {
            let status_text = match status {
                200 => "200 OK",
                204 => "204 No Content",
                400 => "400 Bad Request",
                404 => "404 Not Found",
                429 => "429 Too Many Requests",
                500 => "500 Internal Server Error",
                503 => "503 Service Unavailable",
                _ => "200 OK",
            };
            let id_header = request_id
                .map(|id| format!("Chain-Request-Id: {}\r\n", id))
                .unwrap_or_default();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_text,
                id_header,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    }
}

/// Client configuration for a programmable backend at `addr`.
pub fn raw_config(addr: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::new(LEDGER)
        .with_credential(CREDENTIAL)
        .with_api_url(format!("http://{}", addr));
    config.retries = fast_retries();
    config
}

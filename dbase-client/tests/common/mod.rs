//! Test transports for Base integration tests
//!
//! `FakeBase` emulates the Base HTTP API in memory and records every call.
//! `ScriptedTransport` replays canned responses in order.

#![allow(dead_code)]

use async_trait::async_trait;
use dbase_client::{ClientConfig, ClientError, Deta, Method, Request, Response, Result, Transport};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PROJECT_KEY: &str = "testproj_secret";
pub const BASE_NAME: &str = "tests";
pub const ROOT: &str = "http://fake.local/v1/testproj/tests";
pub const NO_KEYS: &[&str] = &[];

/// Build a client over the given transport
pub fn deta(transport: Arc<dyn Transport>, config: ClientConfig) -> Deta {
    let config = config.with_database_host("http://fake.local");
    Deta::with_transport(PROJECT_KEY, config, transport).unwrap()
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object literal")
}

/// In-memory Base speaking the HTTP API shapes
#[derive(Default)]
pub struct FakeBase {
    items: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<Request>>,
    page_size: Mutex<Option<usize>>,
    failing_keys: Mutex<HashSet<String>>,
    latency: Mutex<Option<Duration>>,
    delay_per_item: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeBase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed items directly, bypassing the API
    pub fn with_items(self: Arc<Self>, items: impl IntoIterator<Item = Value>) -> Arc<Self> {
        {
            let mut stored = self.items.lock().unwrap();
            for item in items {
                let key = item["key"].as_str().expect("seeded items need a key").to_string();
                stored.insert(key, item);
            }
        }
        self
    }

    /// Split query responses into pages of this size
    pub fn with_page_size(self: Arc<Self>, size: usize) -> Arc<Self> {
        *self.page_size.lock().unwrap() = Some(size);
        self
    }

    /// Requests touching this key fail at the transport level
    pub fn fail_key(self: Arc<Self>, key: &str) -> Arc<Self> {
        self.failing_keys.lock().unwrap().insert(key.to_string());
        self
    }

    /// Delay every response
    pub fn with_latency(self: Arc<Self>, latency: Duration) -> Arc<Self> {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    /// Delay write requests in proportion to their item count
    pub fn with_delay_per_item(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.delay_per_item.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with(&self, method: Method) -> Vec<Request> {
        self.calls()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.items.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    fn delay_for(&self, request: &Request) -> Option<Duration> {
        if let Some(per_item) = *self.delay_per_item.lock().unwrap() {
            if request.method == Method::Put {
                let count = request.body.as_ref().and_then(|b| b["items"].as_array()).map_or(0, Vec::len);
                return Some(per_item * count as u32);
            }
        }
        *self.latency.lock().unwrap()
    }

    fn handle(&self, request: &Request) -> Result<Response> {
        let path = request
            .url
            .strip_prefix(ROOT)
            .ok_or_else(|| ClientError::ConnectionError(format!("unknown host: {}", request.url)))?;

        match (request.method, path) {
            (Method::Put, "/items") => Ok(self.put_items(request.body.as_ref())),
            (Method::Post, "/items") => Ok(self.insert_item(request.body.as_ref())),
            (Method::Post, "/query") => Ok(self.query(request.body.as_ref())),
            (method, path) => {
                let encoded = path
                    .strip_prefix("/items/")
                    .ok_or_else(|| ClientError::ConnectionError(format!("no route: {}", path)))?;
                let key = urlencoding::decode(encoded)
                    .map_err(|e| ClientError::Transport(e.to_string()))?
                    .into_owned();

                if self.failing_keys.lock().unwrap().contains(&key) {
                    return Err(ClientError::ConnectionError(format!("connection reset for {}", key)));
                }

                match method {
                    Method::Get => Ok(self.get_item(&key)),
                    Method::Delete => {
                        self.items.lock().unwrap().remove(&key);
                        Ok(Response::json_body(200, &json!({ "key": key })))
                    }
                    Method::Patch => Ok(self.update_item(&key, request.body.as_ref())),
                    _ => Err(ClientError::ConnectionError(format!("no route: {} {}", method, path))),
                }
            }
        }
    }

    fn put_items(&self, body: Option<&Value>) -> Response {
        let items = body.and_then(|b| b["items"].as_array()).cloned().unwrap_or_default();
        if items.len() > 25 {
            return Response::json_body(400, &json!({ "errors": ["too many items"] }));
        }

        let mut processed = Vec::new();
        let mut failed = Vec::new();
        let mut stored = self.items.lock().unwrap();
        for mut item in items {
            if item.get("reject").and_then(Value::as_bool) == Some(true) {
                failed.push(item);
                continue;
            }
            let key = match item["key"].as_str() {
                Some(key) => key.to_string(),
                None => {
                    let key = format!("gen{}", self.next_id.fetch_add(1, Ordering::SeqCst));
                    item["key"] = json!(key);
                    key
                }
            };
            stored.insert(key, item.clone());
            processed.push(item);
        }

        let mut body = json!({ "processed": { "items": processed } });
        if failed.is_empty() {
            Response::json_body(200, &body)
        } else {
            body["failed"] = json!({ "items": failed });
            Response::json_body(207, &body)
        }
    }

    fn insert_item(&self, body: Option<&Value>) -> Response {
        let item = body.map(|b| b["item"].clone()).unwrap_or(Value::Null);
        let key = item["key"].as_str().unwrap_or_default().to_string();

        let mut stored = self.items.lock().unwrap();
        if stored.contains_key(&key) {
            return Response::json_body(409, &json!({ "errors": ["Key already exists"] }));
        }
        stored.insert(key, item.clone());
        Response::json_body(201, &item)
    }

    fn get_item(&self, key: &str) -> Response {
        match self.items.lock().unwrap().get(key) {
            Some(item) => Response::json_body(200, item),
            None => Response::json_body(404, &json!({ "key": key })),
        }
    }

    fn update_item(&self, key: &str, body: Option<&Value>) -> Response {
        let mut stored = self.items.lock().unwrap();
        let Some(item) = stored.get_mut(key) else {
            return Response::json_body(404, &json!({ "errors": ["Key not found"] }));
        };

        let body = body.cloned().unwrap_or(Value::Null);
        if let Some(set) = body["set"].as_object() {
            for (field, value) in set {
                item[field] = value.clone();
            }
        }
        if let Some(increment) = body["increment"].as_object() {
            for (field, amount) in increment {
                let current = item[field].as_i64().unwrap_or(0);
                item[field] = json!(current + amount.as_i64().unwrap_or(0));
            }
        }
        if let Some(fields) = body["delete"].as_array() {
            if let Some(map) = item.as_object_mut() {
                for field in fields.iter().filter_map(Value::as_str) {
                    map.remove(field);
                }
            }
        }

        let mut response = body;
        response["key"] = json!(key);
        Response::json_body(200, &response)
    }

    /// Equality clauses only; `?op` clauses are ignored
    fn query(&self, body: Option<&Value>) -> Response {
        let body = body.cloned().unwrap_or(Value::Null);
        let clauses: Vec<Map<String, Value>> = body["query"]
            .as_array()
            .map(|qs| qs.iter().filter_map(|q| q.as_object().cloned()).collect())
            .unwrap_or_default();
        let last = body["last"].as_str().map(str::to_string);
        let limit = body["limit"]
            .as_u64()
            .map(|l| l as usize)
            .or(*self.page_size.lock().unwrap())
            .unwrap_or(usize::MAX);

        let stored = self.items.lock().unwrap();
        let matching: Vec<(&String, &Value)> = stored
            .iter()
            .filter(|(key, _)| last.as_ref().map_or(true, |last| key.as_str() > last.as_str()))
            .filter(|(_, item)| {
                clauses.is_empty()
                    || clauses.iter().any(|clause| {
                        clause
                            .iter()
                            .filter(|(field, _)| !field.contains('?'))
                            .all(|(field, value)| &item[field] == value)
                    })
            })
            .collect();

        let page: Vec<Value> = matching.iter().take(limit).map(|(_, item)| (*item).clone()).collect();
        let mut paging = json!({ "size": page.len() });
        if matching.len() > page.len() {
            if let Some((key, _)) = page.len().checked_sub(1).and_then(|i| matching.get(i)) {
                paging["last"] = json!(key);
            }
        }

        Response::json_body(200, &json!({ "items": page, "paging": paging }))
    }
}

#[async_trait]
impl Transport for FakeBase {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.calls.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay_for(&request) {
            tokio::time::sleep(delay).await;
        }
        let response = self.handle(&request);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        response
    }
}

/// Replays canned responses in order and records the requests
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Response>>,
    calls: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = (u16, Value)>) -> Arc<Self> {
        let responses = responses
            .into_iter()
            .map(|(status, body)| Response::json_body(status, &body))
            .collect();
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Queue a raw (possibly non-JSON) response body
    pub fn raw(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from([Response::new(status, body)])),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.calls.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::ConnectionError("script exhausted".to_string()))
    }
}

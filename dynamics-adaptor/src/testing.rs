//! Stub transports shared by unit tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::api::{HttpTransport, ODataRequest, RawResponse};
use crate::error::TransportError;

/// Records every request and answers with scripted replies (200 `null` once exhausted)
#[derive(Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<ODataRequest>>,
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, status: u16, body: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse { status, body }));
        self
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
        self
    }

    pub(crate) fn requests(&self) -> Vec<ODataRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: &ODataRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or(Ok(RawResponse {
            status: 200,
            body: Value::Null,
        }))
    }
}

/// In-memory entity service keyed by `collection(id)`
///
/// POST assigns sequential ids and answers 201, GET/PATCH/DELETE answer 200 for
/// known records and 404 otherwise. Deleted records are gone for later calls.
#[derive(Default)]
pub(crate) struct EntityStoreTransport {
    records: Mutex<BTreeMap<(String, String), Value>>,
    next_id: Mutex<u32>,
    requests: Mutex<Vec<ODataRequest>>,
}

impl EntityStoreTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, collection: &str, id: &str, record: Value) {
        self.records
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), record);
    }

    pub(crate) fn contains(&self, collection: &str, id: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .contains_key(&(collection.to_string(), id.to_string()))
    }

    pub(crate) fn requests(&self) -> Vec<ODataRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Split the last path segment of a URL into collection and optional id
    fn target(url: &str) -> (String, Option<String>) {
        let path = url.split('?').next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        match segment.split_once('(') {
            Some((collection, rest)) => (
                collection.to_string(),
                Some(rest.trim_end_matches(')').to_string()),
            ),
            None => (segment.to_string(), None),
        }
    }

    fn not_found() -> RawResponse {
        RawResponse {
            status: 404,
            body: json!({"error": {"message": "Does Not Exist"}}),
        }
    }
}

#[async_trait]
impl HttpTransport for EntityStoreTransport {
    async fn send(&self, request: &ODataRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let (collection, id) = Self::target(&request.url);
        let mut records = self.records.lock().unwrap();

        let response = match (request.method.as_str(), id) {
            ("POST", None) => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                let id = format!("id-{}", *next_id);
                let mut record = request.body.clone().unwrap_or_else(|| json!({}));
                if let Some(fields) = record.as_object_mut() {
                    fields.insert("id".to_string(), json!(id));
                }
                records.insert((collection, id), record.clone());
                RawResponse {
                    status: 201,
                    body: record,
                }
            }
            ("GET", None) => {
                let value: Vec<Value> = records
                    .iter()
                    .filter(|((c, _), _)| *c == collection)
                    .map(|(_, record)| record.clone())
                    .collect();
                RawResponse {
                    status: 200,
                    body: json!({ "value": value }),
                }
            }
            ("GET", Some(id)) => match records.get(&(collection, id)) {
                Some(record) => RawResponse {
                    status: 200,
                    body: record.clone(),
                },
                None => Self::not_found(),
            },
            ("PATCH", Some(id)) => match records.get_mut(&(collection, id)) {
                Some(record) => {
                    if let (Some(fields), Some(Value::Object(changes))) =
                        (record.as_object_mut(), request.body.clone())
                    {
                        fields.extend(changes);
                    }
                    RawResponse {
                        status: 200,
                        body: record.clone(),
                    }
                }
                None => Self::not_found(),
            },
            ("DELETE", Some(id)) => match records.remove(&(collection, id)) {
                Some(_) => RawResponse {
                    status: 200,
                    body: Value::Null,
                },
                None => Self::not_found(),
            },
            _ => RawResponse {
                status: 405,
                body: Value::Null,
            },
        };

        Ok(response)
    }
}

use crate::client::error::ApiError;
use crate::client::Transport;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct Call {
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

/// In-memory backend keyed by joined path. Unknown paths answer 404.
#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, Result<Value, ApiError>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, response: Result<Value, ApiError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.last_call(path).and_then(|c| c.body)
    }

    pub fn last_query(&self, path: &str) -> Option<Vec<(String, String)>> {
        self.last_call(path).map(|c| c.query)
    }

    fn last_call(&self, path: &str) -> Option<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.path == path)
            .cloned()
    }

    fn answer(&self, call: Call) -> Result<Value, ApiError> {
        let response = self.responses.lock().unwrap().get(&call.path).cloned();
        let path = call.path.clone();
        self.calls.lock().unwrap().push(call);
        response.unwrap_or_else(|| {
            Err(ApiError::Http {
                status: 404,
                message: format!("no fake response for {path}"),
            })
        })
    }
}

fn join(path: &[&str]) -> String {
    format!("/{}", path.join("/"))
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    fn base_url(&self) -> &str {
        "http://fake-backend"
    }

    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.answer(Call {
            path: join(path),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
        })
    }

    async fn post(&self, path: &[&str], body: &Value) -> Result<Value, ApiError> {
        self.answer(Call {
            path: join(path),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}

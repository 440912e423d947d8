//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::util::lock;
use crate::NetworkFailure;

struct Scripted {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<ApiResponse, NetworkFailure>,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: impl Into<String>) {
        self.push(None, Ok(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, failure: NetworkFailure) {
        self.push(None, Err(failure));
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub fn reply_gated(&self, status: u16, body: impl Into<String>) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.push(Some(gate), Ok(ApiResponse::new(status, body)));
        release
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    fn push(&self, gate: Option<oneshot::Receiver<()>>, result: Result<ApiResponse, NetworkFailure>) {
        lock(&self.replies).push_back(Scripted { gate, result });
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, NetworkFailure> {
        lock(&self.requests).push(request);
        let next = lock(&self.replies).pop_front();
        let Some(scripted) = next else {
            return Err(NetworkFailure::Transport("no scripted reply".to_string()));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }
}

/// JSON array of photo results with ids `p{first}..=p{last}`.
pub fn photo_page(first: u32, last: u32) -> String {
    let items: Vec<serde_json::Value> = (first..=last)
        .map(|index| photo_json(&format!("p{index}"), false))
        .collect();
    serde_json::Value::Array(items).to_string()
}

pub fn photo_json(id: &str, liked: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "width": 4000,
        "height": 3000,
        "created_at": "2024-03-05T10:15:00Z",
        "description": null,
        "urls": {
            "raw": format!("https://images.unsplash.com/{id}?raw"),
            "full": format!("https://images.unsplash.com/{id}?full"),
            "regular": format!("https://images.unsplash.com/{id}?regular"),
            "small": format!("https://images.unsplash.com/{id}?small"),
            "thumb": format!("https://images.unsplash.com/{id}?thumb")
        },
        "liked_by_user": liked
    })
}

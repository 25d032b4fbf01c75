//! Mock OpenAI-compatible provider shared by the integration tests.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers chat completions requests.
#[derive(Clone)]
pub enum Behavior {
    /// Analysis gets a fixed description; ranking gets `ranking` as the `results` array.
    Reply { ranking: Value },
    /// Every call fails with this status.
    Status(StatusCode),
    /// Every call hangs for this long before replying.
    Delay(Duration),
    /// The model content is not JSON.
    Garbage,
}

#[derive(Default)]
pub struct Recorded {
    pub bodies: Vec<Value>,
    pub authorization: Vec<Option<String>>,
}

struct MockState {
    behavior: Behavior,
    recorded: Mutex<Recorded>,
}

pub struct MockProvider {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockProvider {
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().bodies.clone()
    }

    pub fn authorization(&self) -> Vec<Option<String>> {
        self.state.recorded.lock().unwrap().authorization.clone()
    }
}

fn completion(content: String) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Analysis requests carry the image as a content array.
fn is_analysis(body: &Value) -> bool {
    body["messages"][0]["content"].is_array()
}

async fn handle_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.authorization.push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
        );
        recorded.bodies.push(body.clone());
    }

    match &state.behavior {
        Behavior::Status(status) => {
            (*status, Json(json!({"error": {"message": "mock failure"}}))).into_response()
        }
        Behavior::Delay(delay) => {
            tokio::time::sleep(*delay).await;
            Json(completion("{}".to_string())).into_response()
        }
        Behavior::Garbage => Json(completion("I cannot do that".to_string())).into_response(),
        Behavior::Reply { ranking } => {
            let content = if is_analysis(&body) {
                json!({
                    "description": "A settings dialog with a blue button",
                    "text_content": "Save changes",
                    "keywords": ["settings", "dialog"],
                    "summary": "Settings dialog"
                })
            } else {
                json!({
                    "message": "These look like what you want.",
                    "results": ranking
                })
            };
            Json(completion(content.to_string())).into_response()
        }
    }
}

/// Start a mock provider on an ephemeral port.
pub async fn start_mock_provider(behavior: Behavior) -> MockProvider {
    let state = Arc::new(MockState {
        behavior,
        recorded: Mutex::new(Recorded::default()),
    });
    let app = Router::new()
        .route("/v1/chat/completions", post(handle_completions))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockProvider { addr, state }
}

/// Write a small valid PNG.
pub fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) {
    std::fs::create_dir_all(dir).unwrap();
    image::RgbImage::new(width, height)
        .save_with_format(dir.join(name), image::ImageFormat::Png)
        .unwrap();
}

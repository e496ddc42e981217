//! Stand-in classifier and language-model servers for tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Mutex;

use actix_multipart::Multipart;
use actix_web::http::{header, StatusCode};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use futures_util::{StreamExt, TryStreamExt};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::model::ModelManager;

fn fixture(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, (y * 60) as u8, 128]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

pub fn png_fixture() -> Vec<u8> {
    fixture(ImageFormat::Png)
}

pub fn jpeg_fixture() -> Vec<u8> {
    fixture(ImageFormat::Jpeg)
}

pub fn test_models(predict_url: &str, llm_url: &str) -> ModelManager {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("PREDICT_URL", predict_url),
        ("LLM_BASE_URL", llm_url),
        ("LLM_API_KEY", "sk-test"),
    ]);
    let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test config");
    ModelManager::new(&config).expect("test model clients")
}

// ---------------------------------------------------------------------------
// Classifier

pub enum ClassifierReply {
    Json(String),
    Status(u16),
}

#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub fields: Vec<(String, String)>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub file: Vec<u8>,
}

impl Upload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct ClassifierState {
    reply: ClassifierReply,
    uploads: Mutex<Vec<Upload>>,
}

pub struct FakeClassifier {
    addr: SocketAddr,
    state: web::Data<ClassifierState>,
}

impl FakeClassifier {
    pub fn url(&self) -> String {
        format!("http://{}/predict", self.addr)
    }

    pub fn last_upload(&self) -> Option<Upload> {
        self.state.uploads.lock().unwrap().last().cloned()
    }
}

async fn fake_predict(state: web::Data<ClassifierState>, mut payload: Multipart) -> HttpResponse {
    let mut upload = Upload::default();
    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(Ok(chunk)) = field.next().await {
            data.extend_from_slice(&chunk);
        }

        if name == "file" {
            upload.file_name = file_name;
            upload.content_type = content_type;
            upload.file = data;
        } else {
            upload
                .fields
                .push((name, String::from_utf8_lossy(&data).into_owned()));
        }
    }
    state.uploads.lock().unwrap().push(upload);

    match &state.reply {
        ClassifierReply::Json(body) => HttpResponse::Ok()
            .content_type("application/json")
            .body(body.clone()),
        ClassifierReply::Status(code) => {
            HttpResponse::build(StatusCode::from_u16(*code).unwrap()).body("classifier failure")
        }
    }
}

pub async fn spawn_classifier(reply: ClassifierReply) -> FakeClassifier {
    let state = web::Data::new(ClassifierState {
        reply,
        uploads: Mutex::new(Vec::new()),
    });
    let shared = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(shared.clone())
            .route("/predict", web::post().to(fake_predict))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("bind fake classifier");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    FakeClassifier { addr, state }
}

// ---------------------------------------------------------------------------
// Language model

pub enum LlmReply {
    Content(String),
    /// Answer with the user prompt it was sent.
    EchoPrompt,
    Status(u16),
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct RecordedCompletion {
    pub authorization: Option<String>,
    pub body: Value,
}

struct LlmState {
    reply: LlmReply,
    requests: Mutex<Vec<RecordedCompletion>>,
}

pub struct FakeLlm {
    addr: SocketAddr,
    state: web::Data<LlmState>,
}

impl FakeLlm {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn last_request(&self) -> Option<RecordedCompletion> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

fn completion(content: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

async fn fake_completion(
    state: web::Data<LlmState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = body.into_inner();
    let prompt = body["messages"][1]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedCompletion { authorization, body });

    match &state.reply {
        LlmReply::Content(text) => completion(text),
        LlmReply::EchoPrompt => completion(&prompt),
        LlmReply::Status(code) => {
            HttpResponse::build(StatusCode::from_u16(*code).unwrap()).body("upstream refused")
        }
        LlmReply::Raw(raw) => HttpResponse::Ok()
            .content_type("application/json")
            .body(raw.clone()),
    }
}

pub async fn spawn_llm(reply: LlmReply) -> FakeLlm {
    let state = web::Data::new(LlmState {
        reply,
        requests: Mutex::new(Vec::new()),
    });
    let shared = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(shared.clone())
            .route("/v1/chat/completions", web::post().to(fake_completion))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("bind fake language model");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    FakeLlm { addr, state }
}

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Token that makes every endpoint answer 200 with an embedded error code.
pub const EXPIRED_TOKEN: &str = "expired_token";
/// Token that makes every endpoint answer 500 with a plain-text body.
pub const SERVER_ERROR_TOKEN: &str = "server_error";
/// Bytes served for every picture under `/pics/`.
pub const PICTURE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nmock-picture";

pub type Params = Vec<(String, String)>;

/// Shared counters, so tests can tell whether a picture was fetched.
#[derive(Clone, Default)]
pub struct MockState {
    pic_fetches: Arc<AtomicUsize>,
}

impl MockState {
    pub fn pic_fetches(&self) -> usize {
        self.pic_fetches.load(Ordering::SeqCst)
    }
}

pub fn app() -> Router {
    app_with_state(MockState::default())
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route("/2/statuses/update.json", post(update_status))
        .route("/2/statuses/upload.json", post(upload_status))
        .route("/2/messages/reply.json", post(reply_message))
        .route("/2/users/show.json", get(show_user))
        .route("/2/emotions.json", get(emotions))
        .route("/2/statuses/user_timeline.json", get(user_timeline))
        .route("/2/statuses/home_timeline.json", get(home_timeline))
        .route("/2/statuses/count.json", get(status_count))
        .route("/2/comments/create.json", post(create_comment))
        .route("/pics/{name}", get(picture))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, MockState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn to_object(params: &Params) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Token checks shared by every endpoint. `None` means the call may proceed.
fn reject(endpoint: &str, params: &Params) -> Option<Response> {
    match param(params, "access_token") {
        None | Some("") => Some(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "request": endpoint,
                    "error_code": 21301,
                    "error": "auth faild!",
                })),
            )
                .into_response(),
        ),
        Some(EXPIRED_TOKEN) => Some(
            Json(json!({
                "request": endpoint,
                "error_code": 21327,
                "error": "expired_token",
            }))
            .into_response(),
        ),
        Some(SERVER_ERROR_TOKEN) => {
            Some((StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response())
        }
        Some(_) => None,
    }
}

fn echo(endpoint: &str, params: &Params) -> Response {
    debug!(endpoint, ?params, "echoing request");
    reject(endpoint, params).unwrap_or_else(|| {
        Json(json!({
            "endpoint": endpoint,
            "params": to_object(params),
        }))
        .into_response()
    })
}

async fn update_status(Form(params): Form<Params>) -> Response {
    echo("/2/statuses/update.json", &params)
}

async fn reply_message(Form(params): Form<Params>) -> Response {
    echo("/2/messages/reply.json", &params)
}

async fn create_comment(Form(params): Form<Params>) -> Response {
    echo("/2/comments/create.json", &params)
}

async fn show_user(Query(params): Query<Params>) -> Response {
    echo("/2/users/show.json", &params)
}

async fn emotions(Query(params): Query<Params>) -> Response {
    echo("/2/emotions.json", &params)
}

async fn user_timeline(Query(params): Query<Params>) -> Response {
    echo("/2/statuses/user_timeline.json", &params)
}

async fn home_timeline(Query(params): Query<Params>) -> Response {
    echo("/2/statuses/home_timeline.json", &params)
}

async fn status_count(Query(params): Query<Params>) -> Response {
    let endpoint = "/2/statuses/count.json";
    if let Some(rejected) = reject(endpoint, &params) {
        return rejected;
    }
    let counts: Vec<Value> = param(&params, "ids")
        .unwrap_or_default()
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| json!({ "id": id, "comments": 0, "reposts": 0, "attitudes": 0 }))
        .collect();
    Json(counts).into_response()
}

async fn upload_status(mut multipart: Multipart) -> Response {
    let endpoint = "/2/statuses/upload.json";
    let mut params = Params::new();
    let mut pic: Option<(String, usize)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        };
        let name = field.name().unwrap_or_default().to_string();
        if name == "pic" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            match field.bytes().await {
                Ok(bytes) => pic = Some((file_name, bytes.len())),
                Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            }
        } else {
            match field.text().await {
                Ok(value) => params.push((name, value)),
                Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            }
        }
    }

    if let Some(rejected) = reject(endpoint, &params) {
        return rejected;
    }
    let Some((pic_name, pic_len)) = pic else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "request": endpoint, "error_code": 20005, "error": "pic is required" })),
        )
            .into_response();
    };
    Json(json!({
        "endpoint": endpoint,
        "params": to_object(&params),
        "pic_name": pic_name,
        "pic_len": pic_len,
    }))
    .into_response()
}

async fn picture(State(state): State<MockState>, Path(name): Path<String>) -> Response {
    if name.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let fetches = state.pic_fetches.fetch_add(1, Ordering::SeqCst) + 1;
    info!(%name, fetches, "serving picture");
    ([(header::CONTENT_TYPE, "image/png")], PICTURE_BYTES).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn param_finds_first_match() {
        let p = params(&[("access_token", "a"), ("uid", "1")]);
        assert_eq!(param(&p, "uid"), Some("1"));
        assert_eq!(param(&p, "screen_name"), None);
    }

    #[test]
    fn valid_token_is_not_rejected() {
        assert!(reject("/x", &params(&[("access_token", "good")])).is_none());
    }

    #[test]
    fn missing_token_is_rejected() {
        let resp = reject("/x", &params(&[])).unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn expired_token_is_200_with_error() {
        let resp = reject("/x", &params(&[("access_token", EXPIRED_TOKEN)])).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn server_error_token_is_500() {
        let resp = reject("/x", &params(&[("access_token", SERVER_ERROR_TOKEN)])).unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn params_become_json_object() {
        let obj = to_object(&params(&[("a", "1"), ("b", "x y")]));
        assert_eq!(obj["a"], "1");
        assert_eq!(obj["b"], "x y");
    }
}

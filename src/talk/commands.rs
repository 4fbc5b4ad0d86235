use axum::{
    extract::{RawQuery, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, Uri,
    },
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::TalkError, log_debug, log_error, log_warn, models::Point, AppState};

const ENABLE_LOGS: bool = true;

const MAX_SESSION_ID_LEN: usize = 128;

/// Body of every talk response. Status is always 200; failures carry `error`.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TalkResponse {
    Point(Point),
    Error(TalkError),
}

impl From<Result<Point, TalkError>> for TalkResponse {
    fn from(result: Result<Point, TalkError>) -> Self {
        match result {
            Ok(point) => TalkResponse::Point(point),
            Err(err) => TalkResponse::Error(err),
        }
    }
}

/// `GET /?<query>`: one point for the caller's session.
pub async fn talk(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let existing = session_from_cookies(&headers, &state.session_cookie);
    let session_id = existing
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let controller = state.talk.clone();
    let query = query.unwrap_or_default();
    let request_session = session_id.clone();
    let result = tokio::task::spawn_blocking(move || controller.handle(&request_session, &query))
        .await
        .unwrap_or_else(|err| {
            log_error!("Talk request for session {session_id} failed to complete: {err}");
            Err(TalkError::InvalidRequest)
        });

    let mut response = Json(TalkResponse::from(result)).into_response();
    if existing.is_none() {
        let cookie = format!(
            "{}={session_id}; Path=/; HttpOnly; SameSite=Lax",
            state.session_cookie
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(err) => log_warn!("Cannot set session cookie {:?}: {err}", state.session_cookie),
        }
    }
    response
}

/// Requests off the main routes. Paths that only differ from `/` or `/api`
/// by doubled slashes or a trailing `index.php` are served as talk requests.
pub async fn talk_fallback(
    state: State<AppState>,
    uri: Uri,
    query: RawQuery,
    headers: HeaderMap,
) -> Response {
    if is_talk_path(uri.path()) {
        return talk(state, query, headers).await;
    }
    log_debug!("Unknown path {}", uri.path());
    Json(TalkResponse::Error(TalkError::InvalidRequest)).into_response()
}

fn is_talk_path(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.last() == Some(&"index.php") {
        segments.pop();
    }
    matches!(segments.as_slice(), [] | ["api"])
}

/// Session id from the `Cookie` headers, if present and well-formed.
pub fn session_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| is_valid_session_id(value))
        .map(str::to_string)
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

//! HTTP API for the time clock.

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State, rejection::JsonRejection},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use timeclock_assistant::{Assistant, work_context};
use timeclock_core::{
    model::{User, WorkSession, WorkStatus},
    traits::SessionStorage,
};
use timeclock_session::{ClockError, TimeClock};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::protocol::{ChatReply, ChatRequest, ErrorBody, SessionsQuery};

/// Shared state of the API routes.
pub struct ApiState<S>
where
    S: SessionStorage,
{
    /// Time clock of the default user.
    pub time_clock: Arc<TimeClock<S>>,
    /// Chat assistant.
    pub assistant: Arc<Assistant>,
}

impl<S> ApiState<S>
where
    S: SessionStorage,
{
    /// Create new API state.
    #[must_use]
    pub fn new(time_clock: TimeClock<S>, assistant: Assistant) -> Self {
        Self {
            time_clock: Arc::new(time_clock),
            assistant: Arc::new(assistant),
        }
    }
}

impl<S> Clone for ApiState<S>
where
    S: SessionStorage,
{
    fn clone(&self) -> Self {
        Self {
            time_clock: Arc::clone(&self.time_clock),
            assistant: Arc::clone(&self.assistant),
        }
    }
}

/// API error, converted to a status code and JSON body at the route boundary.
#[derive(Debug)]
pub enum ApiError {
    /// 404 `{message}`.
    NotFound(String),
    /// 400 `{message}`.
    InvalidState(String),
    /// 500 `{message}`.
    Internal(String),
    /// 400 `{error}`: chat request without a message.
    MissingChatMessage,
    /// 500 `{error}`.
    ChatFailed,
}

impl ApiError {
    fn from_clock(err: ClockError, failure: &str) -> Self {
        match err {
            ClockError::NotFound(message) => Self::NotFound(message),
            ClockError::InvalidState(message) => Self::InvalidState(message),
            ClockError::Storage(e) => {
                tracing::error!("{failure}: {e}");
                Self::Internal(failure.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, ErrorBody::message(message)),
            Self::InvalidState(message) => (StatusCode::BAD_REQUEST, ErrorBody::message(message)),
            Self::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(message))
            }
            Self::MissingChatMessage => {
                (StatusCode::BAD_REQUEST, ErrorBody::error("Besked er påkrævet"))
            }
            Self::ChatFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::error("Der opstod en fejl"),
            ),
        };
        (status, Json(body)).into_response()
    }
}

async fn get_user<S>(State(state): State<ApiState<S>>) -> Result<Json<User>, ApiError>
where
    S: SessionStorage + 'static,
{
    state
        .time_clock
        .user()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_clock(e, "Failed to load user"))
}

async fn work_status<S>(State(state): State<ApiState<S>>) -> Result<Json<WorkStatus>, ApiError>
where
    S: SessionStorage + 'static,
{
    state
        .time_clock
        .status()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_clock(e, "Failed to load work status"))
}

async fn clock_in<S>(State(state): State<ApiState<S>>) -> Result<Json<WorkSession>, ApiError>
where
    S: SessionStorage + 'static,
{
    state
        .time_clock
        .clock_in()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_clock(e, "Failed to clock in"))
}

async fn clock_out<S>(State(state): State<ApiState<S>>) -> Result<Json<WorkSession>, ApiError>
where
    S: SessionStorage + 'static,
{
    state
        .time_clock
        .clock_out()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_clock(e, "Failed to clock out"))
}

async fn work_sessions<S>(
    State(state): State<ApiState<S>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<WorkSession>>, ApiError>
where
    S: SessionStorage + 'static,
{
    state
        .time_clock
        .recent_sessions(query.limit())
        .await
        .map(Json)
        .map_err(|e| ApiError::from_clock(e, "Failed to load work sessions"))
}

async fn work_sessions_today<S>(
    State(state): State<ApiState<S>>,
) -> Result<Json<Vec<WorkSession>>, ApiError>
where
    S: SessionStorage + 'static,
{
    state
        .time_clock
        .sessions_today()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_clock(e, "Failed to load work sessions"))
}

async fn chat<S>(
    State(state): State<ApiState<S>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError>
where
    S: SessionStorage + 'static,
{
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let message = request.text().ok_or(ApiError::MissingChatMessage)?;

    let status = state.time_clock.status().await.map_err(|e| {
        tracing::error!("Chat error: {e}");
        ApiError::ChatFailed
    })?;
    let context = work_context(status.is_working);

    let response = state.assistant.reply(message, Some(&context)).await;
    Ok(Json(ChatReply { response }))
}

/// Create the `/api` router.
///
/// # Example
/// ```ignore
/// let app = Router::new()
///     .merge(create_api_router(ApiState::new(time_clock, assistant)));
/// ```
#[must_use]
pub fn create_api_router<S>(state: ApiState<S>) -> Router
where
    S: SessionStorage + 'static,
{
    Router::new()
        .route("/api/user", get(get_user::<S>))
        .route("/api/work-status", get(work_status::<S>))
        .route("/api/clock-in", post(clock_in::<S>))
        .route("/api/clock-out", post(clock_out::<S>))
        .route("/api/work-sessions", get(work_sessions::<S>))
        .route("/api/work-sessions/today", get(work_sessions_today::<S>))
        .route("/api/chat", post(chat::<S>))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "api",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    tracing::info!(
                        status = response.status().as_u16(),
                        latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        "request finished"
                    );
                }),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::Method;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::{Value, json};
    use timeclock_assistant::assistant::{FAILURE_REPLY, NO_CREDENTIAL_REPLY};
    use timeclock_core::{
        DEFAULT_USER_ID, ManualClock,
        traits::{ChatError, ChatProvider},
    };
    use timeclock_session::storage::MemoryStorage;
    use tower::ServiceExt;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap()
    }

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 16, 15, 0).unwrap()
    }

    fn app_with(assistant: Assistant) -> (Router, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let time_clock = TimeClock::new(MemoryStorage::new(), clock.clone(), DEFAULT_USER_ID);
        (create_api_router(ApiState::new(time_clock, assistant)), clock)
    }

    fn app() -> (Router, Arc<ManualClock>) {
        app_with(Assistant::default())
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_get_user() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::GET, "/api/user", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "id": "default-user", "username": "philip", "name": "Philip" })
        );
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let clock = Arc::new(ManualClock::new(t0()));
        let time_clock = TimeClock::new(MemoryStorage::new(), clock, "ghost");
        let app = create_api_router(ApiState::new(time_clock, Assistant::default()));

        let (status, body) = call(&app, Method::GET, "/api/user", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn test_clock_in_status_clock_out_history() {
        let (app, clock) = app();

        let (status, session) = call(&app, Method::POST, "/api/clock-in", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["clockInTime"], "2025-03-04T08:00:00Z");
        assert_eq!(session["isActive"], true);

        let (_, work) = call(&app, Method::GET, "/api/work-status", None).await;
        assert_eq!(work["isWorking"], true);
        assert_eq!(work["activeSession"]["clockInTime"], "2025-03-04T08:00:00Z");
        assert_eq!(work["activeSession"]["clockOutTime"], Value::Null);

        clock.set(t1());
        let (status, closed) = call(&app, Method::POST, "/api/clock-out", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(closed["id"], session["id"]);
        assert_eq!(closed["clockOutTime"], "2025-03-04T16:15:00Z");
        assert_eq!(closed["isActive"], false);

        let (_, work) = call(&app, Method::GET, "/api/work-status", None).await;
        assert_eq!(work, json!({ "isWorking": false, "activeSession": null }));

        let (status, history) = call(&app, Method::GET, "/api/work-sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history, json!([closed]));
    }

    #[tokio::test]
    async fn test_double_clock_in_is_400() {
        let (app, _) = app();
        call(&app, Method::POST, "/api/clock-in", None).await;

        let (status, body) = call(&app, Method::POST, "/api/clock-in", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Already clocked in" }));
        let (_, history) = call(&app, Method::GET, "/api/work-sessions", None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clock_out_when_idle_is_400() {
        let (app, _) = app();

        let (status, body) = call(&app, Method::POST, "/api/clock-out", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "No active work session" }));
    }

    #[tokio::test]
    async fn test_history_limit() {
        let (app, clock) = app();
        for _ in 0..12 {
            call(&app, Method::POST, "/api/clock-in", None).await;
            clock.advance(chrono::Duration::minutes(30));
            call(&app, Method::POST, "/api/clock-out", None).await;
            clock.advance(chrono::Duration::minutes(30));
        }

        let (_, default) = call(&app, Method::GET, "/api/work-sessions", None).await;
        assert_eq!(default.as_array().unwrap().len(), 10);

        let (_, limited) = call(&app, Method::GET, "/api/work-sessions?limit=2", None).await;
        let limited = limited.as_array().unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0]["clockInTime"], "2025-03-04T19:00:00Z");
        assert_eq!(limited[1]["clockInTime"], "2025-03-04T18:00:00Z");
    }

    #[tokio::test]
    async fn test_today_sessions() {
        let (app, clock) = app();
        call(&app, Method::POST, "/api/clock-in", None).await;
        clock.advance(chrono::Duration::hours(1));
        call(&app, Method::POST, "/api/clock-out", None).await;
        clock.advance(chrono::Duration::hours(1));
        call(&app, Method::POST, "/api/clock-in", None).await;

        let (status, today) = call(&app, Method::GET, "/api/work-sessions/today", None).await;
        assert_eq!(status, StatusCode::OK);
        let starts: Vec<_> = today
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["clockInTime"].clone())
            .collect();
        assert_eq!(starts, vec![json!("2025-03-04T08:00:00Z"), json!("2025-03-04T10:00:00Z")]);

        clock.advance(chrono::Duration::days(1));
        let (_, tomorrow) = call(&app, Method::GET, "/api/work-sessions/today", None).await;
        assert_eq!(tomorrow, json!([]));
    }

    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatProvider for RecordingProvider {
        async fn complete(
            &self,
            system_prompt: &str,
            _user_message: &str,
        ) -> Result<Option<String>, ChatError> {
            self.prompts.lock().unwrap().push(system_prompt.to_string());
            if self.fail {
                Err(ChatError::Request("connection refused".to_string()))
            } else {
                Ok(Some("Hej Philip!".to_string()))
            }
        }
    }

    fn recording(fail: bool) -> Arc<RecordingProvider> {
        Arc::new(RecordingProvider {
            prompts: Mutex::new(Vec::new()),
            fail,
        })
    }

    #[tokio::test]
    async fn test_chat_includes_work_context() {
        let provider = recording(false);
        let (app, _) = app_with(Assistant::new(Some(provider.clone())));
        call(&app, Method::POST, "/api/clock-in", None).await;

        let (status, body) =
            call(&app, Method::POST, "/api/chat", Some(json!({ "message": "Hej" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "Hej Philip!" }));
        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("Kontekst: Brugeren er i øjeblikket på arbejde."));
    }

    #[tokio::test]
    async fn test_chat_provider_failure_is_danish_reply() {
        let (app, _) = app_with(Assistant::new(Some(recording(true))));

        let (status, body) =
            call(&app, Method::POST, "/api/chat", Some(json!({ "message": "Hej" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": FAILURE_REPLY }));
    }

    #[tokio::test]
    async fn test_chat_without_credential() {
        let (app, _) = app();

        let (status, body) =
            call(&app, Method::POST, "/api/chat", Some(json!({ "message": "Hej" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": NO_CREDENTIAL_REPLY }));
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let (app, _) = app();

        let (status, body) = call(&app, Method::POST, "/api/chat", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Besked er påkrævet" }));

        let (status, _) = call(&app, Method::POST, "/api/chat", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

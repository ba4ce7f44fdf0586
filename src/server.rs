use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::MutexGuard;
use tokio_stream::wrappers::WatchStream;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::api::{AskClient, HttpAskClient};
use crate::config::{ApiConfig, AppConfig};
use crate::conversation::{ConversationController, Message, PendingQuestion, SubmitError};
use crate::render;
use crate::resilience::{rate_limit_middleware, timeout_middleware};
use crate::session::Session;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let client = build_client(&config.api)?;
    info!(
        name: "backend.config.loaded",
        endpoint = %client.endpoint(),
        timeout_secs = ?config.api.timeout_secs,
        "Backend configuration loaded"
    );

    let state = AppState::new(Arc::clone(&config), Arc::new(client));

    let _sweeper = state.sessions.spawn_sweeper(
        Duration::from_secs(config.session.sweep_interval_secs.max(1)),
        Duration::from_secs(config.session.idle_timeout_secs),
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn build_client(api: &ApiConfig) -> anyhow::Result<HttpAskClient> {
    let client = match api.timeout_secs {
        Some(secs) => HttpAskClient::with_timeout(&api.base_url, Duration::from_secs(secs)),
        None => HttpAskClient::new(&api.base_url),
    };
    client.with_context(|| format!("invalid api.base_url {:?}", api.base_url))
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // Everything that creates or mutates a session is limited.
    let actions = Router::new()
        .route("/", get(index_handler))
        .route("/sessions/{id}/messages", post(submit_message))
        .route("/sessions/{id}/suggestions/{index}", post(submit_suggestion))
        .route("/sessions/{id}/reset", post(reset_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/sessions/{id}/panel", get(session_panel))
        .route("/sessions/{id}/events", get(session_events))
        .route("/api/sessions/{id}/messages", get(api_get_messages))
        .merge(actions)
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            timeout_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Every page load starts a new conversation.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let session = state.sessions.create();
    tracing::debug!(
        name: "session.created",
        session_id = %session.id(),
        active_sessions = state.sessions.len(),
        "Created session"
    );

    let convo = session.conversation().lock().await;
    Html(render::page(session.id(), convo.state()))
}

/// GET /sessions/:id/panel - Current panel fragment.
async fn session_panel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let session = find_session(&state, &id)?;
    let convo = session.conversation().lock().await;
    Ok(Html(render::panel(session.id(), convo.state())))
}

/// GET /sessions/:id/events - Re-rendered panel after every transcript change.
async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let session = find_session(&state, &id)?;
    let updates = WatchStream::new(session.conversation().lock().await.subscribe());

    tracing::debug!(session_id = %session.id(), "Panel stream opened");

    let stream = async_stream::stream! {
        futures::pin_mut!(updates);
        while let Some(revision) = updates.next().await {
            let html = {
                let convo = session.conversation().lock().await;
                render::panel(session.id(), convo.state())
            };
            session.touch();
            yield Ok(Event::default().event("panel").id(revision.to_string()).data(html));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Action Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body for a typed question.
#[derive(Debug, Deserialize)]
struct SubmitForm {
    #[serde(default)]
    message: String,
}

/// POST /sessions/:id/messages - Ask a typed question.
async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, StatusCode> {
    let session = find_session(&state, &id)?;
    let mut convo = session.conversation().lock().await;
    let pending = convo.begin(&form.message);
    start_question(&state, &session, convo, pending)
}

/// POST /sessions/:id/suggestions/:index - Ask a landing-view suggestion.
async fn submit_suggestion(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Response, StatusCode> {
    let session = find_session(&state, &id)?;
    let mut convo = session.conversation().lock().await;
    let pending = convo.begin_suggestion(index);
    start_question(&state, &session, convo, pending)
}

/// POST /sessions/:id/reset - Start over.
async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let session = find_session(&state, &id)?;
    let mut convo = session.conversation().lock().await;
    convo.reset().map_err(|e| reject(session.id(), e))?;
    session.touch();

    tracing::info!(
        name: "session.reset",
        session_id = %session.id(),
        age_secs = session.age().as_secs(),
        "Conversation reset"
    );

    Ok(Html(render::panel(session.id(), convo.state())))
}

/// Hand a begun question to a background task and answer with the panel as
/// it looks now (thinking).
fn start_question(
    state: &AppState,
    session: &Session,
    convo: MutexGuard<'_, ConversationController>,
    pending: Result<PendingQuestion, SubmitError>,
) -> Result<Response, StatusCode> {
    let pending = pending.map_err(|e| reject(session.id(), e))?;
    session.touch();

    let html = render::panel(session.id(), convo.state());
    drop(convo);

    tracing::info!(
        name: "question.submitted",
        session_id = %session.id(),
        query_length = pending.query().len(),
        "Question submitted"
    );

    spawn_answer(Arc::clone(&state.client), session.clone(), pending);
    Ok((StatusCode::ACCEPTED, Html(html)).into_response())
}

/// Await the backend outside the session lock, then settle.
fn spawn_answer(client: Arc<dyn AskClient>, session: Session, pending: PendingQuestion) {
    tokio::spawn(async move {
        let outcome = client.ask(pending.query()).await;
        let ok = outcome.is_ok();

        session.conversation().lock().await.settle(pending, outcome);
        session.touch();

        tracing::info!(
            name: "question.settled",
            session_id = %session.id(),
            ok,
            "Question settled"
        );
    });
}

fn reject(session_id: &str, err: SubmitError) -> StatusCode {
    tracing::debug!(session_id = %session_id, reason = %err, "Submit rejected");
    match err {
        SubmitError::EmptyQuery => StatusCode::NO_CONTENT,
        SubmitError::Busy | SubmitError::SuggestionsClosed => StatusCode::CONFLICT,
        SubmitError::UnknownSuggestion(_) => StatusCode::NOT_FOUND,
    }
}

fn find_session(state: &AppState, id: &str) -> Result<Session, StatusCode> {
    state.sessions.get(id).ok_or_else(|| {
        tracing::debug!(session_id = %id, "Session not found");
        StatusCode::NOT_FOUND
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/sessions/:id/messages - Get session transcript.
async fn api_get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let session = find_session(&state, &id)?;
    let convo = session.conversation().lock().await;
    Ok(Json(convo.state().messages().to_vec()))
}

//! Chat panel: landing view, transcript, thinking indicator and composer.

use std::fmt::Write as _;

use super::html::{disabled_attr, escape, html_shell};
use super::message::message;
use crate::conversation::{ConversationState, SUGGESTIONS};

/// Element the view scrolls to after every swap.
pub const TRANSCRIPT_END_ID: &str = "transcript-end";

/// Full page for a freshly created session.
///
/// The panel container subscribes to the session's event stream and swaps in
/// each re-rendered panel, bringing the newest content into view. An action
/// answered with `404` means the session is gone; the page reloads into a
/// fresh one.
#[must_use]
pub fn page(session_id: &str, state: &ConversationState) -> String {
    let sid = escape(session_id);
    let content = format!(
        r#"<div id="chat-root"
         class="chat-root"
         hx-ext="sse"
         sse-connect="/sessions/{sid}/events"
         sse-swap="panel"
         hx-swap="innerHTML show:#{TRANSCRIPT_END_ID}:bottom"
         hx-on::response-error="if (event.detail.xhr.status === 404) window.location.reload()">
{panel}
</div>"#,
        panel = panel(session_id, state),
    );
    html_shell("Chat", &content)
}

/// Everything inside the chat root: transcript (or landing view) and composer.
#[must_use]
pub fn panel(session_id: &str, state: &ConversationState) -> String {
    let body = if state.is_empty() {
        landing(session_id)
    } else {
        transcript(state)
    };

    format!(
        r#"<section id="chat-panel" class="chat-panel" data-thinking="{thinking}">
    <div id="transcript" class="transcript">
{body}
        <div id="{TRANSCRIPT_END_ID}"></div>
    </div>
{composer}
</section>"#,
        thinking = state.is_thinking(),
        composer = composer(session_id, state),
    )
}

/// Messages in append order, followed by the indicator while thinking.
#[must_use]
pub fn transcript(state: &ConversationState) -> String {
    let mut out = String::new();
    for msg in state.messages() {
        let _ = writeln!(out, "{}", message(msg));
    }
    if state.is_thinking() {
        out.push_str(thinking_indicator());
    }
    out
}

/// Greeting and suggestion chips for an empty transcript.
#[must_use]
pub fn landing(session_id: &str) -> String {
    let sid = escape(session_id);
    let mut chips = String::new();
    for (index, text) in SUGGESTIONS.iter().enumerate() {
        let _ = writeln!(
            chips,
            r#"        <button type="button" class="suggestion-chip" hx-post="/sessions/{sid}/suggestions/{index}" hx-swap="none">{text}</button>"#,
            text = escape(text),
        );
    }

    format!(
        r#"<div class="landing">
    <div class="landing-mark">🐾</div>
    <h2 class="landing-title">Hi, I'm Agy!</h2>
    <p class="landing-intro">
        I can help you explore Matt Pugmire's portfolio of 115+ transformation projects.
        Try asking about his experience:
    </p>
    <div class="suggestions">
{chips}    </div>
</div>"#
    )
}

/// Transient "working" row shown while a question is in flight.
#[must_use]
pub fn thinking_indicator() -> &'static str {
    r#"<div class="message-row message-row--assistant thinking-indicator" role="status" aria-live="polite">
    <div class="avatar avatar--assistant avatar--pulse">🐾</div>
    <div class="message-body">
        <div class="bubble bubble--assistant">
            <span class="thinking-dots"><span></span><span></span><span></span></span>
            <span class="thinking-label">Agy is thinking...</span>
        </div>
    </div>
</div>
"#
}

/// Input form. Disabled while a question is in flight.
#[must_use]
pub fn composer(session_id: &str, state: &ConversationState) -> String {
    let sid = escape(session_id);
    let disabled = disabled_attr(state.is_thinking());
    let reset = if state.is_empty() {
        String::new()
    } else {
        format!(
            r#"<button type="button" class="reset-button" hx-post="/sessions/{sid}/reset" hx-swap="none"{disabled}>New conversation</button>"#
        )
    };

    format!(
        r#"    <div class="composer">
        <form class="composer-form"
              hx-post="/sessions/{sid}/messages"
              hx-trigger="submit, keydown[key=='Enter'&&!shiftKey]"
              hx-swap="none">
            <textarea name="message"
                      class="composer-input"
                      placeholder="Ask Agy about Matt's experience..."
                      rows="1"
                      autofocus
                      required{disabled}></textarea>
            <button type="submit" class="composer-send"{disabled}>Ask Agy 🐾</button>
        </form>
        {reset}
    </div>"#
    )
}

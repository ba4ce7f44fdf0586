//! Message bubbles and source cards.

use std::fmt::Write as _;

use super::html::escape;
use crate::api::Source;
use crate::conversation::{Message, Role};

/// Sources shown under an answer; any beyond this are kept but not drawn.
pub const MAX_RENDERED_SOURCES: usize = 3;

/// Relevance score as a rounded percentage, `0.87` -> `"87%"`.
///
/// Scores outside `[0, 1]` are clamped. Non-finite scores have no rendering.
#[must_use]
pub fn format_score(score: f64) -> Option<String> {
    if !score.is_finite() {
        return None;
    }
    let percent = (score.clamp(0.0, 1.0) * 100.0).round();
    Some(format!("{percent:.0}%"))
}

/// One source citation.
#[must_use]
pub fn source_card(source: &Source) -> String {
    let score = source
        .score
        .and_then(format_score)
        .map(|pct| format!(r#"<div class="source-score">{pct}</div>"#))
        .unwrap_or_default();

    format!(
        r#"<div class="source-card" data-source-id="{id}">
    <div class="source-text">
        <div class="source-title">{title}</div>
        <div class="source-client">{client}</div>
    </div>
    {score}
</div>"#,
        id = escape(&source.id),
        title = escape(&source.title),
        client = escape(&source.client),
    )
}

/// One transcript row.
#[must_use]
pub fn message(msg: &Message) -> String {
    let role = msg.role().as_str();
    let avatar = match msg.role() {
        Role::User => "U",
        Role::Assistant => "🐾",
    };
    let (bubble_modifier, badge) = if msg.is_off_topic() {
        (
            " bubble--off-topic",
            r#"<span class="badge badge--off-topic">Off-topic</span>"#,
        )
    } else {
        ("", "")
    };

    let sources = match msg.role() {
        Role::Assistant => source_list(msg.sources()),
        Role::User => String::new(),
    };

    format!(
        r#"<div class="message-row message-row--{role}" id="message-{id}">
    <div class="avatar avatar--{role}">{avatar}</div>
    <div class="message-body">
        <div class="bubble bubble--{role}{bubble_modifier}">
            {badge}<div class="message-content">{content}</div>
        </div>
        {sources}
    </div>
</div>"#,
        id = msg.id(),
        content = escape(msg.content()),
    )
}

fn source_list(sources: &[Source]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut cards = String::new();
    for source in sources.iter().take(MAX_RENDERED_SOURCES) {
        let _ = writeln!(cards, "{}", source_card(source));
    }

    format!(
        r#"<div class="sources">
    <div class="sources-label">Sources:</div>
    <div class="source-list">
{cards}    </div>
</div>"#
    )
}

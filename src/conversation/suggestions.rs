//! Example questions offered on the landing view.

/// Pre-written questions shown while the transcript is empty.
pub const SUGGESTIONS: [&str; 6] = [
    "How did Matt scale engineering teams?",
    "Show me agile transformation examples",
    "What's Matt's experience with payments?",
    "Tell me about digital transformation at banks",
    "How does Matt approach stakeholder management?",
    "What methodologies has Matt used in practice?",
];

/// Look up a suggestion by its position on the landing view.
#[must_use]
pub fn suggestion(index: usize) -> Option<&'static str> {
    SUGGESTIONS.get(index).copied()
}

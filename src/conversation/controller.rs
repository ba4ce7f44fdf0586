//! Request/response cycle and transcript ownership.

use thiserror::Error;
use tokio::sync::watch;

use super::message::Message;
use super::suggestions::suggestion;
use crate::api::{AskClient, AskError, AskResponse};

/// Why a submit (or reset) was refused. None of these mutate the transcript.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Input was empty or whitespace only.
    #[error("question is empty")]
    EmptyQuery,
    /// A question is already waiting for an answer.
    #[error("a question is already in flight")]
    Busy,
    /// Suggestions are only offered on an empty transcript.
    #[error("suggestions are no longer offered")]
    SuggestionsClosed,
    /// No suggestion at that position.
    #[error("unknown suggestion {0}")]
    UnknownSuggestion(usize),
}

/// Read-only view of a conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    is_thinking: bool,
}

impl ConversationState {
    /// Transcript in conversation order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a question is waiting for the backend. The input surface
    /// is disabled in this state.
    #[must_use]
    pub fn is_thinking(&self) -> bool {
        self.is_thinking
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A question that has been appended and is waiting for its answer.
///
/// Returned by [`ConversationController::begin`]; hand it back to
/// [`ConversationController::settle`] once the backend call finishes.
#[derive(Debug)]
#[must_use = "a pending question keeps the conversation in the thinking state until settled"]
pub struct PendingQuestion {
    query: String,
}

impl PendingQuestion {
    /// Trimmed question text to send to the backend.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Owns one transcript and drives questions through the backend.
///
/// Every mutation bumps a revision counter; views subscribe to it to re-render
/// and scroll to the newest content.
///
/// # Example
///
/// ```rust,no_run
/// use mattgpt::api::HttpAskClient;
/// use mattgpt::conversation::ConversationController;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpAskClient::new("http://localhost:3001")?;
/// let mut conversation = ConversationController::new();
/// conversation.submit("How did Matt scale engineering teams?", &client).await?;
/// assert_eq!(conversation.state().messages().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConversationController {
    state: ConversationState,
    revision: watch::Sender<u64>,
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationController {
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: ConversationState::default(),
            revision,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Current revision. Starts at 0.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribe to transcript changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Number of live subscriptions, i.e. open pages.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.revision.receiver_count()
    }

    /// Append the user's question and enter the thinking state.
    pub fn begin(&mut self, input: &str) -> Result<PendingQuestion, SubmitError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(SubmitError::EmptyQuery);
        }
        if self.state.is_thinking {
            return Err(SubmitError::Busy);
        }

        self.state.messages.push(Message::user(query));
        self.bump();
        self.state.is_thinking = true;
        self.bump();

        Ok(PendingQuestion {
            query: query.to_string(),
        })
    }

    /// Same as [`begin`](Self::begin) with the text of landing-view
    /// suggestion `index`.
    pub fn begin_suggestion(&mut self, index: usize) -> Result<PendingQuestion, SubmitError> {
        if !self.state.is_empty() {
            return Err(SubmitError::SuggestionsClosed);
        }
        let text = suggestion(index).ok_or(SubmitError::UnknownSuggestion(index))?;
        self.begin(text)
    }

    /// Record the backend outcome for `pending` and return to idle.
    ///
    /// Failures are logged and replaced by a fixed apology; the cause never
    /// reaches the transcript.
    pub fn settle(&mut self, pending: PendingQuestion, outcome: Result<AskResponse, AskError>) {
        let reply = match outcome {
            Ok(resp) => Message::assistant(resp.answer, resp.sources, resp.is_nonsense),
            Err(err) => {
                tracing::warn!(
                    name: "conversation.ask.failed",
                    error = %err,
                    query_length = pending.query.len(),
                    "Backend call failed, replying with apology"
                );
                Message::apology()
            }
        };

        self.state.messages.push(reply);
        self.bump();
        self.state.is_thinking = false;
        self.bump();
    }

    /// Run a full question cycle against `client`.
    pub async fn submit<C>(&mut self, input: &str, client: &C) -> Result<(), SubmitError>
    where
        C: AskClient + ?Sized,
    {
        let pending = self.begin(input)?;
        let outcome = client.ask(pending.query()).await;
        self.settle(pending, outcome);
        Ok(())
    }

    /// Discard the transcript. Refused while a question is in flight.
    pub fn reset(&mut self) -> Result<(), SubmitError> {
        if self.state.is_thinking {
            return Err(SubmitError::Busy);
        }
        self.state.messages.clear();
        self.bump();
        Ok(())
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::api::Source;
    use crate::conversation::message::{APOLOGY, Role};
    use crate::conversation::suggestions::SUGGESTIONS;

    /// Replays canned outcomes and counts calls.
    struct ScriptedClient {
        outcomes: Mutex<VecDeque<Result<AskResponse, AskError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(outcomes: Vec<Result<AskResponse, AskError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AskClient for ScriptedClient {
        async fn ask(&self, _query: &str) -> crate::api::Result<AskResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(AskError::Status { status: 503 }))
        }
    }

    fn answer(text: &str, n_sources: usize) -> AskResponse {
        AskResponse {
            answer: text.to_string(),
            sources: (0..n_sources)
                .map(|i| Source {
                    id: format!("s-{i}"),
                    title: format!("Story {i}"),
                    client: "Acme".to_string(),
                    score: Some(0.9),
                })
                .collect(),
            is_nonsense: false,
        }
    }

    #[tokio::test]
    async fn test_submit_appends_pair() {
        let client = ScriptedClient::new(vec![Ok(answer("Grew the team to 40.", 2))]);
        let mut convo = ConversationController::new();
        assert!(!convo.state().is_thinking());

        convo.submit("  How did Matt scale teams?  ", &client).await.unwrap();

        let msgs = convo.state().messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role(), Role::User);
        assert_eq!(msgs[0].content(), "How did Matt scale teams?");
        assert_eq!(msgs[1].role(), Role::Assistant);
        assert_eq!(msgs[1].content(), "Grew the team to 40.");
        assert_eq!(msgs[1].sources().len(), 2);
        assert!(!convo.state().is_thinking());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let client = ScriptedClient::new(vec![]);
        let mut convo = ConversationController::new();

        for input in ["", "   ", "\n\t "] {
            let err = convo.submit(input, &client).await.unwrap_err();
            assert_eq!(err, SubmitError::EmptyQuery);
        }

        assert!(convo.state().is_empty());
        assert_eq!(convo.revision(), 0);
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_begin_while_thinking_is_busy() {
        let mut convo = ConversationController::new();
        let pending = convo.begin("first").unwrap();
        assert!(convo.state().is_thinking());

        assert_eq!(convo.begin("second").unwrap_err(), SubmitError::Busy);
        assert_eq!(convo.state().messages().len(), 1);

        convo.settle(pending, Ok(answer("ok", 0)));
        assert!(!convo.state().is_thinking());
        assert!(convo.begin("second").is_ok());
    }

    #[tokio::test]
    async fn test_failure_appends_apology() {
        let client = ScriptedClient::new(vec![Err(AskError::Status { status: 500 })]);
        let mut convo = ConversationController::new();

        convo.submit("payments?", &client).await.unwrap();

        let reply = &convo.state().messages()[1];
        assert_eq!(reply.content(), APOLOGY);
        assert!(reply.sources().is_empty());
        assert!(!convo.state().is_thinking());
    }

    #[tokio::test]
    async fn test_keeps_all_sources_on_message() {
        let client = ScriptedClient::new(vec![Ok(answer("five", 5))]);
        let mut convo = ConversationController::new();
        convo.submit("q", &client).await.unwrap();
        assert_eq!(convo.state().messages()[1].sources().len(), 5);
    }

    #[tokio::test]
    async fn test_off_topic_flag_carried() {
        let mut resp = answer("I'm Agy!", 0);
        resp.is_nonsense = true;
        let client = ScriptedClient::new(vec![Ok(resp)]);
        let mut convo = ConversationController::new();
        convo.submit("who are you", &client).await.unwrap();
        assert!(convo.state().messages()[1].is_off_topic());
    }

    #[tokio::test]
    async fn test_roles_alternate() {
        let client = ScriptedClient::new(vec![
            Ok(answer("a", 1)),
            Err(AskError::Status { status: 502 }),
            Ok(answer("c", 3)),
        ]);
        let mut convo = ConversationController::new();
        for q in ["one", "two", "three"] {
            convo.submit(q, &client).await.unwrap();
        }

        let roles: Vec<Role> = convo.state().messages().iter().map(Message::role).collect();
        assert_eq!(
            roles,
            [
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn test_revision_bumps_per_mutation() {
        let client = ScriptedClient::new(vec![Ok(answer("a", 0))]);
        let mut convo = ConversationController::new();
        let mut rx = convo.subscribe();

        convo.submit("q", &client).await.unwrap();

        assert_eq!(convo.revision(), 4);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 4);
    }

    #[test]
    fn test_subscriber_count_tracks_open_receivers() {
        let convo = ConversationController::new();
        assert_eq!(convo.subscriber_count(), 0);

        let first = convo.subscribe();
        let second = convo.subscribe();
        assert_eq!(convo.subscriber_count(), 2);

        drop(first);
        drop(second);
        assert_eq!(convo.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_suggestion_matches_manual_submit() {
        let text = "How did Matt scale engineering teams?";
        let index = SUGGESTIONS.iter().position(|s| *s == text).unwrap();

        let mut manual = ConversationController::new();
        manual
            .submit(text, &ScriptedClient::new(vec![Ok(answer("same", 1))]))
            .await
            .unwrap();

        let mut picked = ConversationController::new();
        let pending = picked.begin_suggestion(index).unwrap();
        assert_eq!(pending.query(), text);
        picked.settle(pending, Ok(answer("same", 1)));

        let contents = |c: &ConversationController| {
            c.state()
                .messages()
                .iter()
                .map(|m| (m.role(), m.content().to_string(), m.sources().to_vec()))
                .collect::<Vec<_>>()
        };
        assert_eq!(contents(&manual), contents(&picked));
    }

    #[test]
    fn test_suggestions_closed_after_first_question() {
        let mut convo = ConversationController::new();
        let pending = convo.begin("hello").unwrap();
        convo.settle(pending, Ok(answer("hi", 0)));

        assert_eq!(
            convo.begin_suggestion(0).unwrap_err(),
            SubmitError::SuggestionsClosed
        );
        assert_eq!(
            ConversationController::new().begin_suggestion(99).unwrap_err(),
            SubmitError::UnknownSuggestion(99)
        );
    }

    #[test]
    fn test_reset() {
        let mut convo = ConversationController::new();
        let pending = convo.begin("hello").unwrap();
        assert_eq!(convo.reset().unwrap_err(), SubmitError::Busy);

        convo.settle(pending, Ok(answer("hi", 0)));
        convo.reset().unwrap();
        assert!(convo.state().is_empty());
        assert!(!convo.state().is_thinking());
    }
}

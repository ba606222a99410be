//! The session controller.
//!
//! [`ChatSession`] owns one conversation with the remote assistant: the
//! transcript, the HTTP client, and at most one in-flight streaming request.
//! `send` drives the full pipeline — line scanning, payload filtering,
//! command extraction, dispatch, transcript assembly — to completion, and
//! every terminal path (natural end, cancellation, transport failure)
//! finalizes the accumulating message and clears the streaming state.
//!
//! Cancellation is cooperative: a [`SessionHandle`] cancels the session's
//! token, and the chunk loop observes it at the next scheduling opportunity.

use std::sync::Arc;

use futures::StreamExt;
use reqwest::header;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use geolink_models::{ChatRequest, Message};

use crate::dispatch::{dispatch, Viewport};
use crate::error::ChatError;
use crate::extract::CommandExtractor;
use crate::framing::{payload_of, LineScanner};
use crate::transcript::Transcript;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Observable lifecycle state of a [`ChatSession`].
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// No request in flight.
    Idle,
    /// A reply stream is being consumed.
    Streaming,
    /// The last send ended in a transport failure.
    Failed,
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Clonable cancellation handle for the send currently in flight.
///
/// Obtain it before awaiting [`ChatSession::send`]; cancelling after the
/// send has completed is a no-op, as is cancelling twice.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Signal cancellation to the in-flight stream.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

// ---------------------------------------------------------------------------
// ChatSession
// ---------------------------------------------------------------------------

/// One conversation with the assistant channel.
///
/// The transcript is single-writer: only the session mutates it, and it is
/// exposed read-only via [`messages`](Self::messages). The viewport is an
/// injected collaborator; without one, extracted commands are dropped.
pub struct ChatSession {
    http: reqwest::Client,
    endpoint: String,
    viewport: Option<Arc<dyn Viewport>>,
    transcript: Transcript,
    status: SessionStatus,
    cancel: CancellationToken,
    scanner: LineScanner,
    extractor: CommandExtractor,
}

impl ChatSession {
    /// Create a session that will POST to the given chat endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            viewport: None,
            transcript: Transcript::new(),
            status: SessionStatus::Idle,
            cancel: CancellationToken::new(),
            scanner: LineScanner::new(),
            extractor: CommandExtractor::new(),
        }
    }

    /// Attach the viewport collaborator commands are dispatched to.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Arc<dyn Viewport>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, headers).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    // ------------------------------------------------------------------
    // Consumer view
    // ------------------------------------------------------------------

    /// Read-only view of the transcript.
    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True while a reply stream is being consumed.
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Streaming
    }

    /// Cancellation handle for the next / current send.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            cancel: self.cancel.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Send a prompt and consume the streamed reply to completion.
    ///
    /// Appends the user message, opens the streaming request, and pipes
    /// every delivered chunk through the decoding pipeline. Returns once
    /// the stream ends, the session is cancelled (still `Ok`), or a
    /// transport failure occurs.
    ///
    /// # Errors
    ///
    /// [`ChatError::SessionBusy`] if a stream is already in flight;
    /// otherwise transport and status errors from the request.
    pub async fn send(&mut self, prompt: &str) -> Result<(), ChatError> {
        self.begin(prompt)?;
        let result = self.stream_reply(prompt).await;
        self.complete(&result);
        result
    }

    /// Cancel any in-flight stream and close out the transcript.
    ///
    /// Idempotent; cancelling an idle or already-cancelled session changes
    /// nothing.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.transcript.finalize();
        if self.status == SessionStatus::Streaming {
            self.status = SessionStatus::Idle;
        }
        self.cancel = CancellationToken::new();
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    fn begin(&mut self, prompt: &str) -> Result<(), ChatError> {
        if self.status == SessionStatus::Streaming {
            return Err(ChatError::SessionBusy);
        }
        debug!(prompt_chars = prompt.len(), "opening chat stream");
        self.transcript.push_user(prompt);
        self.status = SessionStatus::Streaming;
        self.scanner = LineScanner::new();
        self.extractor = CommandExtractor::new();
        Ok(())
    }

    async fn stream_reply(&mut self, prompt: &str) -> Result<(), ChatError> {
        let body = serde_json::to_vec(&ChatRequest::streaming(prompt))?;
        let response = self
            .http
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                code: status.as_u16(),
            });
        }

        let mut chunks = response.bytes_stream();
        let cancel = self.cancel.clone();
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("cancellation observed; closing stream");
                    return Ok(());
                }
                next = chunks.next() => match next {
                    Some(Ok(chunk)) => self.process_chunk(&chunk),
                    Some(Err(e)) => return Err(ChatError::Http(e)),
                    None => return Ok(()),
                }
            }
        }
    }

    /// Run every line completed by `chunk` through filter → extract →
    /// dispatch → assemble. Synchronous; chunks are processed strictly in
    /// delivery order.
    fn process_chunk(&mut self, chunk: &[u8]) {
        for line in self.scanner.push(chunk) {
            self.handle_line(&line);
        }
    }

    fn handle_line(&mut self, line: &str) {
        let Some(payload) = payload_of(line) else {
            return;
        };
        let extraction = self.extractor.scan(payload);
        for command in &extraction.commands {
            dispatch(command, self.viewport.as_deref());
        }
        if !extraction.display.is_empty() {
            self.transcript.push_payload(&extraction.display);
        }
    }

    /// Common teardown for every terminal path.
    ///
    /// The unterminated final line is delivered only when the stream ended
    /// naturally; on cancellation or failure the pending bytes were cut
    /// mid-delivery and are dropped with the rest of the reply.
    fn complete(&mut self, result: &Result<(), ChatError>) {
        let deliver_tail = result.is_ok() && !self.cancel.is_cancelled();
        let scanner = std::mem::take(&mut self.scanner);
        if deliver_tail {
            if let Some(last_line) = scanner.finish() {
                self.handle_line(&last_line);
            }
        }
        let held = self.extractor.finish();
        if !held.is_empty() {
            self.transcript.push_payload(&held);
        }
        self.transcript.finalize();
        self.status = match result {
            Ok(()) => SessionStatus::Idle,
            Err(e) => {
                error!(error = %e, "chat stream failed");
                SessionStatus::Failed
            }
        };
        // Stale handles from this send must not poison the next one.
        self.cancel = CancellationToken::new();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::CameraFlight;
    use geolink_models::{MessageState, Role};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingViewport {
        flights: Mutex<Vec<CameraFlight>>,
    }

    impl Viewport for RecordingViewport {
        fn fly_to(&self, flight: CameraFlight) {
            self.flights.lock().unwrap().push(flight);
        }
    }

    fn session_with_viewport() -> (ChatSession, Arc<RecordingViewport>) {
        let viewport = Arc::new(RecordingViewport::default());
        let session = ChatSession::new("http://localhost:0/api/chat")
            .with_viewport(viewport.clone() as Arc<dyn Viewport>);
        (session, viewport)
    }

    #[test]
    fn scenario_plain_reply() {
        let (mut s, viewport) = session_with_viewport();

        s.begin("ping").unwrap();
        assert!(s.is_loading());
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].role, Role::User);
        assert_eq!(s.messages()[0].content, "ping");

        s.process_chunk(b"data: Hello \n");
        s.process_chunk(b"data: World\n");
        s.complete(&Ok(()));

        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(!s.is_loading());
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].role, Role::Assistant);
        assert_eq!(s.messages()[1].content, "Hello World");
        assert_eq!(s.messages()[1].state, MessageState::Finalized);
        assert!(viewport.flights.lock().unwrap().is_empty());
    }

    #[test]
    fn command_round_trip_with_defaults() {
        let (mut s, viewport) = session_with_viewport();
        s.begin("go").unwrap();
        s.process_chunk(
            b"data: On my way. <CMD>{\"action\":\"flyTo\",\"params\":{\"lat\":25,\"lon\":100}}</CMD>\n",
        );
        s.complete(&Ok(()));

        let flights = viewport.flights.lock().unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].lat_degrees, 25.0);
        assert_eq!(flights[0].lon_degrees, 100.0);
        assert_eq!(flights[0].height_meters, 3000.0);
        assert_eq!(flights[0].heading_radians, 0.0);
        assert!((flights[0].pitch_radians - (-45.0f64).to_radians()).abs() < 1e-12);
        assert_eq!(flights[0].roll_radians, 0.0);
        // The executed command span is not shown in the transcript.
        assert_eq!(s.messages()[1].content, "On my way. ");
    }

    #[test]
    fn command_split_across_payload_fragments() {
        let (mut s, viewport) = session_with_viewport();
        s.begin("go").unwrap();
        s.process_chunk(b"data: <CMD>{\"action\":\"flyTo\",\"params\":{\"lat\":25,\n");
        s.process_chunk(b"data: \"lon\":100}}</CMD> arrived\n");
        s.complete(&Ok(()));

        let flights = viewport.flights.lock().unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].lat_degrees, 25.0);
        assert_eq!(s.messages()[1].content, " arrived");
    }

    #[test]
    fn malformed_command_keeps_streaming() {
        let (mut s, viewport) = session_with_viewport();
        s.begin("go").unwrap();
        s.process_chunk(b"data: <CMD>{not valid json}</CMD>\n");
        s.process_chunk(b"data: but text continues\n");
        s.complete(&Ok(()));

        assert!(viewport.flights.lock().unwrap().is_empty());
        assert_eq!(
            s.messages()[1].content,
            "<CMD>{not valid json}</CMD>but text continues"
        );
        assert_eq!(s.messages()[1].state, MessageState::Finalized);
    }

    #[test]
    fn line_split_mid_multibyte_character() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("name the lake").unwrap();
        let bytes = "data: 青海湖\n".as_bytes();
        // Split inside the second character's UTF-8 sequence.
        s.process_chunk(&bytes[..10]);
        s.process_chunk(&bytes[10..]);
        s.complete(&Ok(()));
        assert_eq!(s.messages()[1].content, "青海湖");
    }

    #[test]
    fn control_lines_ignored() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("hi").unwrap();
        s.process_chunk(b"event: message\n: keep-alive\ndata: visible\n\n");
        s.complete(&Ok(()));
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].content, "visible");
    }

    #[test]
    fn unterminated_final_line_delivered_on_natural_end() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("hi").unwrap();
        s.process_chunk(b"data: first\ndata: trailing");
        s.complete(&Ok(()));
        assert_eq!(s.messages()[1].content, "firsttrailing");
    }

    #[test]
    fn no_tail_delivery_on_failure() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("hi").unwrap();
        s.process_chunk(b"data: kept\ndata: cut off mid");
        s.complete(&Err(ChatError::Status { code: 502 }));
        assert_eq!(s.status(), SessionStatus::Failed);
        assert_eq!(s.messages()[1].content, "kept");
        assert_eq!(s.messages()[1].state, MessageState::Finalized);
    }

    #[test]
    fn busy_session_rejects_second_send() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("first").unwrap();
        let err = s.begin("second").unwrap_err();
        assert!(matches!(err, ChatError::SessionBusy));
        // The rejected prompt was not recorded.
        assert_eq!(s.messages().len(), 1);
    }

    #[test]
    fn send_allowed_again_after_completion() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("first").unwrap();
        s.process_chunk(b"data: one\n");
        s.complete(&Ok(()));

        s.begin("second").unwrap();
        s.process_chunk(b"data: two\n");
        s.complete(&Ok(()));

        let contents: Vec<&str> = s.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "one", "second", "two"]);
        assert!(s.messages().iter().all(|m| !m.is_accumulating()));
    }

    #[test]
    fn cancel_is_idempotent_after_completion() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("hi").unwrap();
        s.process_chunk(b"data: done\n");
        s.complete(&Ok(()));

        let snapshot = s.messages().to_vec();
        s.cancel();
        s.cancel();
        assert_eq!(s.messages(), snapshot.as_slice());
        assert_eq!(s.status(), SessionStatus::Idle);
    }

    #[test]
    fn cancel_finalizes_accumulating_message() {
        let (mut s, _viewport) = session_with_viewport();
        s.begin("hi").unwrap();
        s.process_chunk(b"data: partial reply\n");
        s.cancel();

        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(!s.is_loading());
        assert_eq!(s.messages()[1].content, "partial reply");
        assert_eq!(s.messages()[1].state, MessageState::Finalized);
    }

    #[test]
    fn handle_signals_current_token() {
        let (s, _viewport) = session_with_viewport();
        let handle = s.handle();
        assert!(!handle.is_cancelled());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(s.cancel.is_cancelled());
    }

    #[test]
    fn stale_handle_does_not_poison_next_send() {
        let (mut s, _viewport) = session_with_viewport();
        let stale = s.handle();
        s.begin("first").unwrap();
        s.complete(&Ok(()));
        stale.cancel();
        // The token was rotated at completion; the session is unaffected.
        assert!(!s.cancel.is_cancelled());
        s.begin("second").unwrap();
        assert!(s.is_loading());
    }

    #[test]
    fn cancelled_mid_stream_drops_pending_tail() {
        let (mut s, viewport) = session_with_viewport();
        s.begin("hi").unwrap();
        s.process_chunk(b"data: shown\ndata: half a li");
        s.handle().cancel();
        s.complete(&Ok(()));

        assert_eq!(s.messages()[1].content, "shown");
        assert!(viewport.flights.lock().unwrap().is_empty());
    }

    #[test]
    fn status_display() {
        assert_eq!(SessionStatus::Idle.to_string(), "idle");
        assert_eq!(SessionStatus::Streaming.to_string(), "streaming");
        assert_eq!(SessionStatus::Failed.to_string(), "failed");
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::envelope::Envelope;
use crate::application::messages;
use crate::client::form::{FormModel, SubmitCheck};

/// How long a result banner stays on screen.
pub const BANNER_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// The transient result message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub hide_at: Instant,
}

impl Banner {
    fn show(kind: BannerKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hide_at: Instant::now() + BANNER_DURATION,
        }
    }

    pub fn is_visible(&self) -> bool {
        Instant::now() < self.hide_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Blocked { focus: String },
    /// Another submission from this client has not finished yet.
    AlreadyInFlight,
    /// The server stored the application; the form has been reset.
    Accepted { id: Option<i64>, banner: Banner },
    /// The server answered with a failure envelope.
    Rejected { envelope: Envelope, banner: Banner },
    /// No usable answer: network failure or a body that is not an envelope.
    ConnectionFailed { banner: Banner },
}

impl SubmitOutcome {
    pub fn banner(&self) -> Option<&Banner> {
        match self {
            SubmitOutcome::Accepted { banner, .. }
            | SubmitOutcome::Rejected { banner, .. }
            | SubmitOutcome::ConnectionFailed { banner } => Some(banner),
            SubmitOutcome::Blocked { .. } | SubmitOutcome::AlreadyInFlight => None,
        }
    }
}

/// Posts validated forms to the intake endpoint and interprets the envelope.
///
/// One submission at a time: a second attempt while the first is still waiting
/// for its response is refused instead of being sent twice.
pub struct FormClient {
    http: Client,
    endpoint: String,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the submission ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FormClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_http(http, endpoint))
    }

    pub fn with_http(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(&self, form: &mut FormModel) -> SubmitOutcome {
        if let SubmitCheck::Invalid { focus } = form.on_submit() {
            return SubmitOutcome::Blocked { focus };
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Submission ignored: previous request still pending");
            return SubmitOutcome::AlreadyInFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        match self.post(&form.serialize()).await {
            Ok(envelope) if envelope.success => {
                form.reset();
                SubmitOutcome::Accepted {
                    id: envelope.id,
                    banner: Banner::show(BannerKind::Success, messages::FORM_SUBMITTED),
                }
            }
            Ok(envelope) => {
                let text = envelope.message.joined();
                let message = if text.is_empty() {
                    messages::SUBMISSION_FAILED.to_string()
                } else {
                    text
                };
                SubmitOutcome::Rejected {
                    banner: Banner::show(BannerKind::Error, message),
                    envelope,
                }
            }
            Err(e) => {
                warn!("Form submission failed: {e}");
                SubmitOutcome::ConnectionFailed {
                    banner: Banner::show(BannerKind::Error, messages::CONNECTION_FAILED),
                }
            }
        }
    }

    async fn post(&self, pairs: &[(String, String)]) -> Result<Envelope, ClientError> {
        let envelope = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(pairs)
            .send()
            .await?
            .json::<Envelope>()
            .await?;
        Ok(envelope)
    }
}

//! Pre-send gateway: the per-send glue around the guard.
//!
//! For each send attempt the gateway runs the guard, asks the confirmation
//! surface when the guard did not allow the send outright, and records a log
//! entry carrying the final action. If any of that fails, a fallback entry is
//! recorded and the user decides whether the original text goes out.

use chrono::Utc;
use sm_common::{Action, GuardResult, GuardSettings, PreSendContext};
use sm_guard::GuardEngine;
use sm_telemetry::{GuardLogEntry, LogFile, LogStore, LogStoreConfig, LogStoreError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::confirm::{ConfirmRequest, ConfirmationSurface};

/// Errors that abort the normal gateway flow.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("guard log unavailable: {0}")]
    Log(#[from] LogStoreError),

    #[error("confirmation failed: {0}")]
    Confirm(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Destination for gateway log entries.
pub trait LogSink {
    fn append(&mut self, entry: GuardLogEntry) -> std::result::Result<(), LogStoreError>;
}

/// In-memory only; nothing outlives the process.
impl LogSink for LogStore {
    fn append(&mut self, entry: GuardLogEntry) -> std::result::Result<(), LogStoreError> {
        self.add(entry);
        Ok(())
    }
}

/// Log store backed by a file, loaded on first use and saved on every append.
#[derive(Debug)]
pub struct PersistentLog {
    file: LogFile,
    config: LogStoreConfig,
    store: Option<LogStore>,
}

impl PersistentLog {
    pub fn new(file: LogFile, config: LogStoreConfig) -> Self {
        Self {
            file,
            config,
            store: None,
        }
    }

    pub fn file(&self) -> &LogFile {
        &self.file
    }
}

impl LogSink for PersistentLog {
    fn append(&mut self, entry: GuardLogEntry) -> std::result::Result<(), LogStoreError> {
        let store = match self.store.take() {
            Some(store) => store,
            None => self.file.open_store(self.config)?,
        };
        let store = self.store.insert(store);
        store.add(entry);
        self.file.persist(store)
    }
}

/// How a send attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The guard does not cover this send; the original text goes out unchecked.
    PassThrough { text: String },
    /// The masked text goes out. `confirmed` is set when the user approved it.
    Sent { result: GuardResult, confirmed: bool },
    /// Nothing goes out.
    Blocked { result: GuardResult },
    /// The gateway failed; the user chose whether the original text goes out.
    Fallback {
        original: String,
        sent: bool,
        message: String,
    },
}

impl SendOutcome {
    /// Text that is actually sent, if any.
    pub fn sent_text(&self) -> Option<&str> {
        match self {
            SendOutcome::PassThrough { text } => Some(text),
            SendOutcome::Sent { result, .. } => Some(&result.masked_text),
            SendOutcome::Blocked { .. } => None,
            SendOutcome::Fallback { original, sent, .. } => sent.then_some(original.as_str()),
        }
    }

    /// Action after the confirmation step.
    pub fn final_action(&self) -> Action {
        match self {
            SendOutcome::PassThrough { .. } | SendOutcome::Sent { .. } => Action::Allow,
            SendOutcome::Blocked { .. } => Action::Block,
            SendOutcome::Fallback { sent: true, .. } => Action::Allow,
            SendOutcome::Fallback { sent: false, .. } => Action::Block,
        }
    }

    /// Whether the user had to approve the send.
    pub fn was_confirmed(&self) -> bool {
        matches!(
            self,
            SendOutcome::Sent {
                confirmed: true,
                ..
            } | SendOutcome::Fallback { sent: true, .. }
        )
    }

    pub fn result(&self) -> Option<&GuardResult> {
        match self {
            SendOutcome::Sent { result, .. } | SendOutcome::Blocked { result } => Some(result),
            SendOutcome::PassThrough { .. } | SendOutcome::Fallback { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SendOutcome::PassThrough { .. } => "pass_through",
            SendOutcome::Sent { .. } => "sent",
            SendOutcome::Blocked { .. } => "blocked",
            SendOutcome::Fallback { .. } => "fallback",
        }
    }
}

/// Gateway bound to one settings snapshot.
#[derive(Debug, Clone)]
pub struct PreSendGateway {
    settings: GuardSettings,
    engine: GuardEngine,
}

impl PreSendGateway {
    pub fn new(settings: GuardSettings) -> Self {
        let engine = GuardEngine::new(settings.rule_policies.clone());
        Self { settings, engine }
    }

    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    /// Whether the guard runs for this context at all.
    pub fn covers(&self, context: &PreSendContext) -> bool {
        self.settings.enabled && self.settings.is_site_allowed(&context.site)
    }

    /// Handle one send attempt. Never fails; faults end in [`SendOutcome::Fallback`].
    pub fn run(
        &self,
        context: &PreSendContext,
        surface: &mut dyn ConfirmationSurface,
        log: &mut dyn LogSink,
    ) -> SendOutcome {
        if !self.covers(context) {
            debug!(
                site = %context.site,
                enabled = self.settings.enabled,
                "send not covered by guard"
            );
            return SendOutcome::PassThrough {
                text: context.raw_text.clone(),
            };
        }

        match self.try_run(context, surface, log) {
            Ok(outcome) => outcome,
            Err(err) => self.fallback(context, surface, log, err),
        }
    }

    fn try_run(
        &self,
        context: &PreSendContext,
        surface: &mut dyn ConfirmationSurface,
        log: &mut dyn LogSink,
    ) -> Result<SendOutcome> {
        let result = self.engine.evaluate(context);

        let confirmed = if result.action.is_allow() {
            false
        } else {
            surface.confirm(&ConfirmRequest::Risk(&result))?
        };

        let final_action = if result.action.is_allow() || confirmed {
            Action::Allow
        } else {
            Action::Block
        };

        debug!(
            site = %context.site,
            proposed = %result.action,
            final_action = %final_action,
            hits = result.hits.len(),
            "send attempt resolved"
        );

        log.append(GuardLogEntry::from_result(
            context,
            final_action,
            &result,
            Utc::now(),
        ))?;

        Ok(match final_action {
            Action::Block => SendOutcome::Blocked { result },
            Action::Allow | Action::Confirm => SendOutcome::Sent { result, confirmed },
        })
    }

    fn fallback(
        &self,
        context: &PreSendContext,
        surface: &mut dyn ConfirmationSurface,
        log: &mut dyn LogSink,
        err: GatewayError,
    ) -> SendOutcome {
        let message = err.to_string();
        warn!(
            site = %context.site,
            error = %message,
            "gateway failed; asking before sending original text"
        );

        let entry = GuardLogEntry::fallback(&context.site, context.trigger, &message, Utc::now());
        if let Err(log_err) = log.append(entry) {
            warn!(error = %log_err, "fallback log entry not recorded");
        }

        let sent = match surface.confirm(&ConfirmRequest::Fallback { message: &message }) {
            Ok(answer) => answer,
            Err(confirm_err) => {
                warn!(error = %confirm_err, "fallback confirmation failed; not sending");
                false
            }
        };

        SendOutcome::Fallback {
            original: context.raw_text.clone(),
            sent,
            message,
        }
    }
}

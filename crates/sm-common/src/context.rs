//! Per-send-attempt context supplied by the input capture layer.

use serde::{Deserialize, Serialize};

/// How the user attempted to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendTrigger {
    Enter,
    CtrlEnter,
    ButtonClick,
    Submit,
    Programmatic,
    /// The capture layer could not classify the send; treated as elevated risk.
    Unknown,
}

impl SendTrigger {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SendTrigger::Unknown)
    }
}

impl std::fmt::Display for SendTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SendTrigger::Enter => "enter",
            SendTrigger::CtrlEnter => "ctrl_enter",
            SendTrigger::ButtonClick => "button_click",
            SendTrigger::Submit => "submit",
            SendTrigger::Programmatic => "programmatic",
            SendTrigger::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SendTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "enter" => Ok(SendTrigger::Enter),
            "ctrl_enter" => Ok(SendTrigger::CtrlEnter),
            "button_click" | "click" => Ok(SendTrigger::ButtonClick),
            "submit" => Ok(SendTrigger::Submit),
            "programmatic" => Ok(SendTrigger::Programmatic),
            "unknown" => Ok(SendTrigger::Unknown),
            _ => Err(format!("unknown send trigger: {}", s)),
        }
    }
}

/// Kind of editable element the text was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    #[default]
    Textarea,
    Contenteditable,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Textarea => write!(f, "textarea"),
            InputKind::Contenteditable => write!(f, "contenteditable"),
        }
    }
}

impl std::str::FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "textarea" => Ok(InputKind::Textarea),
            "contenteditable" => Ok(InputKind::Contenteditable),
            _ => Err(format!("unknown input kind: {}", s)),
        }
    }
}

/// Immutable snapshot of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreSendContext {
    pub site: String,
    pub trigger: SendTrigger,
    /// An input method composition is still in progress.
    pub is_composing: bool,
    pub raw_text: String,
    pub input_kind: InputKind,
}

impl PreSendContext {
    /// Context for a finalized textarea send.
    pub fn new(site: impl Into<String>, trigger: SendTrigger, raw_text: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            trigger,
            is_composing: false,
            raw_text: raw_text.into(),
            input_kind: InputKind::Textarea,
        }
    }

    pub fn composing(mut self, is_composing: bool) -> Self {
        self.is_composing = is_composing;
        self
    }

    pub fn with_input_kind(mut self, input_kind: InputKind) -> Self {
        self.input_kind = input_kind;
        self
    }
}

//! Confirmation surfaces.
//!
//! A surface is whatever asks the user whether a risky send should go out.
//! The gateway only asks when the guard did not allow the send outright, and
//! once more when the gateway itself failed.

use std::io::{self, BufRead, Write};

use sm_common::{Action, GuardResult};

const FALLBACK_PROMPT: &str = "SentinelMask could not finish checking this message. \
Send the original text anyway?\nTip: check it for sensitive data first.";

/// What the user is being asked to approve.
#[derive(Debug, Clone, Copy)]
pub enum ConfirmRequest<'a> {
    /// Send the masked text despite a `confirm` or `block` verdict.
    Risk(&'a GuardResult),
    /// Send the original text after the gateway could not finish checking it.
    Fallback { message: &'a str },
}

impl ConfirmRequest<'_> {
    /// Prompt text shown to the user.
    pub fn prompt(&self) -> String {
        match self {
            ConfirmRequest::Risk(result) => {
                let prefix = if result.action == Action::Block {
                    "High-risk sensitive data detected."
                } else {
                    "Medium-risk sensitive data detected."
                };
                format!(
                    "{}\nHits: {}\nSend the masked text anyway?",
                    prefix,
                    result.hit_summary()
                )
            }
            ConfirmRequest::Fallback { .. } => FALLBACK_PROMPT.to_string(),
        }
    }
}

/// Asks the user to approve a send.
pub trait ConfirmationSurface {
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> io::Result<bool>;
}

/// Non-interactive surface with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoDecision(pub bool);

impl ConfirmationSurface for AutoDecision {
    fn confirm(&mut self, _request: &ConfirmRequest<'_>) -> io::Result<bool> {
        Ok(self.0)
    }
}

/// Line-oriented y/N prompt.
///
/// Anything other than `y` or `yes` (including end of input) is a no.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, answer from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ConfirmationSurface for TerminalPrompt<R, W> {
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> io::Result<bool> {
        write!(self.output, "{} [y/N] ", request.prompt())?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_common::{Category, HitSummary, ReasonCode, RiskLevel, Source};
    use std::io::Cursor;

    fn result(action: Action) -> GuardResult {
        let hit = |category: Category| HitSummary {
            category,
            source: Source::Builtin,
            risk_level: RiskLevel::Medium,
        };
        GuardResult {
            masked_text: String::new(),
            risk_level: RiskLevel::Medium,
            action,
            hits: vec![hit(Category::Phone), hit(Category::Email), hit(Category::Phone)],
            warnings: Vec::new(),
            reason_code: ReasonCode::None,
        }
    }

    #[test]
    fn test_risk_prompt_prefix_depends_on_action() {
        let block = result(Action::Block);
        let confirm = result(Action::Confirm);

        let text = ConfirmRequest::Risk(&block).prompt();
        assert!(text.starts_with("High-risk"));
        assert!(text.contains("Hits: phone:2, email:1"));

        assert!(ConfirmRequest::Risk(&confirm).prompt().starts_with("Medium-risk"));
    }

    #[test]
    fn test_fallback_prompt_mentions_original_text() {
        let text = ConfirmRequest::Fallback { message: "x" }.prompt();
        assert!(text.contains("original text"));
    }

    #[test]
    fn test_auto_decision() {
        let result = result(Action::Confirm);
        let request = ConfirmRequest::Risk(&result);
        assert!(AutoDecision(true).confirm(&request).unwrap());
        assert!(!AutoDecision(false).confirm(&request).unwrap());
    }

    #[test]
    fn test_terminal_prompt_answers() {
        let result = result(Action::Confirm);
        let request = ConfirmRequest::Risk(&result);

        let cases = [
            ("y\n", true),
            ("YES\n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
        ];
        for (input, expected) in cases {
            let mut prompt = TerminalPrompt::new(Cursor::new(input), Vec::new());
            assert_eq!(prompt.confirm(&request).unwrap(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_terminal_prompt_writes_question() {
        let result = result(Action::Block);
        let mut prompt = TerminalPrompt::new(Cursor::new("y\n"), Vec::new());
        prompt.confirm(&ConfirmRequest::Risk(&result)).unwrap();

        let written = String::from_utf8(prompt.into_output()).unwrap();
        assert!(written.contains("High-risk sensitive data detected."));
        assert!(written.ends_with("[y/N] "));
    }
}

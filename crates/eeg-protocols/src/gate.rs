//! # Operator Gates
//!
//! A [`Gate`] blocks a protocol until the experimenter signals that the next
//! phase may begin. The answer text is returned so protocols that need a
//! label (the resting-state condition) can use it; others ignore it.
//!
//! A gate reports an operator abort as [`ProtocolError::Interrupted`].

use crate::error::{ProtocolError, ProtocolResult};

/// Wait-for-signal rendezvous between experimenter and protocol.
#[allow(async_fn_in_trait)]
pub trait Gate {
    /// Show `prompt` and wait for the operator's answer.
    async fn wait(&mut self, prompt: &str) -> ProtocolResult<String>;
}

impl<G: Gate + ?Sized> Gate for &mut G {
    async fn wait(&mut self, prompt: &str) -> ProtocolResult<String> {
        (**self).wait(prompt).await
    }
}

/// Ask for a condition label, re-prompting on blank answers and on labels
/// that cannot be part of a file name.
///
/// Labels are not checked against [`Condition`]'s known codes.
pub async fn wait_for_condition<G: Gate + ?Sized>(
    gate: &mut G,
    prompt: &str,
) -> ProtocolResult<String> {
    loop {
        let answer = gate.wait(prompt).await?;
        let label = answer.trim();
        if label.is_empty() {
            tracing::debug!("Blank condition label, asking again");
        } else if !is_file_name_safe(label) {
            tracing::warn!(label, "Condition label contains a path separator, asking again");
        } else {
            return Ok(label.to_string());
        }
    }
}

/// The label ends up inside a recording's file name.
fn is_file_name_safe(label: &str) -> bool {
    !label.contains(['/', '\\', '\0'])
}

/// Conventional resting-state condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    EyesOpen,
    EyesClosed,
}

impl Condition {
    /// Recognise `o` / `c` (case-insensitive).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "o" => Some(Condition::EyesOpen),
            "c" => Some(Condition::EyesClosed),
            _ => None,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Condition::EyesOpen => "eyes open",
            Condition::EyesClosed => "eyes closed",
        }
    }

    /// Human description of a free-form label, for log lines.
    #[must_use]
    pub fn describe(label: &str) -> &str {
        Self::from_code(label).map_or(label, |c| c.description())
    }
}

/// Gate fed from a fixed list of answers; aborts once the list runs out.
///
/// Useful for unattended runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGate {
    answers: std::collections::VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedGate {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Gate for ScriptedGate {
    async fn wait(&mut self, prompt: &str) -> ProtocolResult<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(ProtocolError::Interrupted)
    }
}

//! Terminal implementation of the operator prompt.

use crate::cli::OutputManager;
use crate::error::{CliError, Result};
use crate::workflow::{ConflictReport, OperatorPrompt, ResumeDecision};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Asks the operator on stdin/stdout
pub struct TerminalPrompt {
    output: OutputManager,
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalPrompt {
    /// Prompt writing through `output`
    pub fn new(output: OutputManager) -> Self {
        Self {
            output,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, question: &str) -> Result<String> {
        self.output
            .prompt(question)
            .and_then(|()| std::io::stdout().flush())
            .map_err(|e| CliError::InputFailed {
                reason: e.to_string(),
            })?;

        match self.lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim().to_string()),
            Ok(None) => Err(CliError::InputFailed {
                reason: "standard input closed".to_string(),
            }
            .into()),
            Err(e) => Err(CliError::InputFailed {
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Ask a yes/no question; anything but y/yes is no
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]:", question)).await?;
        Ok(parse_yes(&answer))
    }
}

impl std::fmt::Debug for TerminalPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPrompt").finish_non_exhaustive()
    }
}

impl OperatorPrompt for TerminalPrompt {
    async fn version(&mut self, default: Option<&str>) -> Result<String> {
        loop {
            let question = match default {
                Some(default) => format!("Version to release [{}]:", default),
                None => "Version to release:".to_string(),
            };
            let answer = self.ask(&question).await?;
            match (answer.is_empty(), default) {
                (false, _) => return Ok(answer),
                (true, Some(default)) => return Ok(default.to_string()),
                (true, None) => {
                    let _ = self.output.warn("A version is required");
                }
            }
        }
    }

    async fn resolve_conflict(
        &mut self,
        report: &ConflictReport,
        unresolved_attempt: bool,
    ) -> Result<ResumeDecision> {
        if unresolved_attempt {
            let _ = self
                .output
                .warn("The merge is not concluded yet:");
        } else {
            let _ = self.output.section("Merge conflict");
        }
        for line in report.format_report().lines() {
            let _ = self.output.indent(line);
        }
        let _ = self.output.println(
            "Resolve the conflicts in another terminal, stage them and run `git commit --no-edit`.",
        );

        loop {
            let answer = self.ask("Type 'continue' when done or 'abort' to roll back:").await?;
            match parse_decision(&answer) {
                Some(decision) => return Ok(decision),
                None => {
                    let _ = self.output.warn("Please answer 'continue' or 'abort'");
                }
            }
        }
    }
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

fn parse_decision(answer: &str) -> Option<ResumeDecision> {
    match answer.to_lowercase().as_str() {
        "c" | "continue" | "y" | "yes" => Some(ResumeDecision::Continue),
        "a" | "abort" | "n" | "no" => Some(ResumeDecision::Abort),
        _ => None,
    }
}

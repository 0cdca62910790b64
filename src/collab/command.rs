//! External-program collaborator
//!
//! Delegates extraction and narrative to a user-configured program. The
//! program receives the mode and mime type as its last two arguments and the
//! document (or the narrative digest as JSON) on stdin; whatever it prints on
//! stdout is taken as the model reply.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::ai::{
    parse_expense_payload, parse_project_payload, DocumentExtractor, ExtractedExpense,
    ExtractedProject, FinancialNarrator,
};
use crate::services::aggregation::NarrativeInput;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct CommandCollaborator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCollaborator {
    /// Build from a command line such as `"python3 extract.py --model pro"`
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, mode: &str, mime_type: &str, input: &[u8]) -> Result<String, String> {
        info!(program = %self.program, mode, mime_type, size = input.len(), "invoking collaborator");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(mode)
            .arg(mime_type)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.program, e))?;

        // Feed stdin while draining stdout, under one deadline. On expiry the
        // child is dropped, which kills it.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(input).await {
                    debug!(error = %e, "collaborator closed its input early");
                }
            }
        };
        let exchange = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let output = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| format!("{} timed out after {:?}", self.program, self.timeout))?
            .map_err(|e| format!("failed to read output: {}", e))?;

        if !output.status.success() {
            return Err(format!("{} exited with {}", self.program, output.status));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = text.len(), "collaborator replied");
        Ok(text)
    }
}

#[async_trait]
impl DocumentExtractor for CommandCollaborator {
    async fn extract_project_from_document(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Option<ExtractedProject> {
        match self.run("project-document", mime_type, bytes).await {
            Ok(reply) => parse_project_payload(&reply),
            Err(e) => {
                warn!(error = %e, "document extraction failed");
                None
            }
        }
    }

    async fn extract_expense_from_receipt(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Option<ExtractedExpense> {
        match self.run("receipt", mime_type, bytes).await {
            Ok(reply) => parse_expense_payload(&reply),
            Err(e) => {
                warn!(error = %e, "receipt extraction failed");
                None
            }
        }
    }
}

#[async_trait]
impl FinancialNarrator for CommandCollaborator {
    async fn summarize_financials(&self, input: &NarrativeInput) -> Result<String, String> {
        let payload = serde_json::to_vec_pretty(input).map_err(|e| e.to_string())?;
        self.run("narrative", "application/json", &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let collab = CommandCollaborator::from_command_line("python3 extract.py --fast").unwrap();
        assert_eq!(collab.program, "python3");
        assert_eq!(collab.args, vec!["extract.py", "--fast"]);
        assert!(CommandCollaborator::from_command_line("   ").is_none());
    }

    #[tokio::test]
    async fn test_missing_program_yields_none() {
        let collab =
            CommandCollaborator::from_command_line("siteledger-no-such-extractor-binary").unwrap();
        assert!(collab
            .extract_expense_from_receipt(b"receipt", "image/png")
            .await
            .is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_output_is_parsed() {
        // sh -c <script> <mode> <mime>: mode and mime land in $0 and $1
        let collab = CommandCollaborator {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                r#"cat > /dev/null; printf '{"description":"Sand","amount":45,"category":"Material"}'"#
                    .into(),
            ],
            timeout: Duration::from_secs(10),
        };

        let expense = collab
            .extract_expense_from_receipt(b"ignored", "text/plain")
            .await
            .unwrap();
        assert_eq!(expense.description, "Sand");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_covers_unread_input() {
        // never reads stdin, so a large document fills the pipe
        let collab = CommandCollaborator {
            program: "sh".into(),
            args: vec!["-c".into(), "sleep 6".into()],
            timeout: Duration::from_secs(1),
        };
        let document = vec![b'x'; 1024 * 1024];

        let started = std::time::Instant::now();
        let expense = collab
            .extract_expense_from_receipt(&document, "image/png")
            .await;

        assert!(expense.is_none());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_narrator_timeout_is_an_error() {
        let collab = CommandCollaborator {
            program: "sh".into(),
            args: vec!["-c".into(), "sleep 6".into()],
            timeout: Duration::from_millis(200),
        };
        let input = NarrativeInput { projects: Vec::new() };

        let err = collab.summarize_financials(&input).await.unwrap_err();
        assert!(err.contains("timed out"));
    }
}

//! Append-only audit trail
//!
//! Two plain-text files: authentication events and the request trail. Writes
//! are fire-and-forget; a failing write is logged at debug level and dropped,
//! never surfaced to the caller.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{SecondsFormat, Utc};
use reqwest::Method;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

/// Authentication events file name
pub const SECURITY_LOG: &str = "api_security.log";

/// Request trail file name
pub const REQUEST_LOG: &str = "api_requests.log";

/// Authentication events recorded in the security log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoginSuccess,
    LoginFailed,
    LoginError,
    TokenAuthSuccess,
    TokenAuthFailed,
    Logout,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::LoginSuccess => "LOGIN_SUCCESS",
            AuthEvent::LoginFailed => "LOGIN_FAILED",
            AuthEvent::LoginError => "LOGIN_ERROR",
            AuthEvent::TokenAuthSuccess => "TOKEN_AUTH_SUCCESS",
            AuthEvent::TokenAuthFailed => "TOKEN_AUTH_FAILED",
            AuthEvent::Logout => "LOGOUT",
        }
    }
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Collapse line breaks so one record is always one line.
fn single_line(field: &str) -> String {
    field
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<ts> - <EVENT> - User: <actor> - <detail>`
pub fn format_auth_line(ts: &str, event: AuthEvent, actor: &str, detail: &str) -> String {
    format!(
        "{} - {} - User: {} - {}\n",
        ts,
        event,
        single_line(actor),
        single_line(detail)
    )
}

/// `<ts> - <METHOD> <endpoint> - <status> - User: <actor> - <detail>`
pub fn format_request_line(
    ts: &str,
    method: &Method,
    endpoint: &str,
    status: u16,
    actor: &str,
    detail: &str,
) -> String {
    format!(
        "{} - {} {} - {} - User: {} - {}\n",
        ts,
        method,
        single_line(endpoint),
        status,
        single_line(actor),
        single_line(detail)
    )
}

#[derive(Debug)]
enum WriterCommand {
    Append { path: PathBuf, line: String },
    Flush(oneshot::Sender<()>),
}

/// Writer for the two audit files.
///
/// Inside a tokio runtime every line goes through one background writer
/// task, so each file receives lines in the order they were recorded.
#[derive(Debug, Default)]
pub struct AuditLogger {
    dir: Option<PathBuf>,
    /// Started on the first write made inside a runtime
    writer: OnceLock<mpsc::UnboundedSender<WriterCommand>>,
}

impl AuditLogger {
    /// Log into `dir`; files are created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            writer: OnceLock::new(),
        }
    }

    /// A logger that records nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn security_log_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(SECURITY_LOG))
    }

    pub fn request_log_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(REQUEST_LOG))
    }

    pub fn record_auth_event(&self, event: AuthEvent, actor: &str, detail: &str) {
        if let Some(path) = self.security_log_path() {
            self.append(path, format_auth_line(&timestamp(), event, actor, detail));
        }
    }

    /// Record one HTTP exchange; `status` is 0 when no response arrived.
    pub fn record_request(
        &self,
        method: &Method,
        endpoint: &str,
        status: u16,
        actor: &str,
        detail: &str,
    ) {
        if let Some(path) = self.request_log_path() {
            self.append(
                path,
                format_request_line(&timestamp(), method, endpoint, status, actor, detail),
            );
        }
    }

    /// Wait until every line recorded so far is written. Used before
    /// process exit.
    pub async fn flush(&self) {
        let Some(writer) = self.writer.get() else {
            return;
        };
        let (done, written) = oneshot::channel();
        if writer.send(WriterCommand::Flush(done)).is_ok() {
            let _ = written.await;
        }
    }

    fn writer(&self) -> Option<&mpsc::UnboundedSender<WriterCommand>> {
        if let Some(writer) = self.writer.get() {
            return Some(writer);
        }
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        Some(self.writer.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            runtime.spawn(run_writer(rx));
            tx
        }))
    }

    fn append(&self, path: PathBuf, line: String) {
        let command = WriterCommand::Append { path, line };
        let command = match self.writer() {
            Some(writer) => match writer.send(command) {
                Ok(()) => return,
                // Writer's runtime is gone
                Err(mpsc::error::SendError(command)) => command,
            },
            None => command,
        };

        if let WriterCommand::Append { path, line } = command
            && let Err(e) = append_blocking(&path, &line)
        {
            log::debug!("Audit write to {} failed: {}", path.display(), e);
        }
    }
}

async fn run_writer(mut commands: mpsc::UnboundedReceiver<WriterCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            WriterCommand::Append { path, line } => {
                if let Err(e) = append_async(&path, &line).await {
                    log::debug!("Audit write to {} failed: {}", path.display(), e);
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn append_async(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

fn append_blocking(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(line.as_bytes())
}

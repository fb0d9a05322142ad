//! Desktop mail client hand-off.
//!
//! On Windows the drafted email is opened as an editable Outlook draft
//! through COM automation, driven by a spawned PowerShell process. The draft
//! is displayed, never sent. On other platforms the integration reports
//! itself unavailable and callers fall back to printing the draft.

use tracing::debug;

/// Errors from the mail client hand-off.
#[derive(Debug, thiserror::Error)]
pub enum MailClientError {
    /// No supported desktop mail client on this platform.
    #[error("mail client integration unavailable: {0}")]
    Unavailable(String),
    /// The automation process could not be spawned or awaited.
    #[error("failed to run mail client automation: {0}")]
    Spawn(#[from] std::io::Error),
    /// The automation process ran but reported failure.
    #[error("mail client automation exited with an error: {0}")]
    Automation(String),
}

/// Open an editable draft addressed to `to` in the desktop mail client.
///
/// # Errors
///
/// Returns [`MailClientError::Unavailable`] on non-Windows platforms, and
/// spawn/automation errors when the Outlook hand-off fails on Windows.
#[cfg(windows)]
pub async fn open_draft(to: &str, subject: &str, body: &str) -> Result<(), MailClientError> {
    // Values cross into PowerShell via environment variables so no quoting
    // or escaping of user-controlled text happens in the script itself.
    const SCRIPT: &str = r"
        $outlook = New-Object -ComObject Outlook.Application
        $mail = $outlook.CreateItem(0)
        $mail.To = $env:DRAFTSMITH_TO
        $mail.Subject = $env:DRAFTSMITH_SUBJECT
        $mail.Body = $env:DRAFTSMITH_BODY
        $mail.Display()
    ";

    debug!(to, "opening Outlook draft");
    let output = tokio::process::Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", SCRIPT])
        .env("DRAFTSMITH_TO", to)
        .env("DRAFTSMITH_SUBJECT", subject)
        .env("DRAFTSMITH_BODY", body)
        .output()
        .await?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        Err(MailClientError::Automation(if stderr.is_empty() {
            format!("exit status {}", output.status)
        } else {
            stderr
        }))
    }
}

/// Open an editable draft addressed to `to` in the desktop mail client.
///
/// # Errors
///
/// Always returns [`MailClientError::Unavailable`] on this platform.
#[cfg(not(windows))]
pub async fn open_draft(to: &str, _subject: &str, _body: &str) -> Result<(), MailClientError> {
    debug!(to, "no desktop mail client integration on this platform");
    Err(MailClientError::Unavailable(
        "Outlook automation requires Windows".to_owned(),
    ))
}

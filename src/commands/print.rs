use folio::application::{admin::AdminOrchestrator, error::AppError};
use serde::Serialize;
use tokio::time::Instant;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::unexpected(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}

/// Surface the orchestrator's pending notifications on stderr.
pub fn flush_notifications(admin: &mut AdminOrchestrator) {
    let now = Instant::now();
    let notifications = admin.notifications();
    notifications.active(now);
    for notification in notifications.drain() {
        eprintln!("{}: {}", notification.kind.as_str(), notification.text);
    }
}

// ABOUTME: Time-boxed yes/no confirmation read from stdin.
// ABOUTME: No answer within the window means no.

use std::io::BufRead;
use std::time::Duration;

use tracing::debug;

/// Ask for confirmation on stdin, waiting at most `window` for an answer.
/// Only a literal `yes` (case-insensitive) confirms; anything else,
/// including silence, declines.
pub async fn confirm(question: &str, window: Duration) -> bool {
    println!("{question} [yes/no] (auto-no in {}s)", window.as_secs());

    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        Some(line)
    });

    match tokio::time::timeout(window, read).await {
        Ok(Ok(Some(answer))) => answer.trim().eq_ignore_ascii_case("yes"),
        Ok(_) => false,
        Err(_) => {
            // The blocking read stays parked on stdin; it is abandoned, not
            // cancelled, and exits with the process.
            debug!("confirmation window elapsed without an answer");
            false
        }
    }
}

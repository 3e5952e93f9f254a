//! Readiness polling: wait until uploaded files leave `PROCESSING`.
//!
//! ## State machine
//!
//! ```text
//!            query
//!   ┌──────────────────────┐
//!   │                      ▼
//! sleep ◀── PROCESSING ── state ──▶ ACTIVE   → next file / done
//!                          │
//!                          └──────▶ other    → ProcessingFailed
//! ```
//!
//! The first query is issued immediately. Each further query is preceded by
//! one `policy.interval` sleep on the injected [`Clock`], so a file observed
//! as `[PROCESSING, PROCESSING, ACTIVE]` costs three queries and two sleeps.
//! With the default [`PollPolicy`] the loop has no cap; a cap, when set, ends
//! the wait with [`TranscribeError::PollTimeout`].

use crate::clock::Clock;
use crate::config::PollPolicy;
use crate::error::TranscribeError;
use crate::progress::ProgressCallback;
use crate::service::{DocumentService, FileHandle, FileState};
use std::time::Duration;
use tracing::{debug, info};

/// A file that reached `ACTIVE`, with the number of state queries it took.
#[derive(Debug, Clone)]
pub struct ReadyFile {
    pub handle: FileHandle,
    pub attempts: u32,
}

/// Wait for every handle in `files`, in order. Stops at the first failure.
pub async fn wait_for_files_active(
    service: &dyn DocumentService,
    files: &[FileHandle],
    policy: &PollPolicy,
    clock: &dyn Clock,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<ReadyFile>, TranscribeError> {
    let mut ready = Vec::with_capacity(files.len());
    for file in files {
        ready.push(wait_for_file_active(service, &file.name, policy, clock, progress).await?);
    }
    info!("All {} file(s) ready", ready.len());
    Ok(ready)
}

/// Wait for the file called `name` to become `ACTIVE`.
pub async fn wait_for_file_active(
    service: &dyn DocumentService,
    name: &str,
    policy: &PollPolicy,
    clock: &dyn Clock,
    progress: Option<&ProgressCallback>,
) -> Result<ReadyFile, TranscribeError> {
    let mut attempts: u32 = 0;
    let mut waited = Duration::ZERO;

    loop {
        let handle = service.get_file(name).await?;
        attempts += 1;
        debug!("{}: state {} (query {})", name, handle.state, attempts);

        if let Some(cb) = progress {
            cb.on_poll(attempts, &handle.state);
        }

        match handle.state {
            FileState::Processing => {}
            FileState::Active => {
                if let Some(cb) = progress {
                    cb.on_ready(&handle);
                }
                return Ok(ReadyFile { handle, attempts });
            }
            FileState::Failed(state) => {
                return Err(TranscribeError::ProcessingFailed {
                    name: handle.name,
                    state,
                });
            }
        }

        if !policy.allows_another(attempts, waited) {
            return Err(TranscribeError::PollTimeout {
                name: name.to_string(),
                attempts,
                waited_secs: waited.as_secs(),
            });
        }

        clock.sleep(policy.interval).await;
        waited = waited.saturating_add(policy.interval);
    }
}

//! Startup orchestration.

/// Raise the open-file soft limit to the hard limit.
///
/// Each live session costs a socket plus pooled backend connections, so the
/// default soft limit caps the bridge far below its intended scale. Failure
/// is logged, not fatal: the bridge still runs, just smaller.
#[cfg(unix)]
pub fn raise_open_file_limit() {
    use rlimit::Resource;

    match Resource::NOFILE.get() {
        Ok((soft, hard)) if soft < hard => match Resource::NOFILE.set(hard, hard) {
            Ok(()) => tracing::info!(soft = hard, hard, "raised open file limit"),
            Err(err) => tracing::warn!(%err, "could not raise open file limit"),
        },
        Ok((soft, hard)) => {
            tracing::debug!(soft, hard, "open file limit already at maximum");
        }
        Err(err) => tracing::warn!(%err, "could not read open file limit"),
    }
}

#[cfg(not(unix))]
pub fn raise_open_file_limit() {}

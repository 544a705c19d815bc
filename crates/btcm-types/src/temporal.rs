use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock seconds since the UNIX epoch.
///
/// A clock set before 1970 reads as zero rather than failing.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static DEBUG_FROM_ENV: OnceLock<bool> = OnceLock::new();
static DEBUG_FORCED: AtomicBool = AtomicBool::new(false);

pub(crate) fn debug_enabled() -> bool {
    DEBUG_FORCED.load(Ordering::Relaxed) || debug_from_env()
}

fn debug_from_env() -> bool {
    *DEBUG_FROM_ENV.get_or_init(|| {
        std::env::var("VANSAH_DEBUG")
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or(false)
    })
}

/// Forces debug output on, e.g. when `[logging] debug = true` is configured.
pub fn enable_debug() {
    DEBUG_FORCED.store(true, Ordering::Relaxed);
}

pub(crate) fn parse_flag(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes"
}

fn ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn debug(message: impl AsRef<str>) {
    if debug_enabled() {
        eprintln!("[{}][vansah][DEBUG] {}", ts(), message.as_ref());
    }
}

pub fn info(message: impl AsRef<str>) {
    eprintln!("[{}][vansah][INFO] {}", ts(), message.as_ref());
}

pub fn warn(message: impl AsRef<str>) {
    eprintln!("[{}][vansah][WARN] {}", ts(), message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("[{}][vansah][ERROR] {}", ts(), message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::{debug, debug_enabled, enable_debug, parse_flag};

    #[test]
    fn parses_truthy_flags() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("on"));
    }

    #[test]
    fn enable_debug_applies_after_env_flag_was_read() {
        debug("reads the env flag first");
        enable_debug();
        assert!(debug_enabled());
    }
}

//! Crash reports for panics

use backtrace::Backtrace;
use chrono::{DateTime, Local};
use std::panic::PanicHookInfo;
use std::path::PathBuf;

pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let report = crash_report(info, Local::now(), &Backtrace::new());

        // stderr first: the subscriber may already be torn down
        eprintln!("{}", report);
        tracing::error!("{}", report);

        let dump_path = dump_path(Local::now());
        match std::fs::write(&dump_path, &report) {
            Ok(()) => eprintln!("Crash report written to {}", dump_path.display()),
            Err(e) => eprintln!("Failed to write crash report: {}", e),
        }
    }));
    tracing::debug!("Panic hook initialized");
}

fn payload_text(info: &PanicHookInfo) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<unknown>".to_string()
    }
}

fn crash_report(info: &PanicHookInfo, at: DateTime<Local>, backtrace: &Backtrace) -> String {
    let thread = std::thread::current();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    format!(
        "=== gala {} crashed ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{:?}",
        env!("CARGO_PKG_VERSION"),
        at.to_rfc3339(),
        thread.name().unwrap_or("<unnamed>"),
        location,
        payload_text(info),
        backtrace
    )
}

fn dump_path(at: DateTime<Local>) -> PathBuf {
    std::env::temp_dir().join(format!("gala_crash_{}.txt", at.format("%Y%m%d_%H%M%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dump_path_is_timestamped() {
        let at = Local.with_ymd_and_hms(2026, 10, 17, 8, 30, 5).unwrap();
        let path = dump_path(at);
        assert_eq!(path.file_name().unwrap(), "gala_crash_20261017_083005.txt");
        assert!(path.starts_with(std::env::temp_dir()));
    }
}

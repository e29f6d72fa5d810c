//! Gala logging and crash reporting
//!
//! Console and JSON file logging, a crash report panic hook, and a lock
//! watchdog for debug builds.

mod logging;
mod panic_hook;

pub use logging::{cleanup_old_logs, init_logging};
pub use panic_hook::init_panic_hook;
pub use tracing_appender::non_blocking::WorkerGuard;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Directory holding the rolling log files
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("org", "gala", "gala")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Set up logging, the panic hook and (in debug builds) the lock watchdog
///
/// The returned guard flushes the file writer on drop; keep it alive in `main`.
pub fn init() -> anyhow::Result<WorkerGuard> {
    let guard = init_logging(&log_dir())?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    spawn_lock_watchdog()?;

    Ok(guard)
}

/// Periodically report parking_lot deadlocks, e.g. on the mutation lock
#[cfg(debug_assertions)]
fn spawn_lock_watchdog() -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    const INTERVAL: Duration = Duration::from_secs(10);

    thread::Builder::new()
        .name("gala-lock-watchdog".into())
        .spawn(|| loop {
            thread::sleep(INTERVAL);

            let cycles = parking_lot::deadlock::check_deadlock();
            for (cycle, threads) in cycles.iter().enumerate() {
                tracing::error!(cycle, threads = threads.len(), "Deadlock detected");
                for t in threads {
                    tracing::error!(
                        cycle,
                        thread_id = ?t.thread_id(),
                        "Deadlocked thread:\n{:?}",
                        t.backtrace()
                    );
                }
            }
        })?;

    Ok(())
}

//! # Logging Initialization
//!
//! `init_logging()` installs the global `tracing` subscriber once per process.
//!
//! - **Filter**: `RUST_LOG` wins when set. Otherwise dependencies log at `warn`
//!   and this tool plus `xmpp_api_client` log at the requested level.
//! - **Stderr (default)**: ANSI colours on, so diagnostics never mix with the
//!   command output printed on stdout.
//! - **File (opt-in)**: a daily rolling file in the platform cache directory,
//!   without colours. Falls back to stderr when that directory cannot be
//!   determined or written.

use anyhow::Result;
use directories::ProjectDirs;
use std::{io::stderr, path::Path, sync::Once};
use tracing_subscriber::{EnvFilter, fmt::layer, prelude::*};

static INIT: Once = Once::new();

const LOG_FILE_PREFIX: &str = "xmpp-api.log";

pub fn init_logging(log_level: &str, log_to_file: bool) -> Result<()> {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,xmpp_api_client={log_level},xmpp_api_cli={log_level}"
            ))
        });

        if log_to_file
            && let Some(proj_dirs) = ProjectDirs::from("org", "XmppApi", "xmpp-api")
            && can_write(proj_dirs.cache_dir())
        {
            let file_appender = tracing_appender::rolling::daily(proj_dirs.cache_dir(), LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer().with_writer(non_blocking).with_ansi(false))
                .init();
            // Flushes on drop; kept alive for the whole process.
            Box::leak(Box::new(guard));
            return;
        }

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer().with_writer(stderr).with_ansi(true))
            .init();
    });

    Ok(())
}

/// `tracing_appender::rolling::daily` panics on permission errors, so probe first.
fn can_write(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }

    let probe = dir.join(".xmpp_api_log_test");
    match std::fs::write(&probe, "test") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

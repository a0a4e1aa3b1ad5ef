use std::io::Write;

use flexi_logger::{Cleanup, Criterion, DeferredNow, FileSpec, Logger, Naming};
use log::Record;

use chat_widget::config::{LogTarget, LoggingConfig};

/// Sends log output to rotating files; stdout belongs to the transcript.
pub fn init_logging(config: &LoggingConfig, target: &LogTarget) -> anyhow::Result<()> {
    let spec = FileSpec::default()
        .directory(&target.directory)
        .basename(&target.basename);
    Logger::try_with_env_or_str(&config.level)?
        .log_to_file(spec)
        .format(format_log_line)
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        )
        .start()?;
    log::info!(
        "logging to {}/{}.log",
        target.directory.display(),
        target.basename
    );
    Ok(())
}

fn format_log_line(
    out: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        out,
        "[{}][{}][{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.module_path().unwrap_or_else(|| record.target()),
        record.args()
    )
}

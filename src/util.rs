use env_logger::Builder;
use std::io::Write;

/// Initialize `env_logger` once, with a format that includes file:line.
/// Call once near the start of a binary or test; harmless (if wasteful)
/// to call more than once since `env_logger` ignores repeated `init`
/// calls after the first.
pub fn init_log() {
    let mut builder = Builder::from_default_env();
    let _ = builder
        .format_timestamp_secs()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} - {}] [{}:{}] {}",
                record.level(),
                record.target(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}

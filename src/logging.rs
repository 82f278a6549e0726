use std::io::Write;

use env_logger::WriteStyle;
use log::LevelFilter;

/// Installs a global logger for the crate's diagnostics. Safe to call more than once.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "[SMC | {}] {}", record.level(), record.args()))
        .write_style(WriteStyle::Always)
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .try_init()
}

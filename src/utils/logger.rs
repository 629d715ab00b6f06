use colored::Colorize;
use env_logger::Builder;
use log::Level;
use std::io::Write;

/// Install the global logger. Safe to call more than once; later calls are ignored.
pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let thread = std::thread::current();
                    let origin = thread.name().unwrap_or("main").white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, origin, record.args())
                }
                Level::Debug | Level::Trace => {
                    let thread = std::thread::current();
                    let origin = thread.name().unwrap_or("main").dimmed();
                    format!("[{} {}] {}", name.cyan(), origin, record.args())
                }
                Level::Info => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}

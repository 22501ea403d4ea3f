//! Example demonstrating the Lingo logging infrastructure.

use lingo_common_log::spans::{catalog_span, locale_span};
use lingo_common_log::{debug, error, info, init, timed, trace, warn, LogConfig, LogFormat, LogLevel};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Testing JSON Format with File Output ===");
    let log_path = std::env::temp_dir().join("lingo-test.log");
    let config = LogConfig {
        level: LogLevel::Debug,
        format: LogFormat::Json,
        file_path: Some(PathBuf::from(&log_path)),
        timestamps: true,
        source_location: true,
        span_events: false,
    };

    init(config)?;

    let locale = locale_span("zh_CN");
    let _locale = locale.enter();
    let catalog = catalog_span("read", "translations/RedPandaIDE_zh_CN.ts");
    let _catalog = catalog.enter();

    // Test all log levels
    trace!("This is a trace message (should not appear with Debug level)");
    debug!("This is a debug message");
    info!(entries = 1204, "activated translation catalog");
    warn!("keeping previous catalog");
    error!("This is an error message");

    let total = timed!("sum", (1..=10).sum::<u32>());
    info!(total, "timed block finished");

    println!("\n=== Environment-based Configuration Demo ===");
    let env_config = LogConfig::from_env();
    println!("Environment config: {:?}", env_config);

    println!("\nLog file should be created at: {}", log_path.display());

    Ok(())
}

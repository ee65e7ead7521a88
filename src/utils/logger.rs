use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. serialport is kept at `warn`
/// unless verbose, so enumeration noise stays out of the shell.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "arduino_driver=debug,serialport=debug,info"
    } else {
        "arduino_driver=info,serialport=warn"
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(EnvFilter::try_new(directives).is_ok(), "{}", directives);
            assert!(directives.contains("serialport="));
        }
        assert!(default_directives(true).contains("arduino_driver=debug"));
        assert!(default_directives(false).contains("arduino_driver=info"));
    }
}

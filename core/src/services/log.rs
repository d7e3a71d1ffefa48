use tracing_subscriber::EnvFilter;

/// Pick the default filter directive for the given logging toggle.
pub fn default_directive(enabled: bool) -> &'static str {
    if enabled {
        "info"
    } else {
        "warn"
    }
}

/// Install the global fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the toggle. Calling this twice is
/// harmless; the second installation is ignored.
pub fn init(enabled: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(enabled)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_maps_to_level() {
        assert_eq!(default_directive(true), "info");
        assert_eq!(default_directive(false), "warn");
    }

    #[test]
    fn init_is_idempotent() {
        init(true);
        init(false);
        tracing::info!("still alive");
    }
}

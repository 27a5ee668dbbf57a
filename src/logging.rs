use tracing::level_filters::LevelFilter;

/// Logs go to stderr. `--total` silences them so the bare score is the only
/// thing printed.
pub fn level(debug: bool, total_only: bool) -> LevelFilter {
    if total_only {
        LevelFilter::OFF
    } else if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

pub fn init(debug: bool, total_only: bool) {
    tracing_subscriber::fmt()
        .with_max_level(level(debug, total_only))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_silences_even_debug() {
        assert_eq!(level(true, true), LevelFilter::OFF);
        assert_eq!(level(true, false), LevelFilter::DEBUG);
        assert_eq!(level(false, false), LevelFilter::INFO);
    }
}

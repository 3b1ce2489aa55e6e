pub mod build_info;

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "tally=info";

static INSTALLED_FILTER: OnceCell<String> = OnceCell::new();

/// `RUST_LOG`, then the crate default, then `directive` when given.
/// Directives that fail to parse are reported and skipped.
pub fn env_filter(directive: Option<&str>) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    for raw in std::iter::once(DEFAULT_DIRECTIVE).chain(directive) {
        match raw.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(err) => eprintln!("ignoring log directive `{raw}`: {err}"),
        }
    }
    filter
}

/// Installs the global fmt subscriber. Only the first call has an effect.
pub fn init_tracing(directive: Option<&str>) {
    INSTALLED_FILTER.get_or_init(|| {
        let filter = env_filter(directive);
        let rendered = filter.to_string();
        let _ = fmt().with_env_filter(filter).try_init();
        rendered
    });
}

/// The filter the global subscriber was installed with, if any.
pub fn installed_filter() -> Option<&'static str> {
    INSTALLED_FILTER.get().map(String::as_str)
}

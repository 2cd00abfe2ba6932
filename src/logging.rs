// Log filter for the binary. `RUST_LOG` wins for everything except the
// crate's own level under `--verbose`, which always shows payloads and
// responses.

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "mio_resource_importer=warn,reqwest=warn,hyper=warn";

fn verbose_directive() -> Directive {
    // Static text, parsing cannot fail.
    "mio_resource_importer=debug"
        .parse()
        .unwrap_or_else(|_| Directive::from(LevelFilter::DEBUG))
}

/// Filter built from `rust_log` (the value of `RUST_LOG`, if any) and the
/// verbose flag.
pub fn env_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = match rust_log {
        Some(spec) => EnvFilter::try_new(spec).unwrap_or_else(|e| {
            println!("Ignoring invalid RUST_LOG '{}': {}", spec, e);
            EnvFilter::new(DEFAULT_DIRECTIVES)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    };
    if verbose {
        filter.add_directive(verbose_directive())
    } else {
        filter
    }
}

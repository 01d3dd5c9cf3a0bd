use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceCell<()> = OnceCell::new();

const DEFAULT_DIRECTIVES: &[&str] = &["quotewatch=info", "tungstenite=warn", "tokio_tungstenite=warn"];

/// `RUST_LOG` wins over the defaults. Safe to call more than once.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let mut filter = EnvFilter::from_default_env();
        for directive in DEFAULT_DIRECTIVES {
            match directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(error) => eprintln!("ignoring log directive {directive}: {error}"),
            }
        }

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .try_init();

        if let Err(error) = installed {
            eprintln!("logging already initialised elsewhere: {error}");
        }
    });
}

//! Tracing setup for the command line tools
//!
//! `RUST_LOG` always wins when it is set. Otherwise the filter comes from
//! the `-v` count given on the command line:
//!
//! | flags  | filter                                         |
//! |--------|------------------------------------------------|
//! | none   | `rustyrx=info`                                 |
//! | `-v`   | `rustyrx=debug`                                |
//! | `-vv`  | `rustyrx=debug,rustyrx::correlator=trace`      |
//! | `-vvv` | `rustyrx=trace` (per-sample loop state)        |

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    Debug,
    Detector,
    Trace,
}

impl Verbosity {
    /// Map a repeated `-v` count onto a level, saturating at `Trace`
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Debug,
            2 => Verbosity::Detector,
            _ => Verbosity::Trace,
        }
    }

    pub fn directives(self) -> &'static str {
        match self {
            Verbosity::Normal => "rustyrx=info",
            Verbosity::Debug => "rustyrx=debug",
            Verbosity::Detector => "rustyrx=debug,rustyrx::correlator=trace",
            Verbosity::Trace => "rustyrx=trace",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }
}

/// Install the global subscriber. Call once, early in `main()`.
pub fn init_tracing(verbosity: Verbosity) {
    fmt()
        .with_env_filter(verbosity.filter())
        .with_target(true)
        .with_line_number(verbosity >= Verbosity::Detector)
        .init();
}

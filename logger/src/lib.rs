//! Log backend selection.
//!
//! Binaries call [`init_logger!`] once at startup. Exactly one backend is
//! installed; when several features are enabled `env` wins over `simple`,
//! which wins over `sys`. Output goes to stderr so it never mixes with a
//! terminal display drawn on stdout.

const DEFAULT_LEVEL: log::LevelFilter = log::LevelFilter::Info;

#[cfg(feature = "env")]
pub mod env {
    #[macro_export]
    macro_rules! init_logger {
        () => {{
            let (logger, level) = $crate::env::create_logger();
            $crate::install(logger, level);
        }};
    }

    /// Filtering follows `RUST_LOG`, `info` when unset. Returns the logger
    /// with the most verbose level it lets through.
    pub fn create_logger() -> (Box<dyn log::Log>, log::LevelFilter) {
        let logger = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(super::DEFAULT_LEVEL.as_str()),
        )
        .target(env_logger::Target::Stderr)
        .build();
        let level = logger.filter();
        (Box::new(logger), level)
    }

}

#[cfg(all(feature = "simple", not(feature = "env")))]
pub mod simple {
    #[macro_export]
    macro_rules! init_logger {
        () => {{
            let (logger, level) = $crate::simple::create_logger();
            $crate::install(logger, level);
        }};
    }

    pub fn create_logger() -> (Box<dyn log::Log>, log::LevelFilter) {
        let logger = simplelog::TermLogger::new(
            super::DEFAULT_LEVEL,
            simplelog::Config::default(),
            simplelog::TerminalMode::Stderr,
            simplelog::ColorChoice::Auto,
        );
        (logger, super::DEFAULT_LEVEL)
    }
}

#[cfg(all(feature = "sys", not(any(feature = "env", feature = "simple"))))]
pub mod sys {
    #[macro_export]
    macro_rules! init_logger {
        () => {
            $crate::sys::create_logger();
        };
    }

    pub fn create_logger() {
        use syslog::Facility;

        syslog::init(Facility::LOG_USER, super::DEFAULT_LEVEL, None).expect("init logger");
    }
}

/// Installs `logger` as the global logger.
///
/// Panics if a logger was already installed.
pub fn install(logger: Box<dyn log::Log>, level: log::LevelFilter) {
    log::set_boxed_logger(logger).expect("logger already installed");
    log::set_max_level(level);
}

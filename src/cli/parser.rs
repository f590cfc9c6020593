//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all arguments and their documentation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::DispatchMode;

// Include shadow-rs generated build information
use shadow_rs::shadow;
shadow!(build);

/// Send a short notification through Pushover or email
#[derive(Parser, Debug)]
#[command(name = "sendnotify")]
#[command(about = "Send a short notification through Pushover or email")]
#[command(long_about = "
sendnotify delivers a one-line notification through the services listed in
the configuration file (~/.sendnotification by default). With --interval,
identical notifications are suppressed until the interval has passed.

EXAMPLES:
    # Notify every enabled service
    sendnotify \"Backup finished\"

    # Read the message from stdin
    df -h / | tail -1 | sendnotify

    # At most one identical alert per hour
    sendnotify --interval 3600 \"Disk almost full\"

    # Only email, overriding the configured subject
    sendnotify --backend email --subject \"Disk alert\" \"Disk almost full\"

    # No configuration file at all
    sendnotify --no-config -b pushover -F app_token=A -F api_key=K \"hi\"

    # Show what would be sent without sending
    sendnotify --dry-run \"test\"

EXIT STATUS:
    0  delivered, or suppressed
    1  other error (bad arguments, empty message)
    2  configuration error
    3  every backend failed
    4  some backends failed
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Notification text
    ///
    /// Read from stdin when omitted. Surrounding whitespace is trimmed and
    /// the result must not be empty.
    #[arg(value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Suppress identical notifications for this many seconds
    ///
    /// A notification is identical when message, backend and fields all
    /// match. 0 disables suppression.
    #[arg(short, long, value_name = "SECONDS", value_parser = super::validation::validate_interval)]
    pub interval: Option<u64>,

    /// Send only through this backend
    ///
    /// The backend must be configured but need not be enabled.
    ///
    /// Available backends: pushover, email
    #[arg(short, long, value_name = "NAME", value_parser = super::validation::validate_backend_name)]
    pub backend: Option<String>,

    /// Pushover notification title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Email subject
    #[arg(long, value_name = "SUBJECT")]
    pub subject: Option<String>,

    /// Email recipient(s), comma separated
    #[arg(long, value_name = "ADDRESS")]
    pub to: Option<String>,

    /// Email sender
    #[arg(long, value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Override any backend field for this send
    ///
    /// May be repeated. Takes precedence over the configuration file; the
    /// dedicated flags (--title, --subject, ...) take precedence over it.
    ///
    /// Example: -F app_token=abc -F api_key=xyz
    #[arg(short = 'F', long = "field", value_name = "KEY=VALUE", value_parser = super::validation::validate_field)]
    pub fields: Vec<(String, String)>,

    /// Configuration file path
    ///
    /// JSON, or TOML when the name ends in .toml. Defaults to
    /// $SENDNOTIFY_CONFIG_FILE, then ~/.sendnotification.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Do not read a configuration file
    ///
    /// Requires --backend; all backend fields come from the command line.
    #[arg(long, conflicts_with = "config", requires = "backend")]
    pub no_config: bool,

    /// How to walk the enabled backends
    ///
    /// fan-out tries every backend, failover stops at the first success.
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Resolve configuration and print the plan without sending
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level.
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    ///
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level override
    ///
    /// Overrides the configuration file and --verbose/--quiet.
    ///
    /// Available levels: error, warn, info, debug, trace
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Dispatch mode options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    #[value(name = "fan-out", alias = "fan_out")]
    FanOut,
    #[value(name = "failover")]
    Failover,
}

/// Log level options
#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Field overrides from the command line, later entries winning
    ///
    /// `-F` pairs come first so the dedicated flags override them.
    pub fn field_overrides(&self) -> Vec<(String, String)> {
        let named = [
            ("title", &self.title),
            ("subject", &self.subject),
            ("to", &self.to),
            ("sender", &self.sender),
        ];

        self.fields
            .iter()
            .cloned()
            .chain(
                named
                    .into_iter()
                    .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v))),
            )
            .collect()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Mode> for DispatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::FanOut => DispatchMode::FanOut,
            Mode::Failover => DispatchMode::Failover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let result = Cli::try_parse_from(["sendnotify", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["sendnotify", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["sendnotify"]).unwrap();
        assert!(cli.message.is_none());
        assert!(cli.interval.is_none());
        assert!(cli.backend.is_none());
        assert!(cli.fields.is_empty());
        assert!(!cli.no_config);
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "sendnotify",
            "-i",
            "60",
            "-b",
            "pushover",
            "--title",
            "Backup",
            "-F",
            "api_key=K",
            "--mode",
            "failover",
            "disk full",
        ])
        .unwrap();

        assert_eq!(cli.message.as_deref(), Some("disk full"));
        assert_eq!(cli.interval, Some(60));
        assert_eq!(cli.backend.as_deref(), Some("pushover"));
        assert_eq!(cli.mode, Some(Mode::Failover));
        assert_eq!(
            cli.field_overrides(),
            vec![
                ("api_key".to_string(), "K".to_string()),
                ("title".to_string(), "Backup".to_string()),
            ]
        );
    }

    #[test]
    fn test_named_flags_win_over_fields() {
        let cli = Cli::try_parse_from([
            "sendnotify",
            "-F",
            "subject=from field",
            "--subject",
            "from flag",
            "hi",
        ])
        .unwrap();

        let overrides: std::collections::BTreeMap<_, _> =
            cli.field_overrides().into_iter().collect();
        assert_eq!(overrides["subject"], "from flag");
    }

    #[test]
    fn test_invalid_backend_rejected() {
        assert!(Cli::try_parse_from(["sendnotify", "-b", "sms", "hi"]).is_err());
    }

    #[test]
    fn test_invalid_interval_rejected() {
        assert!(Cli::try_parse_from(["sendnotify", "-i", "soon", "hi"]).is_err());
    }

    #[test]
    fn test_no_config_requires_backend() {
        assert!(Cli::try_parse_from(["sendnotify", "--no-config", "hi"]).is_err());
        assert!(Cli::try_parse_from(["sendnotify", "--no-config", "-b", "email", "hi"]).is_ok());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["sendnotify", "-v", "-q", "hi"]).is_err());
    }

    #[test]
    fn test_mode_conversion() {
        assert_eq!(DispatchMode::from(Mode::FanOut), DispatchMode::FanOut);
        assert_eq!(DispatchMode::from(Mode::Failover), DispatchMode::Failover);
    }
}

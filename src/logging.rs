//! Diagnostic logging via `tracing`.
//!
//! Diagnostics always go to stderr so they never mix with command output.
//! The level follows the global flags of the invocation; `M365_LOG`
//! overrides it with a full `EnvFilter` directive.

use tracing_subscriber::EnvFilter;

use crate::options::{DEBUG, VERBOSE};

pub const LOG_ENV: &str = "M365_LOG";

/// Filter level implied by the invocation tokens.
///
/// The subscriber has to exist before the command's own parser runs, so
/// this reads the global flags with the same literal rules: `--flag`,
/// `--flag=true` and `--flag true` turn a flag on, anything else leaves it
/// off.
pub fn level_from_tokens<S: AsRef<str>>(tokens: &[S]) -> &'static str {
    if flag_enabled(tokens, DEBUG) {
        "debug"
    } else if flag_enabled(tokens, VERBOSE) {
        "info"
    } else {
        "warn"
    }
}

fn flag_enabled<S: AsRef<str>>(tokens: &[S], flag: &str) -> bool {
    let mut iter = tokens.iter().map(<S as AsRef<str>>::as_ref).peekable();
    while let Some(token) = iter.next() {
        let Some(rest) = token.strip_prefix("--") else {
            continue;
        };
        match rest.split_once('=') {
            Some((name, value)) if name == flag => return value == "true",
            None if rest == flag => {
                return match iter.next_if(|next| !next.starts_with('-')) {
                    Some(value) => value == "true",
                    None => true,
                };
            }
            _ => {}
        }
    }
    false
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_verbose() {
        assert_eq!(level_from_tokens(&["--verbose", "--debug"]), "debug");
        assert_eq!(level_from_tokens(&["spo", "app", "list", "--verbose"]), "info");
        assert_eq!(level_from_tokens(&["spo", "app", "list"]), "warn");
        assert_eq!(level_from_tokens(&["--debugger"]), "warn");
    }

    #[test]
    fn explicit_flag_values_are_honoured() {
        assert_eq!(level_from_tokens(&["--debug=true"]), "debug");
        assert_eq!(level_from_tokens(&["--verbose=true"]), "info");
        assert_eq!(level_from_tokens(&["--debug", "true", "-i", "1"]), "debug");
        assert_eq!(level_from_tokens(&["--debug", "false"]), "warn");
        assert_eq!(level_from_tokens(&["--debug=false", "--verbose"]), "info");
        assert_eq!(level_from_tokens(&["--debug", "--verbose", "false"]), "debug");
        assert_eq!(level_from_tokens(&["--verbose", "-i", "1"]), "info");
    }
}

//! Minimal CLI parsing for the server and management commands.

use std::env;

/// What this invocation should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Run the HTTP server and job scheduler
    #[default]
    Serve,
    /// Delete download tokens past the holding period
    ExpireTokens,
    /// Delete video progress rows past the retention window
    ExpireVideoProgress,
    /// Trim old waiter status snapshots
    ExpireWaiterStatus,
    /// Populate posters for catalog entries missing metadata
    GeneratePosters,
    /// Insert development fixtures
    SeedData,
    /// Run the full maintenance sweep (all expiries plus a waiter check)
    Alfred,
}

impl Command {
    pub fn from_arg(value: &str) -> Option<Self> {
        match value {
            "serve" => Some(Command::Serve),
            "expiretokens" => Some(Command::ExpireTokens),
            "expirevideoprogress" => Some(Command::ExpireVideoProgress),
            "expirewaiterstatus" => Some(Command::ExpireWaiterStatus),
            "generateposters" => Some(Command::GeneratePosters),
            "seed-data" | "seed_data" => Some(Command::SeedData),
            "alfred" => Some(Command::Alfred),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CliOptions {
    pub command: Command,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    fn parse<I: Iterator<Item = String>>(args: I) -> Self {
        let mut options = CliOptions::default();
        for arg in args {
            if let Some(command) = Command::from_arg(&arg) {
                options.command = command;
            } else if arg == "--help" || arg == "-h" {
                print_usage();
                std::process::exit(0);
            }
        }
        options
    }
}

fn print_usage() {
    println!(
        "mediaviewer [COMMAND]\n\n\
         Commands:\n\
         \x20 serve                 Run the HTTP server (default)\n\
         \x20 expiretokens          Delete expired download tokens\n\
         \x20 expirevideoprogress   Delete stale video progress\n\
         \x20 expirewaiterstatus    Trim old waiter status snapshots\n\
         \x20 generateposters       Populate missing poster metadata\n\
         \x20 seed-data             Insert development fixtures\n\
         \x20 alfred                Run the full maintenance sweep"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_default_is_serve() {
        assert_eq!(parse(&[]).command, Command::Serve);
    }

    #[test]
    fn test_management_commands() {
        assert_eq!(parse(&["expiretokens"]).command, Command::ExpireTokens);
        assert_eq!(
            parse(&["expirevideoprogress"]).command,
            Command::ExpireVideoProgress
        );
        assert_eq!(parse(&["alfred"]).command, Command::Alfred);
    }

    #[test]
    fn test_seed_data_spellings() {
        assert_eq!(parse(&["seed-data"]).command, Command::SeedData);
        assert_eq!(parse(&["seed_data"]).command, Command::SeedData);
    }

    #[test]
    fn test_unknown_arg_keeps_default() {
        assert_eq!(parse(&["--verbose"]).command, Command::Serve);
    }
}

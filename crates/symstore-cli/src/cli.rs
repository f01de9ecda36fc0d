use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "symstore-meta",
    about = "Inspect the metadata of a symbol store (read-only)",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory of the symbol store
    #[arg(short, long, global = true, default_value = ".")]
    pub store: PathBuf,

    /// TOML file with reader settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of files loaded at once
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the live transaction log (server.txt)
    Server(LogArgs),
    /// Show the full transaction history (history.txt)
    History(LogArgs),
    /// Show the artifacts recorded for transactions
    Details(DetailsArgs),
    /// Show reference pointers and their entries
    Refs(RefsArgs),
    /// List refs.ptr files without parsing them
    Discover(DiscoverArgs),
}

#[derive(Args)]
pub struct LogArgs {
    /// Only show the most recent N transactions
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct DetailsArgs {
    /// Load a single transaction instead of all of them
    #[arg(long)]
    pub id: Option<u32>,
}

#[derive(Args)]
pub struct RefsArgs {
    /// Only show pointers for this symbol file name (ASCII case-insensitive)
    #[arg(long)]
    pub symbol: Option<String>,
}

#[derive(Args)]
pub struct DiscoverArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_server() {
        let cli = Cli::try_parse_from(["symstore-meta", "server"]).unwrap();
        assert!(matches!(cli.command, Command::Server(_)));
        assert_eq!(cli.store, PathBuf::from("."));
    }

    #[test]
    fn parse_history_with_limit() {
        let cli = Cli::try_parse_from(["symstore-meta", "history", "-n", "5"]).unwrap();
        if let Command::History(args) = cli.command {
            assert_eq!(args.limit, Some(5));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_details_by_id() {
        let cli = Cli::try_parse_from(["symstore-meta", "details", "--id", "42"]).unwrap();
        if let Command::Details(args) = cli.command {
            assert_eq!(args.id, Some(42));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_refs_with_symbol() {
        let cli = Cli::try_parse_from(["symstore-meta", "refs", "--symbol", "Foo.pdb"]).unwrap();
        if let Command::Refs(args) = cli.command {
            assert_eq!(args.symbol, Some("Foo.pdb".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "symstore-meta", "discover", "--store", "/srv/symbols", "-j", "4", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Discover(_)));
        assert_eq!(cli.store, PathBuf::from("/srv/symbols"));
        assert_eq!(cli.jobs, Some(4));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["symstore-meta", "--format", "json", "refs"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["symstore-meta", "details", "--id", "abc"]).is_err());
    }
}

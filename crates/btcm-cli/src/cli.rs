use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "btcm",
    about = "BTC-Mobile: hash-linked ledger with externalized payloads and off-chain settlement",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Node directory holding `chain.json`, `objects/` and `config.toml`
    #[arg(long, global = true, default_value = ".btcm")]
    pub dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a node directory with a genesis block
    Init(InitArgs),
    /// Append an on-chain transfer
    Transfer(TransferArgs),
    /// Settle a payment off-chain and record it on chain
    Pay(PayArgs),
    /// Print every block
    Show(ShowArgs),
    /// Audit chain integrity and payload availability
    Verify,
    /// Run the reference scenario against an in-memory node
    Demo,
}

#[derive(Args)]
pub struct InitArgs {
    /// TOML config (policy, genesis, gateway)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct TransferArgs {
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
    #[arg(long)]
    pub amount: u64,
}

#[derive(Args)]
pub struct PayArgs {
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
    #[arg(long)]
    pub amount: u64,
    #[arg(long, default_value = "")]
    pub memo: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Also fetch and print each block's payload
    #[arg(long)]
    pub payloads: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "btcm", "transfer", "--from", "a", "--to", "b", "--amount", "3", "--dir", "/tmp/n",
            "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp/n"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Transfer(ref t) if t.amount == 3));
    }

    #[test]
    fn negative_amount_is_refused() {
        assert!(Cli::try_parse_from(["btcm", "transfer", "--from", "a", "--to", "b", "--amount", "-1"]).is_err());
    }
}

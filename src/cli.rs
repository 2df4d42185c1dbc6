use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "explorer-relay",
    version,
    about = "REST relay in front of a GraphQL blockchain indexer"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override bind address, e.g. 0.0.0.0:8080
        #[arg(long)]
        addr: Option<String>,
    },
    /// Ask the indexer for its latest block height and exit
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_accepts_addr_override() {
        let cli = Cli::try_parse_from(["explorer-relay", "serve", "--addr", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, check::CheckArgs, lookup::LookupArgs, resolve::ResolveArgs, schema::ModelSchemaArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "formctl",
    about = "Inspect and resolve declarative form schemas",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log resolution details to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a form schema document
    Check(CheckArgs),
    /// Resolve the visible fields for a data model
    Resolve(ResolveArgs),
    /// Resolve a cascading option path to its labels
    Lookup(LookupArgs),
    /// Print the JSON schema of the data model accepted by the visible fields
    ModelSchema(ModelSchemaArgs),
    /// Print the JSON schema of form schema documents
    DocumentSchema,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Check(args) => cmd::check::run(&args),
        Commands::Resolve(args) => cmd::resolve::run(&args),
        Commands::Lookup(args) => cmd::lookup::run(&args),
        Commands::ModelSchema(args) => cmd::schema::run_model(&args),
        Commands::DocumentSchema => cmd::schema::run_document(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
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
    fn parses_resolve_with_overrides() {
        let cli = Cli::try_parse_from([
            "formctl",
            "resolve",
            "--schema",
            "form.json",
            "--set",
            "hobby=2",
            "--set",
            "hobbyName=\"soccer\"",
            "--json",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.schema, std::path::PathBuf::from("form.json"));
                assert_eq!(args.set.len(), 2);
                assert!(args.json);
                assert!(args.model.is_none());
            }
            _ => panic!("expected resolve args"),
        }
    }

    #[test]
    fn parses_lookup_path_segments() {
        let cli = Cli::try_parse_from([
            "formctl",
            "-v",
            "lookup",
            "--schema",
            "form.toml",
            "--field",
            "city",
            "湖北省",
            "武汉市",
        ])
        .expect("expected CLI to parse");
        assert!(cli.verbose);
        match cli.command {
            Commands::Lookup(args) => {
                assert_eq!(args.field, "city");
                assert_eq!(args.path, vec!["湖北省", "武汉市"]);
            }
            _ => panic!("expected lookup args"),
        }
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["formctl"]).is_err());
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about = "Tree-walking interpreter for a small Lox dialect")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a source file
    Run {
        /// Path to the source file
        file: PathBuf,
    },

    /// Check a source file for syntax errors and dump its tokens and AST
    Check {
        /// Path to the source file to check
        file: PathBuf,
    },

    /// Start an interactive REPL session (the default)
    Repl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommands() {
        let args = Args::try_parse_from(["loxwalk", "run", "script.lox"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Run { file }) if file == PathBuf::from("script.lox")
        ));

        let args = Args::try_parse_from(["loxwalk", "check", "script.lox"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Check { .. })));

        let args = Args::try_parse_from(["loxwalk"]).unwrap();
        assert!(args.command.is_none());

        assert!(Args::try_parse_from(["loxwalk", "run"]).is_err());
        assert!(Args::try_parse_from(["loxwalk", "run", "a.lox", "b.lox"]).is_err());
    }
}

use std::{
    fs,
    io::{IsTerminal, Read},
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mathml_semantics::{ParseError, PrettyPrint, SemanticTree};

mod config_file;

use config_file::{Config, ConfigError, load_config_file};

/// Builds semantic trees from presentation MathML
#[derive(Parser, Debug)]
#[command(version, about = "Builds semantic trees from presentation MathML", long_about = None)]
struct Args {
    /// The MathML file to read; "-" reads from stdin
    #[arg(conflicts_with = "formula", value_name = "FILE")]
    file: Option<PathBuf>,

    /// Specifies a single MathML formula
    #[arg(short, long, conflicts_with = "file")]
    formula: Option<String>,

    /// Reads options from a TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Leaves out the role, font and id attributes
    #[arg(long)]
    brief: bool,

    /// Adds newlines and indentation to the output
    #[arg(short, long)]
    pretty: bool,

    /// Checks the structural invariants of the tree before printing it
    #[arg(long)]
    verify: bool,

    /// Logs more details to stderr; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match args.config {
        Some(ref path) => load_config_file(path).unwrap_or_else(|e| exit_config_error(e, path)),
        None => Config::default(),
    };
    if args.brief {
        config.semantics.brief = true;
    }
    if args.pretty {
        config.semantics.pretty_print = PrettyPrint::Always;
    }
    debug!(?config, "resolved configuration");

    let (name, source) = match (&args.file, &args.formula) {
        (Some(path), _) if path != Path::new("-") => {
            let source = fs::read_to_string(path).unwrap_or_else(|e| exit_io_error(e));
            (path.display().to_string(), source)
        }
        (_, Some(formula)) => ("<formula>".to_string(), formula.clone()),
        _ => ("<stdin>".to_string(), read_stdin()),
    };

    let tree =
        SemanticTree::parse(&source).unwrap_or_else(|e| exit_parse_error(&e, &name, &source));
    if (args.verify || config.verify)
        && let Err(defect) = tree.verify()
    {
        eprintln!("Invalid semantic tree: {}", defect);
        std::process::exit(3);
    }
    println!("{}", tree.to_markup(&config.semantics));
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "mathml_semantics=debug",
        _ => "mathml_semantics=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
        exit_io_error(e);
    }
    buffer
}

fn exit_parse_error(e: &ParseError, name: &str, source: &str) -> ! {
    let with_color = std::io::stderr().is_terminal();
    let report = e.to_report(name, with_color);
    if report
        .eprint((name, ariadne::Source::from(source)))
        .is_err()
    {
        eprintln!("Parse error in '{}': {}", name, e);
    }
    std::process::exit(2);
}

fn exit_config_error(e: ConfigError, path: &Path) -> ! {
    eprintln!("Invalid configuration '{}': {}", path.display(), e);
    std::process::exit(1);
}

fn exit_io_error(e: std::io::Error) -> ! {
    eprintln!("IO Error: {}", e);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn counted_verbosity() {
        let args = Args::parse_from(["mathsem", "-vv", "--brief", "-f", "<math/>"]);
        assert_eq!(args.verbose, 2);
        assert!(args.brief);
        assert_eq!(args.formula.as_deref(), Some("<math/>"));
    }

    #[test]
    fn file_conflicts_with_formula() {
        let result = Args::try_parse_from(["mathsem", "input.xml", "-f", "<math/>"]);
        assert!(result.is_err());
    }
}

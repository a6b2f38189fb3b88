//! Command-line interface for vcfront
//! Tokenizes and parses VC sources with a data-driven automaton and grammar.
//!
//! Usage:
//!   vcfront tokens `<source>` [--pretty] [--json]   - Print the token stream
//!   vcfront parse `<source>` [--pretty]             - Print the derivation tree
//!   vcfront analyze                               - Print FIRST/FOLLOW sets and the table size
//!
//! Shared options: --automaton, --grammar, --config, --no-comments, --strict, -o/--output, -v

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use vcfront::analysis::GrammarAnalysis;
use vcfront::config::{FrontendConfig, COMMENT_KIND};
use vcfront::formats;
use vcfront::grammar::Grammar;
use vcfront::lexing::{LexError, Recovery};
use vcfront::table::ParseTable;
use vcfront::{Error, Frontend};

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let result = match matches.subcommand() {
        Some(("tokens", sub)) => handle_tokens_command(&config, &matches, sub),
        Some(("parse", sub)) => handle_parse_command(&config, &matches, sub),
        Some(("analyze", _)) => handle_analyze_command(&config),
        _ => Ok(()),
    };
    if let Err(e) = result {
        fail(&e);
    }
}

fn cli() -> Command {
    let source = Arg::new("source")
        .help("Path to the VC source file")
        .required(true)
        .index(1);
    let pretty = Arg::new("pretty")
        .long("pretty")
        .help("Human-readable output (verbose token report, indented tree)")
        .action(ArgAction::SetTrue);

    Command::new("vcfront")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Automaton-driven lexer and LL(1) parser for VC sources")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("automaton")
                .long("automaton")
                .help("Automaton description (JSON) [default: dfa.dat]")
                .global(true),
        )
        .arg(
            Arg::new("grammar")
                .long("grammar")
                .help("Grammar description [default: grammar.dat]")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("YAML run configuration")
                .global(true),
        )
        .arg(
            Arg::new("no-comments")
                .long("no-comments")
                .help("Drop COMMENT tokens from the token stream (always done for parse)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Stop at the first lexical error and fail")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Also write artifact files next to the source")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Enable debug logging on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("tokens")
                .about("Tokenize a source file")
                .arg(source.clone())
                .arg(pretty.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the token records as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Tokenize and parse a source file")
                .arg(source)
                .arg(pretty),
        )
        .subcommand(Command::new("analyze").about("Print FIRST/FOLLOW sets of the grammar"))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file values with command-line flags applied on top.
fn build_config(matches: &ArgMatches) -> Result<FrontendConfig, Error> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => FrontendConfig::load(Path::new(path))?,
        None => FrontendConfig::default(),
    };
    if let Some(path) = matches.get_one::<String>("automaton") {
        config.automaton = PathBuf::from(path);
    }
    if let Some(path) = matches.get_one::<String>("grammar") {
        config.grammar = PathBuf::from(path);
    }
    if matches.get_flag("no-comments") {
        config.lexer.drop_kind(COMMENT_KIND);
    }
    if matches.get_flag("strict") {
        config.lexer.recovery = Recovery::Halt;
    }
    Ok(config)
}

/// Handle the tokens command
fn handle_tokens_command(
    config: &FrontendConfig,
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Error> {
    let (path, source) = read_source(matches)?;
    let frontend = Frontend::from_config(config)?;
    let lexed = frontend.tokenize(&source);
    report_diagnostics(&lexed.diagnostics);

    if global.get_flag("output") {
        write_artifact(&path, "vctok", &formats::plain(&lexed.tokens))?;
        write_artifact(
            &path,
            "verbose.vctok",
            &formats::verbose(&lexed.tokens, frontend.automaton()),
        )?;
    }

    let pretty = matches.get_flag("pretty");
    if matches.get_flag("json") {
        println!("{}", formats::json(&lexed.tokens, pretty)?);
    } else if pretty {
        print!("{}", formats::verbose(&lexed.tokens, frontend.automaton()));
    } else {
        print!("{}", formats::plain(&lexed.tokens));
    }

    if frontend.lexer_config().recovery == Recovery::Halt && !lexed.is_clean() {
        return Err(Error::Lexical(lexed.diagnostics));
    }
    Ok(())
}

/// Handle the parse command
fn handle_parse_command(
    config: &FrontendConfig,
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Error> {
    let (path, source) = read_source(matches)?;
    let frontend = Frontend::from_config(&config.for_parsing())?;
    let output = frontend.run(&source)?;
    report_diagnostics(&output.diagnostics);

    if global.get_flag("output") {
        write_artifact(&path, "vctok", &formats::plain(&output.tokens))?;
        write_artifact(
            &path,
            "verbose.vctok",
            &formats::verbose(&output.tokens, frontend.automaton()),
        )?;
        write_artifact(&path, "vcps", &output.tree.to_bracketed())?;
    }

    if matches.get_flag("pretty") {
        print!("{}", output.tree.render_indented());
    } else {
        println!("{}", output.tree);
    }
    Ok(())
}

/// Handle the analyze command
fn handle_analyze_command(config: &FrontendConfig) -> Result<(), Error> {
    let text = std::fs::read_to_string(&config.grammar)
        .map_err(|e| Error::io(&config.grammar, e))?;
    let grammar = Grammar::parse(&text)?;
    let analysis = GrammarAnalysis::new(&grammar);

    println!("start symbol: {}", grammar.start());
    for (non_terminal, first) in analysis.first_sets() {
        println!("FIRST({non_terminal}) = {first}");
    }
    for (non_terminal, follow) in analysis.follow_sets() {
        println!("FOLLOW({non_terminal}) = {follow}");
    }

    let table = ParseTable::build(&grammar, &analysis)?;
    println!("parse table: {} cells, grammar is LL(1)", table.len());
    Ok(())
}

fn read_source(matches: &ArgMatches) -> Result<(PathBuf, String), Error> {
    let path = matches
        .get_one::<String>("source")
        .map(PathBuf::from)
        .unwrap_or_default();
    let source = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    Ok((path, source))
}

fn report_diagnostics(diagnostics: &[LexError]) {
    for diagnostic in diagnostics {
        eprintln!("lexical error: {diagnostic}");
    }
}

/// Write `<stem>.<extension>` next to the source file.
fn write_artifact(source: &Path, extension: &str, contents: &str) -> Result<(), Error> {
    let target = source.with_extension(extension);
    std::fs::write(&target, contents).map_err(|e| Error::io(&target, e))
}

fn fail(error: &Error) -> ! {
    match error {
        Error::GrammarConfig(conflicts) => {
            eprintln!("Error: grammar is not LL(1)");
            for conflict in conflicts.conflicts() {
                eprintln!("  {conflict}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
    process::exit(1);
}

// Command-line interface for qbank
//
// This binary converts question banks between formats and looks inside them.
//
// The core capabilities use the qbank-babel crate: every command starts by reading a bank
// through a registered format, so anything that can be converted can also be inspected,
// checked and searched.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension, while being overwrittable by an explicit --from flag.
// Usage:
//  qbank <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  qbank convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  qbank inspect <path> [<view>]          - Render a bank (defaults to "treeviz")
//  qbank check <path>                     - Validate every question
//  qbank find <path> [filters]            - List matching questions
//  qbank --list-formats                   - List available formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format serializer,
// on top of the values taken from the configuration.
// Example:
//  qbank bank.gift --to json --extra-embed-files --extra-pretty false

mod views;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use qbank_babel::FormatRegistry;
use qbank_config::{Loader, QbankConfig, PROJECT_FILE};
use qbank_core::model::Query;
use qbank_core::{Category, QuestionType};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "inspect", "check", "find", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with('-');

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn input_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .help("Source format (auto-detected from file extension if not specified)")
        .value_hint(ValueHint::Other)
}

fn build_cli() -> Command {
    Command::new("qbank")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and inspecting quiz question banks")
        .long_about(
            "qbank is a command-line tool for working with question bank files.\n\n\
            Commands:\n  \
            - convert: Transform between bank formats (GIFT, Aiken, cloze, JSON, ...)\n  \
            - inspect: Render a bank as a tree, tags, JSON or statistics\n  \
            - check:   Validate every question in a bank\n  \
            - find:    List the questions matching a set of filters\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Logging:\n  \
            Warnings go to stderr. The level comes from [logging] in the configuration\n  \
            and can be overridden with RUST_LOG.\n\n\
            Examples:\n  \
            qbank inspect bank.gift                    # Tree visualization\n  \
            qbank bank.gift --to json                  # Convert to JSON (outputs to stdout)\n  \
            qbank bank.aiken --to gift -o bank.gift    # Convert to a GIFT file",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a qbank.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between bank formats (default command)")
                .long_about(
                    "Convert question banks between formats.\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    Questions the target format cannot express are skipped with a warning.\n\n\
                    Examples:\n  \
                    qbank convert bank.gift --to aiken             # Convert to Aiken (stdout)\n  \
                    qbank convert bank.json --to gift -o out.gift  # JSON to GIFT file\n  \
                    qbank bank.gift --to json                      # 'convert' is optional",
                )
                .arg(input_arg("input", "Input file path"))
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Use the format name, not the file extension.\n\
                            Use --list-formats to see all options.",
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Render a question bank for reading")
                .long_about(
                    "View the structure of a question bank.\n\n\
                    Views:\n  \
                    - treeviz:  Tree visualization with icons (default)\n  \
                    - tag:      XML-like tags\n  \
                    - json:     Native JSON\n  \
                    - stats:    Category, question and per-type counts\n\n\
                    Examples:\n  \
                    qbank inspect bank.gift                          # Tree visualization\n  \
                    qbank inspect bank.gift tag --extra-full         # Tags with metadata\n  \
                    qbank inspect bank.json treeviz --extra-show-dbids",
                )
                .arg(input_arg("path", "Path to the bank file"))
                .arg(
                    Arg::new("view")
                        .help("View to render. Defaults to 'treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            views::AVAILABLE_VIEWS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(from_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Validate every question in a bank")
                .long_about(
                    "Runs the structural checks on every question (cloze markers match their\n\
                    option groups, true/false has one right answer, ...). Each failure is\n\
                    printed as '<category path>/<question>: <problem>'. The exit status is 1\n\
                    when any question fails.",
                )
                .arg(input_arg("path", "Path to the bank file"))
                .arg(from_arg()),
        )
        .subcommand(
            Command::new("find")
                .about("List questions matching all given filters")
                .arg(input_arg("path", "Path to the bank file"))
                .arg(from_arg())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .value_name("REGEX")
                        .help("Question name matches this regular expression"),
                )
                .arg(
                    Arg::new("body")
                        .long("body")
                        .value_name("REGEX")
                        .help("Question text matches this regular expression"),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .value_name("TAG")
                        .help("Question carries this tag (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TYPE")
                        .help("Question type, e.g. multichoice")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            views::question_type_names(),
                        )),
                )
                .arg(
                    Arg::new("dbid")
                        .long("dbid")
                        .value_name("ID")
                        .help("Database id")
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
}

fn main() {
    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A first argument that is neither a flag nor a subcommand is the input file
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    init_logging(&config);

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let from = source_format(sub_matches, input);
            let to = required(sub_matches, "to");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path");
            let from = source_format(sub_matches, path);
            let view = sub_matches
                .get_one::<String>("view")
                .map(|s| s.as_str())
                .unwrap_or("treeviz");
            handle_inspect_command(path, &from, view, &extra_params, &config);
        }
        Some(("check", sub_matches)) => {
            let path = required(sub_matches, "path");
            let from = source_format(sub_matches, path);
            handle_check_command(path, &from);
        }
        Some(("find", sub_matches)) => {
            let path = required(sub_matches, "path");
            let from = source_format(sub_matches, path);
            let query = build_query(sub_matches).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(1);
            });
            handle_find_command(path, &from, &query);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .unwrap_or_else(|| {
            eprintln!("Error: missing <{name}>");
            std::process::exit(2);
        })
}

/// `--from` when given, otherwise detected from the file extension.
fn source_format(matches: &ArgMatches, input: &str) -> String {
    if let Some(from) = matches.get_one::<String>("from") {
        return from.to_string();
    }
    let registry = FormatRegistry::default();
    match registry.detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

/// Read and parse a bank, exiting with a message on failure.
fn load_bank(registry: &FormatRegistry, path: &str, from: &str) -> Category {
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });
    registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    })
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &QbankConfig,
) {
    let registry = FormatRegistry::default();

    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    let bank = load_bank(&registry, input, from);

    let format_options = convert_options(config, to, input, extra_params);
    let result = registry
        .serialize_with_options(&bank, to, &format_options)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Configured options for `to`, overridden by `--extra-*` parameters.
fn convert_options(
    config: &QbankConfig,
    to: &str,
    input: &str,
    extra_params: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut options = config.format_options(to);
    for (key, value) in extra_params {
        options.insert(key.clone(), value.clone());
    }
    let embeds = options
        .get("embed-files")
        .is_some_and(|value| value != "false");
    if embeds && !options.contains_key("base-dir") {
        if let Some(dir) = Path::new(input).parent() {
            options.insert("base-dir".to_string(), dir.display().to_string());
        }
    }
    options
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    from: &str,
    view: &str,
    extra_params: &HashMap<String, String>,
    config: &QbankConfig,
) {
    let registry = FormatRegistry::default();
    let bank = load_bank(&registry, path, from);

    let mut params = if view == "treeviz" {
        config.format_options("treeviz")
    } else {
        HashMap::new()
    };
    for (key, value) in extra_params {
        params.insert(key.clone(), value.clone());
    }

    let output = views::execute_view(&bank, view, &params).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });

    print!("{output}");
}

/// Handle the check command
fn handle_check_command(path: &str, from: &str) {
    let registry = FormatRegistry::default();
    let bank = load_bank(&registry, path, from);

    let failures = bank.check_all();
    for (question, error) in &failures {
        println!("{question}: {error}");
    }
    if !failures.is_empty() {
        eprintln!(
            "{} of {} questions failed",
            failures.len(),
            bank.get_size(true)
        );
        std::process::exit(1);
    }
    println!("{} questions ok", bank.get_size(true));
}

fn build_query(matches: &ArgMatches) -> Result<Query, regex::Error> {
    let regex = |name: &str| {
        matches
            .get_one::<String>(name)
            .map(|pattern| Regex::new(pattern))
            .transpose()
    };
    Ok(Query {
        name: regex("name")?,
        body: regex("body")?,
        tags: matches
            .get_many::<String>("tag")
            .map(|tags| tags.cloned().collect())
            .unwrap_or_default(),
        qtype: matches
            .get_one::<String>("type")
            .and_then(|name| QuestionType::from_name(name)),
        dbid: matches.get_one::<u32>("dbid").copied(),
    })
}

/// Handle the find command
fn handle_find_command(path: &str, from: &str, query: &Query) {
    let registry = FormatRegistry::default();
    let bank = load_bank(&registry, path, from);

    for (cat_path, cat) in bank.walk() {
        for question in cat.questions().iter().filter(|q| query.matches(q)) {
            println!(
                "{cat_path}/{} [{}]",
                question.name,
                question.question_type()
            );
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available formats:\n");
    for format_name in registry.list_formats() {
        let Ok(format) = registry.get(&format_name) else {
            continue;
        };
        let mut modes = Vec::new();
        if format.supports_parsing() {
            modes.push("read");
        }
        if format.supports_serialization() {
            modes.push("write");
        }
        println!(
            "  {format_name:<10} {:<12} {}",
            modes.join("/"),
            format.description()
        );
    }

    println!("\nInspect views:");
    for view in views::AVAILABLE_VIEWS {
        println!("  {view}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> QbankConfig {
    let loader = Loader::new().with_optional_file(PROJECT_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Install the stderr subscriber; `RUST_LOG` wins over the configured level.
fn init_logging(config: &QbankConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

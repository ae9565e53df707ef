use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the views from src/views.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_VIEWS: &[&str] = &["treeviz", "tag", "json", "stats"];

fn path_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn from_arg() -> Arg {
    Arg::new("from").long("from").value_hint(ValueHint::Other)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("qbank")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and inspecting quiz question banks")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("convert")
                .arg(path_arg("input"))
                .arg(from_arg())
                .arg(Arg::new("to").long("to").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .arg(path_arg("path"))
                .arg(
                    Arg::new("view")
                        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_VIEWS))
                        .index(2),
                )
                .arg(from_arg()),
        )
        .subcommand(Command::new("check").arg(path_arg("path")).arg(from_arg()))
        .subcommand(
            Command::new("find")
                .arg(path_arg("path"))
                .arg(from_arg())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("body").long("body"))
                .arg(Arg::new("tag").long("tag").action(ArgAction::Append))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("dbid").long("dbid")),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "qbank", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "qbank", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "qbank", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}

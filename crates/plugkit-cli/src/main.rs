//! `plugkit` -- CLI binary for the plugkit toolkit.
//!
//! Provides the following subcommands:
//!
//! - `plugkit list` -- Show the registered tools.
//! - `plugkit <tool> [--param value ...]` -- Run a tool headlessly.
//! - `plugkit <tool> --ui` -- Run a tool with interactive prompting.
//!
//! The front-end is chosen with `-i/--interface` or the
//! `PLUGKIT_INTERFACE` environment variable; `--debug` or
//! `PLUGKIT_DEBUG` enables debug-level logging.

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Context;
use clap::ArgMatches;
use comfy_table::{Table, presets::UTF8_FULL};
use plugkit_core::plugin::NullFrontEnd;
use plugkit_core::registry::PluginRegistry;

mod dynamic;
mod stdio;

use stdio::StdioFrontEnd;

fn main() -> ExitCode {
    let mut registry = PluginRegistry::new();
    plugkit_tools::register_builtin_tools(&mut registry);
    registry.register_interface::<StdioFrontEnd>();
    registry.register_interface_with::<NullFrontEnd>(true, false);
    let registry = Rc::new(registry);

    let matches = dynamic::build_cli(&registry).get_matches();
    init_logging(matches.get_flag("debug"));

    match dispatch(&registry, &matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let debug = debug || std::env::var("PLUGKIT_DEBUG").is_ok_and(|v| !v.is_empty());
    let default_filter = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(registry: &Rc<PluginRegistry>, matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    match matches.subcommand() {
        Some(("list", _)) => {
            print_tool_table(registry);
            Ok(ExitCode::SUCCESS)
        }
        Some((tool_name, sub)) => run_tool(registry, tool_name, sub),
        None => unreachable!("clap enforces a subcommand"),
    }
}

fn print_tool_table(registry: &PluginRegistry) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["NAME", "COLLECTION", "HELP"]);
    for decl in registry.tools(false) {
        table.add_row([&decl.name, &decl.collection, &decl.help]);
    }
    println!("{table}");
}

fn run_tool(
    registry: &Rc<PluginRegistry>,
    tool_name: &str,
    matches: &ArgMatches,
) -> anyhow::Result<ExitCode> {
    let decl = registry.get_tool(tool_name)?.clone();
    let args = dynamic::collect_args(matches, &decl.schema());

    let interface_name = matches
        .get_one::<String>("interface")
        .cloned()
        .unwrap_or_else(PluginRegistry::default_interface_name);
    tracing::debug!(tool = tool_name, interface = %interface_name, "dispatching");
    let mut interface = registry
        .make_interface(&interface_name)
        .with_context(|| format!("selecting front-end {interface_name}"))?;
    interface.tool_data = args.clone();

    if matches.get_flag("ui") {
        interface.add_tool(decl);
        return Ok(to_exit_code(interface.run()));
    }

    let mut tool = decl
        .construct(&args)
        .with_context(|| format!("constructing tool {tool_name}"))?;
    tool.validate()
        .with_context(|| format!("validating arguments for {tool_name}"))?;
    let code = tool
        .execute(&mut interface)
        .with_context(|| format!("running tool {tool_name}"))?;
    Ok(to_exit_code(code))
}

fn to_exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}

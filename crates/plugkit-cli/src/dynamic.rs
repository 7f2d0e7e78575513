//! Dynamic clap surface generated from tool schemas.
//!
//! Every registered tool becomes a subcommand; every parameter becomes
//! an argument. Values are passed along as strings and coerced by the
//! parameter's own validator pipeline, so the clap layer only enforces
//! what it can express natively (flags, choice membership, presence).

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use plugkit_core::param::{ParamSpec, ParamType, Schema};
use plugkit_core::registry::PluginRegistry;
use plugkit_core::ToolData;
use serde_json::Value;

/// The full `plugkit` command: fixed surface plus one subcommand per
/// visible tool.
pub fn build_cli(registry: &PluginRegistry) -> Command {
    let mut command = Command::new("plugkit")
        .about("Run tools from the plugkit toolkit")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug-level logging"),
        )
        .arg(
            Arg::new("interface")
                .short('i')
                .long("interface")
                .global(true)
                .value_name("NAME")
                .help("Front-end to run against (default: PLUGKIT_INTERFACE or stdio)"),
        )
        .subcommand(Command::new("list").about("List the available tools"));

    for decl in registry.tools(false) {
        command = command.subcommand(tool_command(decl.name.clone(), decl.help.clone(), &decl.schema()));
    }
    command
}

fn tool_command(name: String, help: String, schema: &Schema) -> Command {
    let mut command = Command::new(name).about(help).arg(
        Arg::new("ui")
            .long("ui")
            .action(ArgAction::SetTrue)
            .help("Prompt for parameters interactively"),
    );
    for spec in schema.iter() {
        command = command.arg(param_arg(spec));
    }
    command
}

/// Map one parameter onto a clap argument.
fn param_arg(spec: &ParamSpec) -> Arg {
    let mut arg = Arg::new(spec.name.clone())
        .long(spec.name.clone())
        .help(spec.description.clone());
    if let Some(short) = spec.short_name.as_ref().and_then(|s| s.chars().next()) {
        arg = arg.short(short);
    }
    match spec.param_type {
        ParamType::Bool => arg.action(ArgAction::SetTrue),
        ParamType::List => {
            arg = arg
                .action(ArgAction::Append)
                .value_delimiter(';')
                .value_name("ITEM");
            if let Some(choices) = &spec.choices {
                arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
            }
            if spec.is_required() {
                arg = arg.required_unless_present("ui");
            }
            arg
        }
        _ => {
            arg = arg.action(ArgAction::Set).value_name("VALUE");
            if let Some(choices) = &spec.choices {
                arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
            }
            // Interactive runs may still prompt for anything missing.
            if spec.is_required() {
                arg = arg.required_unless_present("ui");
            }
            arg
        }
    }
}

/// Collect provided arguments into a tool-data bag, leaving absent
/// parameters to their schema defaults.
pub fn collect_args(matches: &ArgMatches, schema: &Schema) -> ToolData {
    let mut args = ToolData::new();
    for spec in schema.iter() {
        match spec.param_type {
            ParamType::Bool => {
                if matches.get_flag(&spec.name) {
                    args.insert(spec.name.clone(), Value::Bool(true));
                }
            }
            ParamType::List => {
                if let Some(values) = matches.get_many::<String>(&spec.name) {
                    let items: Vec<Value> =
                        values.map(|v| Value::String(v.clone())).collect();
                    args.insert(spec.name.clone(), Value::Array(items));
                }
            }
            _ => {
                if let Some(value) = matches.get_one::<String>(&spec.name) {
                    args.insert(spec.name.clone(), Value::String(value.clone()));
                }
            }
        }
    }
    args
}

use clap::{Parser, Subcommand};
use eyre::{bail, eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rekord_core::data::Value;
use rekord_core::field::{DefaultSpec, Factory, FieldDecl};
use rekord_core::record::{
    Arguments, Instance, ParamDefault, RecordBuilder, RecordOptions, RecordType,
};

#[derive(Parser)]
#[command(name = "rekord")]
#[command(about = "Build declarative record types and exercise their generated behaviors")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved descriptor of every declared record
    Describe {
        /// Declaration file
        decl: PathBuf,
    },
    /// Construct an instance and show its generated behaviors
    New {
        /// Declaration file
        decl: PathBuf,

        /// Record to construct
        #[arg(short, long)]
        record: String,

        /// Positional arguments as a JSON array
        #[arg(short, long, default_value = "[]")]
        args: String,

        /// Keyword arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        kwargs: String,

        /// Also print the instance as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two instances
    Compare {
        /// Declaration file
        decl: PathBuf,

        /// Left operand as NAME:JSON_ARRAY
        #[arg(short, long)]
        left: String,

        /// Right operand as NAME:JSON_ARRAY
        #[arg(short, long)]
        right: String,
    },
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonDeclarations {
    records: Vec<JsonRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonRecord {
    name: String,
    extends: Option<String>,
    #[serde(default)]
    options: RecordOptions,
    #[serde(default)]
    fields: Vec<JsonField>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonField {
    name: String,
    #[serde(rename = "type", default = "any_type")]
    type_tag: String,
    default: Option<serde_json::Value>,
    default_factory: Option<String>,
    #[serde(default = "enabled")]
    init: bool,
    #[serde(default = "enabled")]
    repr: bool,
    #[serde(default = "enabled")]
    compare: bool,
    hash: Option<bool>,
    #[serde(default)]
    class_var: bool,
}

fn any_type() -> String {
    "any".to_string()
}

fn enabled() -> bool {
    true
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Describe { decl } => {
            let registry = load_registry(decl)?;
            for ty in &registry {
                describe(ty);
            }
        }
        Commands::New {
            decl,
            record,
            args,
            kwargs,
            json,
        } => {
            let registry = load_registry(decl)?;
            let ty = lookup(&registry, record)?;
            let instance = construct(ty, args, kwargs)?;
            show_instance(&instance, *json)?;
        }
        Commands::Compare { decl, left, right } => {
            let registry = load_registry(decl)?;
            let left = construct_operand(&registry, left)?;
            let right = construct_operand(&registry, right)?;
            compare(&left, &right);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build every declared record, in file order
fn load_registry(path: &Path) -> Result<Vec<RecordType>> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let declarations: JsonDeclarations = serde_json::from_str(&content)
        .wrap_err_with(|| format!("parsing declarations in {}", path.display()))?;

    let mut registry: Vec<RecordType> = Vec::new();
    for record in declarations.records {
        let name = record.name.clone();
        let ty = build_record(&registry, record).wrap_err_with(|| format!("record '{}'", name))?;
        registry.push(ty);
    }
    info!(records = registry.len(), "loaded declarations");
    Ok(registry)
}

fn build_record(registry: &[RecordType], record: JsonRecord) -> Result<RecordType> {
    let mut builder = RecordBuilder::new(record.name).options(record.options);
    if let Some(base) = &record.extends {
        builder = builder.extends(lookup(registry, base)?);
    }
    for field in record.fields {
        builder = builder.field(convert_json_field(field)?);
    }
    Ok(builder.build()?)
}

fn convert_json_field(field: JsonField) -> Result<FieldDecl> {
    let mut decl = if field.class_var {
        FieldDecl::class_var(field.name, field.type_tag)
    } else {
        FieldDecl::new(field.name, field.type_tag)
    };
    if let Some(default) = &field.default {
        decl = decl.with_default(Value::from(default));
    }
    if let Some(factory) = &field.default_factory {
        decl = decl.with_factory(named_factory(factory)?);
    }
    decl = decl
        .with_init(field.init)
        .with_repr(field.repr)
        .with_compare(field.compare);
    if let Some(hash) = field.hash {
        decl = decl.with_hash(hash);
    }
    Ok(decl)
}

fn named_factory(name: &str) -> Result<Factory> {
    Ok(match name {
        "list" => Factory::list(),
        "dict" => Factory::map(),
        "set" => Factory::set(),
        "tuple" => Factory::new("tuple", || Value::Tuple(Vec::new())),
        "int" => Factory::new("int", || Value::Int(0)),
        "float" => Factory::new("float", || Value::Float(0.0)),
        "str" => Factory::new("str", || Value::Str(String::new())),
        other => bail!("unknown default factory '{}'", other),
    })
}

fn lookup<'a>(registry: &'a [RecordType], name: &str) -> Result<&'a RecordType> {
    registry
        .iter()
        .find(|ty| ty.name() == name)
        .ok_or_else(|| eyre!("no record named '{}' declared before use", name))
}

fn construct(ty: &RecordType, args: &str, kwargs: &str) -> Result<Instance> {
    let positional: Vec<serde_json::Value> =
        serde_json::from_str(args).wrap_err("positional arguments must be a JSON array")?;
    let named: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(kwargs).wrap_err("keyword arguments must be a JSON object")?;

    let mut arguments = Arguments::new();
    for value in &positional {
        arguments = arguments.arg(Value::from(value));
    }
    for (name, value) in &named {
        arguments = arguments.kwarg(name.clone(), Value::from(value));
    }
    debug!(record = ty.name(), count = arguments.len(), "constructing");
    Ok(ty.construct(arguments)?)
}

fn construct_operand(registry: &[RecordType], operand: &str) -> Result<Instance> {
    let (name, args) = operand
        .split_once(':')
        .ok_or_else(|| eyre!("operand '{}' is not of the form NAME:JSON_ARRAY", operand))?;
    construct(lookup(registry, name)?, args, "{}")
}

fn describe(ty: &RecordType) {
    let descriptor = ty.descriptor();
    let options = descriptor.options();
    println!("record {}", ty.name());
    if !descriptor.ancestors().is_empty() {
        let ancestors: Vec<&str> = descriptor.ancestors().iter().map(|a| a.name()).collect();
        println!("  ancestors: {}", ancestors.join(" -> "));
    }
    println!(
        "  options: init={} repr={} compare={} frozen={} hash={}",
        options.init,
        options.repr,
        options.compare,
        options.frozen,
        descriptor.hash_action()
    );
    for field in ty.fields() {
        let default = match &field.default {
            DefaultSpec::Missing => String::new(),
            DefaultSpec::Value(value) => format!(" = {}", value),
            DefaultSpec::Factory(factory) => format!(" = <{}()>", factory.name()),
        };
        let mut flags = Vec::new();
        for (flag, on) in [
            ("init", field.init),
            ("repr", field.repr),
            ("compare", field.compare),
            ("hash", field.hashed()),
        ] {
            if on {
                flags.push(flag);
            }
        }
        println!(
            "  field {}: {}{} [{}]",
            field.name,
            field.type_tag,
            default,
            flags.join(", ")
        );
    }
    for attr in descriptor.class_vars() {
        match &attr.value {
            Some(value) => println!("  class var {}: {} = {}", attr.name, attr.type_tag, value),
            None => println!("  class var {}: {}", attr.name, attr.type_tag),
        }
    }
    let params: Vec<String> = ty
        .signature()
        .into_iter()
        .map(|param| match param.default {
            ParamDefault::Required => param.name,
            ParamDefault::Value(value) => format!("{}={}", param.name, value),
            ParamDefault::Factory(_) => format!("{}=<factory>", param.name),
        })
        .collect();
    println!("  signature: {}({})", ty.name(), params.join(", "));
}

fn show_instance(instance: &Instance, json: bool) -> Result<()> {
    println!("{}", instance.repr());
    match instance.try_hash() {
        Ok(hash) => println!("hash: {:#018x}", hash),
        Err(err) => println!("hash: {}", err),
    }
    if json {
        let value = instance.as_map()?;
        println!("{}", serde_json::to_string_pretty(&value.to_json())?);
    }
    Ok(())
}

fn compare(left: &Instance, right: &Instance) {
    println!("left:  {}", left.repr());
    println!("right: {}", right.repr());
    println!("equal: {}", left == right);
    match left.try_cmp(right) {
        Ok(ordering) => println!("ordering: {:?}", ordering),
        Err(err) => println!("ordering: {}", err),
    }
}

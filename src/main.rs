// Entry point: parse flags, bind the items, run the picker and print the
// resulting model value as JSON.

use pick::expr::Accessor;
use pick::registry::GroupBy;
use pick::ui::{Exit, initial_model};
use pick::{Config, Error, RepeatExpr, Select};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

const DEFAULT_REPEAT: &str = "item in items | filter: $select.search";

#[derive(Debug, Default, PartialEq)]
struct Options {
    repeat: Option<String>,
    group_by: Option<String>,
    disable_when: Option<String>,
    display: Option<String>,
    multiple: bool,
    placeholder: Option<String>,
    theme: Option<String>,
    no_search: bool,
    keep_search: bool,
    refresh_delay: Option<u64>,
    value: Option<String>,
    config: Option<PathBuf>,
    log: Option<PathBuf>,
    verbose: u8,
    check: bool,
    help: bool,
    items: Option<String>,
}

fn print_help() {
    println!("pick - searchable combobox for JSON items");
    println!();
    println!("Usage:");
    println!("  pick [OPTIONS] [ITEMS.json|-]");
    println!();
    println!("Reads a JSON array of items (stdin when omitted or '-'), lets you pick");
    println!("one or more of them and prints the picked model value as JSON.");
    println!();
    println!("Options:");
    println!("  --repeat EXPR         [label as] item in collection [track by key]");
    println!("                        (default: '{DEFAULT_REPEAT}')");
    println!("  --group-by FIELD      Group items by this field.");
    println!("  --disable-when EXPR   Items for which EXPR is truthy cannot be picked.");
    println!("  --display EXPR        Label shown for each item (default: the item).");
    println!("  --multiple            Pick any number of items.");
    println!("  --placeholder TEXT    Text shown while nothing is picked.");
    println!("  --theme NAME          bootstrap, select2 or selectize.");
    println!("  --no-search           Disable the search box.");
    println!("  --keep-search         Keep the search text when opening and closing.");
    println!("  --refresh-delay MS    Quiet period before the list is refreshed.");
    println!("  --value JSON          Initial model value.");
    println!("  --config FILE         JSON file with select options.");
    println!("  --log FILE            Append logs to FILE (PICK_LOG / RUST_LOG filter).");
    println!("  -v                    More log output; repeat for more.");
    println!("  --check               Bind and hydrate without the UI, print the model.");
    println!("  --help                Show this help message.");
    println!();
    println!("Keys: ↑/↓ move, ⏎ select, ⇥ pick and leave, ⌫ clear or remove a token,");
    println!("      ←/→ walk tokens, ⎋ close, ⎋ again to finish, Ctrl-C to abort.");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut o = Options::default();
    let mut i = 0usize;
    // value for the flag at `i`
    let value_of = |i: usize| -> Result<String, String> {
        args.get(i + 1)
            .cloned()
            .ok_or_else(|| format!("{} needs a value", args[i]))
    };
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--help" | "-h" => o.help = true,
            "--multiple" => o.multiple = true,
            "--no-search" => o.no_search = true,
            "--keep-search" => o.keep_search = true,
            "--check" => o.check = true,
            "--repeat" | "--group-by" | "--disable-when" | "--display" | "--placeholder"
            | "--theme" | "--refresh-delay" | "--value" | "--config" | "--log" => {
                let v = value_of(i)?;
                match arg {
                    "--repeat" => o.repeat = Some(v),
                    "--group-by" => o.group_by = Some(v),
                    "--disable-when" => o.disable_when = Some(v),
                    "--display" => o.display = Some(v),
                    "--placeholder" => o.placeholder = Some(v),
                    "--theme" => o.theme = Some(v),
                    "--refresh-delay" => {
                        let ms = v
                            .parse::<u64>()
                            .map_err(|_| format!("--refresh-delay expects milliseconds, got '{v}'"))?;
                        o.refresh_delay = Some(ms);
                    }
                    "--value" => o.value = Some(v),
                    "--config" => o.config = Some(PathBuf::from(v)),
                    _ => o.log = Some(PathBuf::from(v)),
                }
                i += 1;
            }
            _ if arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v') => {
                let count = u8::try_from(arg.len() - 1).unwrap_or(u8::MAX);
                o.verbose = o.verbose.saturating_add(count);
            }
            "-" => o.items = Some(arg.to_string()),
            _ if arg.starts_with('-') => return Err(format!("unknown option '{arg}'")),
            _ => {
                if o.items.is_some() {
                    return Err(format!("unexpected argument '{arg}'"));
                }
                o.items = Some(arg.to_string());
            }
        }
        i += 1;
    }
    Ok(o)
}

fn build_config(o: &Options) -> pick::Result<Config> {
    let mut config = match &o.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if o.multiple {
        config.multiple = true;
    }
    if let Some(p) = &o.placeholder {
        config.placeholder = p.clone();
    }
    if let Some(t) = &o.theme {
        config.theme = t.clone();
    }
    if o.no_search {
        config.search_enabled = false;
    }
    if o.keep_search {
        config.reset_search_input = false;
    }
    if let Some(ms) = o.refresh_delay {
        config.refresh_delay = ms;
    }
    Ok(config)
}

fn read_items(source: Option<&str>) -> pick::Result<Value> {
    let text = match source {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| Error::io("<stdin>", e))?;
            buf
        }
        Some(path) => fs::read_to_string(path).map_err(|e| Error::io(path, e))?,
    };
    Ok(serde_json::from_str(&text)?)
}

fn build_select(o: &Options, items: Value) -> pick::Result<Select> {
    let config = build_config(o)?;
    let repeat = RepeatExpr::parse(o.repeat.as_deref().unwrap_or(DEFAULT_REPEAT))?;
    // items are reachable under the name the source expression starts from
    let mut scope = Map::new();
    scope.insert(repeat.source.root().to_string(), items);
    let mut select = Select::new(config, repeat, Value::Object(scope))?
        .with_refresh(true)
        .on_select(|_, model| tracing::info!(%model, "picked"))
        .on_remove(|_, model| tracing::info!(%model, "removed"));
    if let Some(field) = &o.group_by {
        select = select.with_group_by(GroupBy::Field(field.clone()));
    }
    if let Some(expr) = &o.disable_when {
        select = select.with_disable_when(expr)?;
    }
    if let Some(value) = &o.value {
        let value: Value = serde_json::from_str(value)?;
        select.set_model(&value)?;
    }
    Ok(select)
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("pick: {e}");
    process::exit(2);
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let opts = parse_args(&args).unwrap_or_else(|e| fail(e));
    if opts.help {
        print_help();
        return;
    }
    if let Some(path) = &opts.log {
        if let Err(e) = pick::logging::init_file(path, opts.verbose) {
            fail(e);
        }
    }

    let items = read_items(opts.items.as_deref()).unwrap_or_else(|e| fail(e));
    let select = build_select(&opts, items).unwrap_or_else(|e| fail(e));
    let display = opts
        .display
        .as_deref()
        .map(Accessor::compile)
        .transpose()
        .unwrap_or_else(|e| fail(e));

    // non-interactive: report what the bound value hydrates to
    if opts.check {
        println!("{}", select.to_model());
        return;
    }

    let model = initial_model(select, display);
    let done = pick::ui::run(model).await.unwrap_or_else(|e| fail(e));
    match done.exit {
        Some(Exit::Confirm) => println!("{}", done.select.to_model()),
        Some(Exit::Cancel) | None => process::exit(1),
    }
}

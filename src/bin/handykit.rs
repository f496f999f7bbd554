// Binary entry point for the command-line tool.
use anyhow::{Context, Result};
use chrono::Utc;
use handykit::cli::{parse_args, print_help};
use handykit::config::Config;
use handykit::context::{AppContext, Directory, StandardContext};
use handykit::dates::{DateFormat, DateHandler};
use handykit::locale::LocaleHelper;
use handykit::storage::FileStore;
use handykit::{logging, text};
use strum::IntoEnumIterator;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let binary_name = args
        .first()
        .and_then(|a| std::path::Path::new(a).file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("handykit")
        .to_string();

    let invocation = parse_args(args.get(1..).unwrap_or_default());
    if invocation.help {
        print_help(&binary_name);
        return Ok(());
    }

    let base = StandardContext::new(invocation.override_root);
    let config = Config::load_or_default(&base)?;
    let ctx = base.with_bundle_dir(config.bundle_dir.clone());

    if let Err(e) = logging::init_from_config(&ctx, &config) {
        eprintln!("Logging disabled: {:#}", e);
    }

    let Some((command, params)) = invocation.command.split_first() else {
        print_help(&binary_name);
        return Ok(());
    };

    match command.as_str() {
        "now" => run_now(&config, params),
        "b64" => run_b64(params),
        "ls" => run_ls(&ctx, params),
        "formats" => {
            for format in DateFormat::iter() {
                println!("{:<28} {}", format.to_string(), format.pattern());
            }
            Ok(())
        }
        other => {
            eprintln!("Unknown command '{}'. Try --help.", other);
            std::process::exit(2);
        }
    }
}

fn flag_value<'a>(params: &'a [String], flag: &str) -> Option<&'a str> {
    params
        .iter()
        .position(|p| p == flag)
        .and_then(|idx| params.get(idx + 1))
        .map(String::as_str)
}

fn run_now(config: &Config, params: &[String]) -> Result<()> {
    let handler = DateHandler::new(LocaleHelper::from_config(config));

    let format = match flag_value(params, "--format") {
        Some(name) => name
            .parse::<DateFormat>()
            .map_err(|_| anyhow::anyhow!("Unknown format '{}'. See 'formats'.", name))?,
        None => DateFormat::DateTimeIso,
    };

    let now = Utc::now();
    let rendered = match flag_value(params, "--tz") {
        Some(zone) => handler.string_from_date_in_named(now, format, zone)?,
        None => handler.string_from_date_for_current_timezone(now, format),
    };
    println!("{}", rendered);
    Ok(())
}

fn run_b64(params: &[String]) -> Result<()> {
    match params {
        [mode, input] if mode == "encode" => {
            println!("{}", text::base64_encode(input));
            Ok(())
        }
        [mode, input] if mode == "decode" => {
            let decoded = text::base64_decode(input)
                .ok_or_else(|| anyhow::anyhow!("Input is not base64-encoded UTF-8 text"))?;
            println!("{}", decoded);
            Ok(())
        }
        _ => anyhow::bail!("Usage: b64 encode|decode <text>"),
    }
}

fn run_ls(ctx: &dyn AppContext, params: &[String]) -> Result<()> {
    let directory: Directory = params
        .first()
        .context("Usage: ls <directory> [folder]")?
        .parse()?;
    let folder = params.get(1).map(String::as_str);

    let store = FileStore::new(ctx);
    for name in store.list_files(directory, folder)? {
        println!("{}", name);
    }
    Ok(())
}

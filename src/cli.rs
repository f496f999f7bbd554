// File: ./src/cli.rs
//! Shared command-line interface logic, like printing help.
use std::path::PathBuf;

/// What the command line asked for.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub override_root: Option<PathBuf>,
    pub help: bool,
    /// The command followed by its own arguments, untouched.
    pub command: Vec<String>,
}

/// Splits `args` (without the binary name) into global options and a command.
///
/// Options are only recognised before the command, so `b64 encode -h`
/// encodes the text `-h`.
pub fn parse_args(args: &[String]) -> Invocation {
    let mut inv = Invocation::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--root" | "-r" => {
                if i + 1 < args.len() {
                    inv.override_root = Some(args[i + 1].clone().into());
                    i += 1; // Also consumed the value
                }
            }
            "--help" | "-h" | "help" => inv.help = true,
            _ => {
                inv.command = args[i..].to_vec();
                break;
            }
        }
        i += 1;
    }

    if inv.command.is_empty() {
        inv.help = true;
    }
    inv
}

pub fn print_help(binary_name: &str) {
    println!(
        "Handykit v{} - Date, locale and app-directory helpers",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] now [--format <name>] [--tz <zone>]", binary_name);
    println!("    {} [--root <path>] b64 encode|decode <text>", binary_name);
    println!("    {} [--root <path>] ls <directory> [folder]", binary_name);
    println!("    {} [--root <path>] formats", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("NOW COMMAND:");
    println!(
        "    {} now                             Current time, DateTimeIso, app timezone",
        binary_name
    );
    println!(
        "    {} now --format DateLong           Any name listed by 'formats'",
        binary_name
    );
    println!(
        "    {} now --tz Asia/Tokyo             Render on another wall clock",
        binary_name
    );
    println!();
    println!("LS COMMAND:");
    println!("    <directory> is one of: library, documents, cache, bundle");
    println!();
    println!("CONFIG FILE:");
    println!("    config.toml in the config directory accepts:");
    println!("    timezone = \"America/Sao_Paulo\"");
    println!("    language = \"pt-BR\"");
    println!("    log_level = \"debug\"");
    println!("    log_to_file = true");
    println!("    bundle_dir = \"/opt/handykit/resources\"");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_root_before_command() {
        let inv = parse_args(&args(&["--root", "/tmp/hk", "ls", "cache"]));
        assert_eq!(inv.override_root, Some(PathBuf::from("/tmp/hk")));
        assert!(!inv.help);
        assert_eq!(inv.command, args(&["ls", "cache"]));
    }

    #[test]
    fn test_flags_after_command_belong_to_it() {
        let inv = parse_args(&args(&["b64", "encode", "-h"]));
        assert!(!inv.help);
        assert_eq!(inv.command, args(&["b64", "encode", "-h"]));

        let inv = parse_args(&args(&["b64", "encode", "--root"]));
        assert_eq!(inv.override_root, None);
        assert_eq!(inv.command, args(&["b64", "encode", "--root"]));
    }

    #[test]
    fn test_help_requests() {
        assert!(parse_args(&args(&["--help"])).help);
        assert!(parse_args(&args(&["-h", "now"])).help);
        assert!(parse_args(&args(&["-r", "/tmp/hk"])).help);
        assert!(parse_args(&[]).help);
    }
}

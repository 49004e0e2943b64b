use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{debug, info};

use toy_highlighter::{check, scan, Highlight, Palette};

#[derive(Debug, Default, PartialEq, Eq)]
struct Flags {
    json: bool,
    no_color: bool,
}

pub fn run(args: &[String]) -> Result<ExitCode> {
    // Handle help
    if args.len() <= 1 || args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    let (flags, positional) = split_flags(&args[1..]);
    if flags.no_color {
        colored::control::set_override(false);
    }

    let command = positional[0];
    debug!("Command '{}' with {:?}", command, flags);

    match (command, &positional[1..]) {
        ("check", [path]) => check_file(path),
        ("tokens", [path]) => print_tokens(path, &flags),
        ("highlight", [path]) => highlight_file(path, &flags),
        ("watch", []) => watch(),
        ("check" | "tokens" | "highlight", _) => {
            eprintln!("Error: '{}' command requires a filename", command);
            eprintln!("Usage: toyhl {} <filename>", command);
            Ok(ExitCode::FAILURE)
        }
        ("watch", _) => {
            eprintln!("Error: 'watch' command takes no arguments");
            Ok(ExitCode::FAILURE)
        }
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_help();
            Ok(ExitCode::FAILURE)
        }
    }
}

fn split_flags(args: &[String]) -> (Flags, Vec<&str>) {
    let mut flags = Flags::default();
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--json" => flags.json = true,
            "--no-color" => flags.no_color = true,
            other => positional.push(other),
        }
    }
    if positional.is_empty() {
        positional.push("");
    }
    (flags, positional)
}

fn print_help() {
    println!("Usage: toyhl <command> [arguments] [--json] [--no-color]");
    println!();
    println!("Commands:");
    println!("  check <filename>      Check syntax, exit 1 on the first error");
    println!("  tokens <filename>     Print the token stream");
    println!("  highlight <filename>  Print the source colored by token kind");
    println!("  watch                 Re-check the buffer after every line from stdin");
    println!("                        (':clear' resets the buffer, ':q' quits)");
    println!();
    println!("  <filename> may be '-' to read stdin.");
    println!();
    println!("Options:");
    println!("  --json                Machine-readable output for tokens/highlight");
    println!("  --no-color            Disable ANSI colors");
    println!("  --help, -h            Show this help message");
    println!();
    println!("Examples:");
    println!("  toyhl check program.toy");
    println!("  echo 'x = 5' | toyhl tokens - --json");
}

fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}

fn check_file(path: &str) -> Result<ExitCode> {
    let source = read_source(path)?;
    let tokens = scan(&source);
    match check(&tokens) {
        Ok(()) => {
            println!("Syntax check passed!");
            println!("Found {} token(s)", tokens.len());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Syntax Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_tokens(path: &str, flags: &Flags) -> Result<ExitCode> {
    let source = read_source(path)?;
    let tokens = scan(&source);
    if flags.json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{:<10} {}", token.kind, token.lexeme);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn highlight_file(path: &str, flags: &Flags) -> Result<ExitCode> {
    let source = read_source(path)?;
    let report = Highlight::analyze(&source);
    if flags.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &Highlight) {
    println!("{}", report.render(&Palette::default()));
    println!("-- {}", report.status());
    if let Some(error) = &report.error {
        println!("   {}", error);
    }
}

fn watch() -> Result<ExitCode> {
    println!("Type code line by line. ':clear' resets the buffer, ':q' quits.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Error reading input")?;

        match line.trim() {
            ":q" => break,
            ":clear" => {
                buffer.clear();
                println!("Buffer cleared.");
                continue;
            }
            _ => {}
        }

        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(&line);

        // Full re-scan and re-check on every edit
        let report = Highlight::analyze(&buffer);
        info!("{} span(s), valid: {}", report.spans.len(), report.valid);
        print_report(&report);
    }

    println!();
    Ok(ExitCode::SUCCESS)
}

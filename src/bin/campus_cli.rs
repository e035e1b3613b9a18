//!
//! campus_cli binary
//! -----------------
//! Command-line client for the campus portal API. Runs one command and exits,
//! or with `--repl` starts an interactive interpreter. The login session is kept
//! in a file between runs and restored on start.

use std::env;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use campus_portal::cli::commands::{parse_command, Command, Shell, COMMAND_HELP};
use campus_portal::config::{ConfigOverrides, PortalConfig};
use campus_portal::Portal;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [flags] <command> [args...]\n  {program} [flags] --repl\n\nFlags:\n  --api <url>              Portal API base URL (env CAMPUS_API_URL, default http://localhost:8000)\n  --session-file <path>    Where the login session is kept (env CAMPUS_SESSION_FILE)\n  --timeout <secs>         Request timeout in seconds (env CAMPUS_TIMEOUT_SECS, default 30)\n  --repl                   Start interactive mode\n  -h, --help               Show this help\n\n{COMMAND_HELP}\n\nExamples:\n  {program} login asha s3cret\n  {program} timetable monday\n  {program} canteen all lunch\n  {program} --repl\n    > bus 12A"
    );
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut overrides = ConfigOverrides::default();
    let mut repl = false;
    let mut words: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                if i + 1 >= args.len() { eprintln!("--api requires a URL"); print_usage(&program); std::process::exit(2); }
                overrides.api_url = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--session-file" => {
                if i + 1 >= args.len() { eprintln!("--session-file requires a path"); print_usage(&program); std::process::exit(2); }
                overrides.session_file = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--timeout" => {
                if i + 1 >= args.len() { eprintln!("--timeout requires a value"); print_usage(&program); std::process::exit(2); }
                overrides.timeout_secs = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--repl" => { repl = true; i += 1; continue; }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            _ => {
                // everything from the first non-flag on belongs to the command
                words.extend(args[i..].iter().cloned());
                break;
            }
        }
    }

    let config = match PortalConfig::resolve(&overrides) {
        Ok(c) => c,
        Err(e) => { eprintln!("Error: {}", e.message()); std::process::exit(2); }
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    if repl && words.is_empty() {
        return run_repl(rt, config);
    }
    if words.is_empty() {
        print_usage(&program);
        std::process::exit(2);
    }

    let cmd = match parse_command(&join_words(&words)) {
        Ok(c) => c,
        Err(msg) => { eprintln!("{}", msg); std::process::exit(2); }
    };
    if cmd == Command::Quit {
        return Ok(());
    }

    let portal = Portal::new(config).context("Failed to set up portal client")?;
    let mut shell = Shell::new(portal);
    let result = rt.block_on(async {
        shell.start().await;
        shell.execute(cmd).await
    });
    match result {
        Ok(out) => {
            print!("{}", out);
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {}", err.message());
            std::process::exit(1);
        }
    }
}

/// Re-quote words that contained whitespace so the shell tokenizer sees them as one.
fn join_words(words: &[String]) -> String {
    words
        .iter()
        .map(|w| if w.is_empty() || w.chars().any(char::is_whitespace) { quote_word(w) } else { w.clone() })
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_word(w: &str) -> String {
    match w.split_once('=') {
        Some((k, v)) if !k.chars().any(char::is_whitespace) => format!("{}=\"{}\"", k, v),
        _ => format!("\"{}\"", w),
    }
}

fn run_repl(rt: tokio::runtime::Runtime, config: PortalConfig) -> Result<()> {
    let portal = Portal::new(config).context("Failed to set up portal client")?;
    let mut shell = Shell::new(portal);
    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;

    println!("campus portal interpreter. Type 'help' for commands.");
    let state = rt.block_on(shell.start());
    match state.user() {
        Some(u) => println!("session restored for {}", u.username),
        None => println!("not logged in"),
    }

    loop {
        let line = match editor.readline("> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let line = line.trim();
        if line.is_empty() { continue; }
        let _ = editor.add_history_entry(line);
        let cmd = match parse_command(line) {
            Ok(c) => c,
            Err(msg) => { eprintln!("{}", msg); continue; }
        };
        if cmd == Command::Quit { break; }
        match rt.block_on(shell.execute(cmd)) {
            Ok(out) => print!("{}", out),
            Err(e) => eprintln!("error: {}", e.message()),
        }
    }
    Ok(())
}

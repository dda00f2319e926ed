use std::io::{self, BufRead, IsTerminal, Write};

use ordsmed::{Assistant, Options, SqliteStore};

const DEFAULT_DB: &str = "orders.db";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_tracing();

    let options = Options { trace_rules: config.trace };
    let assistant = Assistant::with_options(Box::new(SqliteStore::open(&config.db)), options);

    match config.question {
        Some(question) => println!("{}", assistant.answer(&question)),
        None => repl(&assistant),
    }
}

struct CliConfig {
    db: String,
    question: Option<String>,
    trace: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut db = DEFAULT_DB.to_string();
    let mut question: Option<String> = None;
    let mut trace = false;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("ordsmed {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--trace" => trace = true,
            "--db" => {
                let value = args.next().ok_or_else(|| "error: --db expects a value".to_string())?;
                db = value;
            }
            "--question" | "-q" => {
                let value =
                    args.next().ok_or_else(|| "error: --question expects a value".to_string())?;
                if question.is_some() {
                    return Err("error: question provided multiple times".to_string());
                }
                question = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if question.is_some() {
                        return Err("error: question provided multiple times".to_string());
                    }
                    question = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--db=") => {
                db = arg.trim_start_matches("--db=").to_string();
            }
            _ if arg.starts_with("--question=") => {
                if question.is_some() {
                    return Err("error: question provided multiple times".to_string());
                }
                question = Some(arg.trim_start_matches("--question=").to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if question.is_some() {
                    return Err("error: question provided multiple times".to_string());
                }
                question = Some(rest);
                break;
            }
        }
    }

    Ok(CliConfig { db, question, trace })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Read questions line by line; each line is one complete turn.
fn repl(assistant: &Assistant) {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!(
            "ordsmed {} - ask about the purchase-order data (ctrl-d to exit)",
            env!("CARGO_PKG_VERSION"),
        );
    }

    let mut out = io::stdout();
    loop {
        if interactive {
            print!("> ");
            let _ = out.flush();
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        println!("{}", assistant.answer(question));
    }
}

fn help_text() -> String {
    format!(
        "ordsmed {version}

Rule-based procurement analytics assistant CLI.

Usage:
  ordsmed [OPTIONS] [--] <question...>
  ordsmed [OPTIONS] --question <text>
  ordsmed [OPTIONS]              (reads questions from stdin, one per line)

Options:
  -q, --question <text>      Ask a single question and exit.
  --db <path>                SQLite database to answer from.
                             Default: {default_db}
  --trace                    Log rule evaluation (RUST_LOG=debug to see it).
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        default_db = DEFAULT_DB
    )
}

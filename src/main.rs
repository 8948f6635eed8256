use clap::Parser;
use gel_lang::cli::{self, CliError, EvalOptions, EvalResult};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "gel")]
#[command(about = "GEL - An embeddable expression language evaluated against JSON data")]
#[command(version)]
struct Cli {
    /// The expression to evaluate
    expression: String,

    /// JSON context (reads from stdin if piped)
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Evaluate in strict (nil-intolerant) mode
    #[arg(short, long)]
    strict: bool,

    /// Only validate syntax, don't evaluate
    #[arg(long)]
    syntax_only: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = match cli.input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };
    let input = input.filter(|s| !s.trim().is_empty());

    let options = EvalOptions {
        expression: cli.expression,
        input,
        pretty: cli.pretty,
        strict: cli.strict,
        syntax_only: cli.syntax_only,
    };

    match cli::execute(&options)? {
        EvalResult::SyntaxValid => println!("Syntax is valid"),
        EvalResult::Success(output) => {
            let json = if options.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }
            .unwrap();
            println!("{}", json);
        }
    }
    Ok(())
}

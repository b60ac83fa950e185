use std::io::{BufRead, Write, stdin, stdout};

use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;
use rpn_calc::Evaluation;
use rpn_calc::Lexer;
use rpn_calc::session::{Edit, Event, Session, Step};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the tokens of an expression, one per line.
    Tokenize { expression: String },
    /// Print the postfix form of an expression.
    Rpn { expression: String },
    /// Evaluate an expression and print both results.
    Eval {
        expression: String,
        /// Print a failing evaluation as a full diagnostic and exit with 65.
        #[arg(long)]
        diagnostic: bool,
    },
    /// Read expressions from stdin until end of input, `quit` or `exit`.
    Repl,
}

fn init_logging(verbose: u8) {
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

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Tokenize { expression } => {
            let expression = rpn_calc::lex::strip_whitespace(&expression);
            for token in Lexer::new(&expression) {
                let token = match token {
                    Ok(token) => token,
                    Err(e) => {
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(65);
                    }
                };
                println!("{token}");
            }
            println!("EOF");
        }
        Commands::Rpn { expression } => {
            let expression = rpn_calc::lex::strip_whitespace(&expression);
            rpn_calc::lex::validate(&expression)?;
            let rpn = rpn_calc::Parser::new(&expression).to_rpn()?;
            println!("{rpn}");
        }
        Commands::Eval {
            expression,
            diagnostic,
        } => {
            let evaluation = Evaluation::new(&expression);
            let (result, intermediate) = evaluation.render();
            if diagnostic {
                if let Err(e) = evaluation.result {
                    eprintln!("{:?}", miette::Report::new(e));
                    std::process::exit(65);
                }
            }
            println!("Result: {result}");
            println!("Intermediate: {intermediate}");
        }
        Commands::Repl => repl()?,
    }
    Ok(())
}

fn repl() -> miette::Result<()> {
    let mut session = Session::new();
    let mut lines = stdin().lock().lines();
    loop {
        println!("{}", session.view());
        stdout()
            .flush()
            .into_diagnostic()
            .wrap_err("flushing stdout failed")?;

        let events: Vec<Event> = match lines.next() {
            None => vec![Event::Quit],
            Some(line) => {
                let line = line.into_diagnostic().wrap_err("reading stdin failed")?;
                match line.trim() {
                    "quit" | "exit" => vec![Event::Quit],
                    _ => line
                        .chars()
                        .map(|c| Event::Edit(Edit::Insert(c)))
                        .chain([Event::Submit])
                        .collect(),
                }
            }
        };

        for event in events {
            session = match session.update(event) {
                Step::Continue(session) => session,
                Step::Quit => return Ok(()),
            };
        }
    }
}

use clap::Parser;
use dirs::home_dir;
use log::{debug, info};
use loxwalk::{
    cli::{Args, Commands},
    error::{Reporter, Result, StderrReporter},
    parser::parse,
    repl::{REPLPrompt, REPLValidator, SyntaxHighlighter},
    session::{Session, Status},
    tokenizer::tokenize,
};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use std::{fs, io, path::{Path, PathBuf}, process::ExitCode};

const EXIT_USAGE: u8 = 64;
const EXIT_NO_INPUT: u8 = 66;

fn read_source(file: &Path) -> Option<String> {
    fs::read_to_string(file)
        .inspect_err(|err| {
            eprintln!("{}: {}", file.display(), err);
        })
        .ok()
}

fn run_file(file: PathBuf) -> ExitCode {
    let Some(source) = read_source(&file) else {
        return ExitCode::from(EXIT_NO_INPUT);
    };

    let mut session = Session::new(io::stdout(), StderrReporter);
    let status = session.run(&source);
    debug!("status: {:?}", status);

    exit_code(status)
}

fn check_file(file: PathBuf) -> ExitCode {
    let Some(source) = read_source(&file) else {
        return ExitCode::from(EXIT_NO_INPUT);
    };

    let (tokens, lex_errors) = tokenize(&source);
    for token in &tokens {
        println!(
            "{:>4} {:<12} {}",
            token.line,
            format!("{:?}", token.token_type),
            token.lexeme
        );
    }

    let (statements, parse_errors) = parse(&tokens);
    for stmt in &statements {
        println!("{}", stmt);
    }

    let mut reporter = StderrReporter;
    for err in lex_errors.iter().chain(parse_errors.iter()) {
        reporter.report(err);
    }

    if lex_errors.is_empty() && parse_errors.is_empty() {
        exit_code(Status::Ok)
    } else {
        exit_code(Status::StaticError)
    }
}

fn run_repl() -> Result<()> {
    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray)),
        ))
        .with_highlighter(Box::new(SyntaxHighlighter))
        .with_validator(Box::new(REPLValidator));

    // Add file-backed history if possible
    if let Some(history) = home_dir()
        .map(|home| home.join(".loxwalk_history"))
        .and_then(|path| FileBackedHistory::with_file(100, path).ok())
        .map(Box::new)
    {
        line_editor = line_editor.with_history(history);
    } else {
        eprintln!("NOTE: Failed to load history. Persistence is now disabled.")
    }

    let prompt = REPLPrompt;
    let mut session = Session::new(io::stdout(), StderrReporter);

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                let status = session.run_interactive(&buffer);
                debug!("status: {:?}", status);
            }
            Signal::CtrlD | Signal::CtrlC => {
                break Ok(());
            }
        }
    }
}

fn exit_code(status: Status) -> ExitCode {
    ExitCode::from(status.exit_code())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let usage_error = err.use_stderr();
            err.print().ok();
            return if usage_error {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match args.command {
        Some(Commands::Run { file }) => {
            info!("FILE MODE");
            debug!("file: {:?}", file);

            run_file(file)
        }
        Some(Commands::Check { file }) => {
            info!("CHECK MODE");
            debug!("file: {:?}", file);

            check_file(file)
        }
        Some(Commands::Repl) | None => {
            info!("REPL MODE");

            match run_repl() {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

use std::{fs::read_to_string, io::Read, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};

use catam::{error::Error, eval::evaluate, optimizer::optimize};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(value_enum)]
    operation: Operation,

    /// Source file to read; stdin when omitted.
    source_file: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Operation {
    /// Parse source, displaying the combinator tree on stdout
    Parse,
    /// Parse and optimize source, displaying the rewritten tree on stdout
    Optimize,
    /// Parse, optimize and evaluate source, displaying the final value on stdout
    Evaluate,
}

fn read_input(source_file: Option<&PathBuf>) -> Result<(String, String), String> {
    match source_file {
        Some(path) => {
            let input = read_to_string(path)
                .map_err(|error| format!("failed to read {}: {}", path.display(), error))?;
            Ok((path.to_string_lossy().into_owned(), input))
        }
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|error| format!("failed to read stdin: {}", error))?;
            Ok(("<stdin>".to_owned(), input))
        }
    }
}

fn run_pipeline(operation: Operation, source_name: &str, input: &str) -> Result<(), Error> {
    let term = catam::parser::Parser::new(source_name, input)?.parse()?;

    match operation {
        Operation::Parse => println!("{term:#?}"),
        Operation::Optimize => println!("{:#?}", optimize(term)),
        Operation::Evaluate => {
            let optimized = optimize(term);
            println!("{}", evaluate(&optimized));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (source_name, input) = match read_input(cli.source_file.as_ref()) {
        Ok(read) => read,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run_pipeline(cli.operation, &source_name, &input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error.report(&input);
            ExitCode::FAILURE
        }
    }
}

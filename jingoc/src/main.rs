mod cli;
mod repl;

use std::path::PathBuf;

use clap::Parser;
use jingo_core::{
    eval::run,
    lexer::prelude::tokenize,
    parser::prelude::parse,
    runtime::prelude::{Value, ValueKind},
    utils::prelude::Error,
};

#[derive(Parser)]
enum Command {
    /// Evaluates a jingo source file
    Run {
        /// Path of source file
        path: PathBuf,
        /// Print the parsed tree instead of evaluating it
        #[arg(long, default_value_t = false)]
        print_ast: bool,
        /// Do not print the program result
        #[arg(short, long, default_value_t = false)]
        no_output: bool,
    },
    /// Runs the interactive Read Eval Print Loop
    Repl,
}

fn main() {
    ctrlc::set_handler(|| {
        println!();
        std::process::exit(0);
    }).expect("setting Ctrl-C handler");

    match Command::parse() {
        Command::Run { path, print_ast, no_output } => {
            let source_name = path.display().to_string();

            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(err) => {
                    print_error(&Error::StdIo { err: err.kind() });
                    return;
                }
            };

            if print_ast {
                return print_parsed(&source_name, &source);
            }

            cli::print_running(&source_name);
            let start = std::time::Instant::now();

            match run(&source_name, &source) {
                Ok(Some(value)) => {
                    if !no_output {
                        println!("{}", display_result(&value));
                    }
                },
                Ok(None) => {},
                Err(err) => print_error(&err),
            }

            cli::print_finished(std::time::Instant::now() - start);
        },
        Command::Repl => {
            let _ = repl::start();
        }
    }
}

fn print_parsed(source_name: &str, source: &str) {
    let tokens = match tokenize(source_name, source) {
        Ok(tokens) => tokens,
        Err(err) => return print_error(&Error::Lexical(err)),
    };

    match parse(tokens) {
        Ok(ast) => println!("{ast}"),
        Err(err) => print_error(&Error::Parse(err)),
    }
}

pub(crate) fn print_error(err: &Error) {
    let buf_writer = cli::stderr_buffer_writer();
    let mut buf = buf_writer.buffer();

    err.pretty(&mut buf);

    use std::io::Write;
    writeln!(buf).expect("write error newline");

    buf_writer
        .print(&buf)
        .expect("Writing error to stderr");
}

// A single-statement program reads better without its enclosing result
// list.
pub(crate) fn display_result(value: &Value) -> String {
    if let ValueKind::List(elements) = &value.kind {
        let elements = elements.borrow();

        if elements.len() == 1 {
            return elements[0].to_string();
        }
    }

    value.to_string()
}

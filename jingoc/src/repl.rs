use std::io::Write;

use jingo_core::eval::{global_context, run_in_context};

const PROMPT: &str = "jingo > ";

pub fn start() -> std::io::Result<()> {
    let stdin = std::io::stdin();

    // One shared global frame, so bindings carry from line to line.
    let context = global_context();

    loop {
        let mut input = String::from("");

        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        if stdin.read_line(&mut input)? == 0 {
            return Ok(());
        }

        if let Some('\n') = input.chars().next_back() {
            input.pop();
        }
        if let Some('\r') = input.chars().next_back() {
            input.pop();
        }

        match input.trim() {
            "" => {},
            ".exit" => return Ok(()),
            _ => {
                match run_in_context("<stdin>", &input, &context) {
                    Ok(Some(value)) => println!("{}", crate::display_result(&value)),
                    Ok(None) => {},
                    Err(err) => crate::print_error(&err),
                }
            }
        }
    }
}

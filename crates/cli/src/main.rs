use std::process::ExitCode;

fn main() -> ExitCode {
    tidyquote_cli::run()
}

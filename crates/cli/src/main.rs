use std::process::ExitCode;

fn main() -> ExitCode {
    railrefund_cli::run()
}

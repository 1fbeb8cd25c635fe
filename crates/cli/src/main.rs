use std::process::ExitCode;

fn main() -> ExitCode {
    margin_cli::run()
}

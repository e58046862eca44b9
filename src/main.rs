use colored::Colorize;
use std::process;

fn main() {
    if let Err(e) = taskmark::cli::run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(taskmark::cli::exit_code(&e));
    }
}

mod cli;
mod commands;
mod infra;
mod seed;

use medwatch::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}

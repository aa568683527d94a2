mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod spreadsheets;

use cabinet::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

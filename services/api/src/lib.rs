mod cli;
mod infra;
mod routes;
mod search;
mod server;

use tech_directory::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

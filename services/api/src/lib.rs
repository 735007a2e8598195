mod cli;
mod infra;
mod offline;
mod routes;
mod server;

use brand_check::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

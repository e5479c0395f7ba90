use crate::{cli::actions::backend::Backend, stub};
use anyhow::Result;
use tracing::warn;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend: Backend,
}

/// Execute the serve action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    if args.backend.api_base_url.is_some() {
        warn!("--api-base-url is ignored by serve, the stub always uses the simulated backend");
    }
    stub::serve(args.port, args.backend.simulated()).await
}

use crate::cli::actions::{login, serve, verify, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Verify(args) => verify::execute(args).await,
        Action::Serve(args) => serve::execute(args).await,
    }
}

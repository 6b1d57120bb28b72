use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_health;

pub(crate) async fn handle_health(ctx: &AppContext) -> CliResult<()> {
    let health = ctx.api.health().await.map_err(CliError::failure)?;
    println!("{}", render_health(&health, ctx.output)?);
    Ok(())
}

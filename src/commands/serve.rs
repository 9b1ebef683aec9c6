use crate::api::Mode;
use crate::commands::Out;
use crate::{server, Config, Result};

/// Runs the HTTP server that backs the dashboard. Does not return until the server stops.
pub async fn serve(config: Config, mode: Mode, port: Option<u16>) -> Result<Out<()>> {
    let port = port.unwrap_or_else(|| config.port());
    server::serve(config, mode, port).await?;
    Ok("Server stopped".into())
}

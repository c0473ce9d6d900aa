use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Installs the stderr subscriber. Stdout carries the translation, so logs
/// never go there. Quiet unless `verbose` is set.
pub fn init(verbose: bool) -> Result<()> {
    if !verbose {
        return Ok(());
    }
    install(Level::DEBUG);
    Ok(())
}

/// Server mode always logs requests at info level.
pub fn init_server(verbose: bool) -> Result<()> {
    install(if verbose { Level::DEBUG } else { Level::INFO });
    Ok(())
}

fn install(level: Level) {
    let _ = fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

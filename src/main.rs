use anyhow::Result;

fn main() -> Result<()> {
    // Route log::*! output to stderr, filtered by RUST_LOG.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::debug!("wez-conf {}", wez_conf::VERSION);

    let code = wez_conf::cli::run()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

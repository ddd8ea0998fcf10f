use anyhow::{Context, Result};
use salmon_core::search::SearchConfig;
use salmon_core::uci::UciHandler;

fn main() -> Result<()> {
    env_logger::init();

    let mut config = SearchConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--depth" => {
                let value = args.next().context("--depth needs a value")?;
                config.max_depth = value
                    .parse()
                    .with_context(|| format!("bad depth '{}'", value))?;
            }
            other => anyhow::bail!("unknown argument '{}'", other),
        }
    }

    let mut uci = UciHandler::with_config(config);
    uci.run()
}

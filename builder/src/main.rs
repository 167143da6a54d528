use std::env;

use vellum_builder::{Manifest, Strategy, build};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let name = &args[0];

    let mut strategy = Strategy::Builtin;
    for arg in &args[1..] {
        match arg.as_str() {
            "--formatter" => strategy = Strategy::Formatter,
            _ => anyhow::bail!("unknown argument `{arg}`\n{}", help(name)),
        }
    }

    let manifest = Manifest::load()?;

    log::info!("vellum build start");
    build(manifest, strategy)?;
    log::info!("vellum build done");

    Ok(())
}

fn help(name: &str) -> String {
    format!("Usage: {} [--formatter]", name)
}

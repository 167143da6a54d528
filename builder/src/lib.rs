mod blocks;
mod builder;
mod bundle;
mod config;
mod minify;
mod variants;

pub use config::Manifest;
pub use minify::Strategy;

pub fn build(manifest: Manifest, strategy: Strategy) -> anyhow::Result<()> {
    let builder = builder::Builder::new(manifest, strategy);
    builder.build()?;
    Ok(())
}

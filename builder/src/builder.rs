use std::{fs, path::PathBuf};

use anyhow::Context as _;

use crate::{
    bundle,
    config::{self, Manifest},
    minify::{self, Strategy},
    variants,
};

pub struct Builder {
    manifest: Manifest,
    strategy: Strategy,
}

impl Builder {
    pub fn new(manifest: Manifest, strategy: Strategy) -> Self {
        Self { manifest, strategy }
    }

    pub fn build(&self) -> anyhow::Result<()> {
        let out_dir = &self.manifest.out_dir;
        log::info!("create output dir: {}", out_dir.display());
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;

        self.build_bundle("utilities", &self.manifest.utilities, config::UTILITIES_CSS);
        self.build_bundle("components", &self.manifest.components, config::COMPONENTS_CSS);
        self.build_bundle("full framework", &self.manifest.full_bundle(), config::FRAMEWORK_CSS);

        log::info!("minify full bundle");
        if let Err(err) = minify::minify_file(
            self.strategy,
            out_dir.join(config::FRAMEWORK_CSS),
            out_dir.join(config::FRAMEWORK_MIN_CSS),
        ) {
            log::error!("failed to minify full bundle: {err:#}");
        }

        self.expand_variants()?;

        self.report_sizes();

        Ok(())
    }

    /// Aggregate one ordered file list into one output file. A write
    /// failure is logged; the remaining bundles are still attempted.
    fn build_bundle(&self, label: &str, paths: &[PathBuf], file_name: &str) {
        let out_path = self.manifest.out_dir.join(file_name);
        log::info!("build {label} ({} files) -> {}", paths.len(), out_path.display());

        let output = bundle::aggregate(paths);

        match bundle::write_bundle(&out_path, &output) {
            Ok(()) => log::info!(
                "wrote {} ({} blocks from {} files)",
                out_path.display(),
                output.kept(),
                output.files_read
            ),
            Err(err) => log::error!("{err:#}"),
        }
    }

    /// Expand the base stylesheet into the variant matrix and the style
    /// lookup table. A missing base file aborts the build.
    fn expand_variants(&self) -> anyhow::Result<()> {
        let base = &self.manifest.base;
        log::info!("expand variants from: {}", base.display());

        let source = fs::read_to_string(base)
            .with_context(|| format!("failed to read base stylesheet: {}", base.display()))?;

        let rules = variants::parse_base_rules(&source);
        log::info!("expanding {} base rules", rules.len());

        let expansion = variants::expand(&rules);

        let css_path = self.manifest.out_dir.join(config::VARIANTS_CSS);
        fs::write(&css_path, &expansion.css)
            .with_context(|| format!("failed to write {}", css_path.display()))?;

        let json_path = self.manifest.out_dir.join(config::STYLES_JSON);
        let json = serde_json::to_string_pretty(&expansion.styles)?;
        fs::write(&json_path, json)
            .with_context(|| format!("failed to write {}", json_path.display()))?;

        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn report_sizes(&self) {
        let artifacts = [
            config::FRAMEWORK_CSS,
            config::FRAMEWORK_MIN_CSS,
            config::UTILITIES_CSS,
            config::COMPONENTS_CSS,
            config::VARIANTS_CSS,
        ];

        log::info!("build size summary:");
        let mut sizes = [0_u64; 5];
        for (size, name) in sizes.iter_mut().zip(artifacts) {
            let path = self.manifest.out_dir.join(name);
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            *size = meta.len();
            log::info!("  {name}: {:.1} KB", meta.len() as f64 / 1024.0);
        }

        let (full, min) = (sizes[0], sizes[1]);
        if full > 0 && min > 0 {
            let saved = 100.0 - (min as f64 / full as f64) * 100.0;
            log::info!("  minified is {saved:.0}% smaller");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write_file(path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn test_manifest(root: &Path) -> Manifest {
        write_file(
            root.join("src/tokens.css"),
            ":root {\n  --accent: #123456;\n}\n",
        );
        write_file(
            root.join("src/utilities.css"),
            ":root {\n  --accent: #123456;\n}\n\n.m-0 {\n  margin: 0;\n}\n",
        );
        write_file(
            root.join("src/components/reset.css"),
            ".reset {\n  all: unset;\n}\n",
        );
        write_file(
            root.join("src/components/cards.css"),
            ".card {\n  border-radius: 4px;\n}\n",
        );
        write_file(root.join("src/base.css"), ".btn { padding: 4px; }\n");

        Manifest {
            out_dir: root.join("dist"),
            utilities: vec![root.join("src/tokens.css"), root.join("src/utilities.css")],
            components: vec![
                root.join("src/components/reset.css"),
                root.join("src/components/cards.css"),
            ],
            base: root.join("src/base.css"),
        }
    }

    #[test]
    fn build_produces_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_manifest(dir.path());
        let out_dir = manifest.out_dir.clone();

        Builder::new(manifest, Strategy::Builtin).build().unwrap();

        for name in [
            config::UTILITIES_CSS,
            config::COMPONENTS_CSS,
            config::FRAMEWORK_CSS,
            config::FRAMEWORK_MIN_CSS,
            config::VARIANTS_CSS,
            config::STYLES_JSON,
        ] {
            assert!(out_dir.join(name).exists(), "missing artifact: {name}");
        }
    }

    #[test]
    fn full_bundle_dedups_and_filters_scaffolding() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_manifest(dir.path());
        let out_dir = manifest.out_dir.clone();

        Builder::new(manifest, Strategy::Builtin).build().unwrap();

        let full = fs::read_to_string(out_dir.join(config::FRAMEWORK_CSS)).unwrap();
        // the shared `:root` block appears once
        assert_eq!(full.matches("--accent").count(), 1);
        // reset.css is scaffolding, filtered out of the full bundle
        assert!(!full.contains(".reset"));
        assert!(full.contains(".card"));

        // per-bundle registries: the component bundle still has it
        let components = fs::read_to_string(out_dir.join(config::COMPONENTS_CSS)).unwrap();
        assert!(components.contains(".reset"));
    }

    #[test]
    fn minified_bundle_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_manifest(dir.path());
        let out_dir = manifest.out_dir.clone();

        Builder::new(manifest, Strategy::Builtin).build().unwrap();

        let min = fs::read_to_string(out_dir.join(config::FRAMEWORK_MIN_CSS)).unwrap();
        assert!(!min.contains('\n'));
        assert!(min.contains(".card{border-radius:4px}"));
    }

    #[test]
    fn variants_and_styles_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = test_manifest(dir.path());
        let out_dir = manifest.out_dir.clone();

        Builder::new(manifest, Strategy::Builtin).build().unwrap();

        let variants = fs::read_to_string(out_dir.join(config::VARIANTS_CSS)).unwrap();
        assert!(variants.contains(".hover-btn:hover { padding: 4px; }"));
        assert!(variants.contains("@media (min-width: 1536px) {"));

        let styles: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(config::STYLES_JSON)).unwrap())
                .unwrap();
        assert_eq!(styles["btn"]["padding"], "4px");
    }

    #[test]
    fn missing_base_stylesheet_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = test_manifest(dir.path());
        manifest.base = dir.path().join("nope.css");

        let result = Builder::new(manifest, Strategy::Builtin).build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_fragments_do_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = test_manifest(dir.path());
        manifest.utilities.push(dir.path().join("gone.css"));
        let out_dir = manifest.out_dir.clone();

        Builder::new(manifest, Strategy::Builtin).build().unwrap();
        assert!(out_dir.join(config::UTILITIES_CSS).exists());
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::Deserialize;

pub const MANIFEST_FILE: &str = "vellum.yaml";

pub const UTILITIES_CSS: &str = "utilities.css";
pub const COMPONENTS_CSS: &str = "components.css";
pub const FRAMEWORK_CSS: &str = "vellum.css";
pub const FRAMEWORK_MIN_CSS: &str = "vellum.min.css";
pub const VARIANTS_CSS: &str = "vellum-variants.css";
pub const STYLES_JSON: &str = "vellum-styles.json";

/// Component files that only scaffold the component bundle; the full
/// bundle already gets their content through the utility half.
const EXCLUDED_COMPONENT_FILES: [&str; 4] =
    ["reset.css", "variables.css", "base.css", "color-tokens.css"];

/// Bundle membership: which fragments make up each bundle, in order,
/// plus the expander's base stylesheet and the output directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    pub utilities: Vec<PathBuf>,
    pub components: Vec<PathBuf>,
    pub base: PathBuf,
}

impl Manifest {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open manifest: {}", path.display()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Read `vellum.yaml` when present, else fall back to the built-in
    /// bundle lists.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new(MANIFEST_FILE);
        if path.exists() {
            log::info!("read manifest from: {}", path.display());
            Self::from_file(path)
        } else {
            log::info!("no {MANIFEST_FILE}, using built-in manifest");
            Ok(Self::default())
        }
    }

    /// The full-framework file list: utilities plus components, with
    /// scaffolding component files filtered out.
    pub fn full_bundle(&self) -> Vec<PathBuf> {
        let components = self
            .components
            .iter()
            .filter(|path| !is_excluded_component(path))
            .cloned();

        self.utilities.iter().cloned().chain(components).collect()
    }
}

fn is_excluded_component(path: &Path) -> bool {
    EXCLUDED_COMPONENT_FILES
        .iter()
        .any(|name| path.ends_with(Path::new("components").join(name)))
}

fn default_out_dir() -> PathBuf {
    "dist".into()
}

impl Default for Manifest {
    fn default() -> Self {
        let utilities = [
            "src/tokens/color-tokens.css",
            "src/utilities/variables.css",
            "src/utilities/reset.css",
            "src/utilities/normalize.css",
            "src/utilities/base.css",
            "src/utilities/variants.css",
        ];

        let components = [
            "src/tokens/color-tokens.css",
            "src/components/reset.css",
            "src/components/variables.css",
            "src/components/base.css",
            "src/components/accordions.css",
            "src/components/alerts.css",
            "src/components/avatars.css",
            "src/components/badges.css",
            "src/components/breadcrumbs.css",
            "src/components/buttons.css",
            "src/components/cards.css",
            "src/components/carousel.css",
            "src/components/chips.css",
            "src/components/columns.css",
            "src/components/containers.css",
            "src/components/datepicker.css",
            "src/components/divider.css",
            "src/components/drawer.css",
            "src/components/dropdown.css",
            "src/components/file-uploads.css",
            "src/components/footer.css",
            "src/components/forms.css",
            "src/components/form-elements.css",
            "src/components/gallery.css",
            "src/components/grids.css",
            "src/components/hero.css",
            "src/components/input-group.css",
            "src/components/lazy-load.css",
            "src/components/list.css",
            "src/components/megamenu.css",
            "src/components/modals.css",
            "src/components/navbar.css",
            "src/components/notifications.css",
            "src/components/paginations.css",
            "src/components/popovers.css",
            "src/components/pricing.css",
            "src/components/progress-bars.css",
            "src/components/range-slider.css",
            "src/components/rating.css",
            "src/components/searchfilter.css",
            "src/components/sidebar.css",
            "src/components/skeleton.css",
            "src/components/spinners.css",
            "src/components/stats.css",
            "src/components/stepper.css",
            "src/components/sticky.css",
            "src/components/tables.css",
            "src/components/textarea.css",
            "src/components/tabs.css",
            "src/components/theme-switcher.css",
            "src/components/timeline.css",
            "src/components/tooltips.css",
            "src/components/visibility.css",
        ];

        Self {
            out_dir: default_out_dir(),
            utilities: utilities.iter().map(PathBuf::from).collect(),
            components: components.iter().map(PathBuf::from).collect(),
            base: "src/utilities/base.css".into(),
        }
    }
}

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::blocks::{self, BlockKind};

/// Result of one aggregation run: the surviving block contents in
/// first-occurrence order, plus how many input files were actually read.
#[derive(Debug, Default)]
pub struct BundleOutput {
    pub blocks: Vec<String>,
    pub files_read: usize,
}

impl BundleOutput {
    pub fn kept(&self) -> usize {
        self.blocks.len()
    }

    pub fn to_css(&self) -> String {
        self.blocks.join("\n\n")
    }
}

/// Read every path in order, tokenize it, and keep each block the first
/// time its trimmed content is seen.
///
/// Imports are deduplicated against their own registry; comments and
/// rules share one. A path listed twice is read once. A missing or
/// unreadable file is logged and skipped; it does not abort the run.
pub fn aggregate(paths: &[PathBuf]) -> BundleOutput {
    let mut seen_rules: HashSet<String> = HashSet::new();
    let mut seen_imports: HashSet<String> = HashSet::new();
    let mut output = BundleOutput::default();

    for path in unique_paths(paths) {
        if !path.exists() {
            log::warn!("missing file: {}", path.display());
            continue;
        }

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                log::error!("failed to read {}: {}", path.display(), err);
                continue;
            }
        };
        log::info!("read {}", path.display());

        for block in blocks::tokenize(&source) {
            let key = block.content;
            if key.is_empty() {
                continue;
            }

            match block.kind {
                BlockKind::Import => {
                    if seen_imports.insert(key.clone()) {
                        output.blocks.push(key);
                    }
                }
                BlockKind::Comment => {
                    if seen_rules.insert(key.clone()) {
                        output.blocks.push(key);
                    }
                }
                BlockKind::Rule | BlockKind::AtRule => {
                    if !is_empty_rule(&key) && seen_rules.insert(key.clone()) {
                        output.blocks.push(key);
                    }
                }
            }
        }

        output.files_read += 1;
    }

    output
}

pub fn write_bundle(path: impl AsRef<Path>, output: &BundleOutput) -> anyhow::Result<()> {
    let path = path.as_ref();
    fs::write(path, output.to_css())
        .with_context(|| format!("failed to write bundle: {}", path.display()))
}

fn unique_paths(paths: &[PathBuf]) -> Vec<&PathBuf> {
    let mut seen: HashSet<&Path> = HashSet::new();
    paths.iter().filter(|p| seen.insert(p.as_path())).collect()
}

/// A rule whose body between the first `{` and the next `}` is blank
/// once comments are removed carries nothing and is dropped.
fn is_empty_rule(content: &str) -> bool {
    let cleaned = strip_comments(content);

    let Some(open) = cleaned.find('{') else {
        return false;
    };
    if open == 0 {
        return false;
    }
    let Some(len) = cleaned[open + 1..].find('}') else {
        return false;
    };

    cleaned[open + 1..open + 1 + len].trim().is_empty()
}

fn strip_comments(input: &str) -> String {
    let without_blocks = blocks::strip_block_comments(input);

    let mut out = String::with_capacity(without_blocks.len());
    for (i, line) in without_blocks.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match line.find("//") {
            Some(pos) => out.push_str(&line[..pos]),
            None => out.push_str(line),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn dedups_across_files_keeping_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(
            dir.path(),
            "a.css",
            ".x {\n  color: red;\n}\n\n.x {\n  color: red;\n}\n",
        );
        let b = write_file(dir.path(), "b.css", ".x {\n  color: red;\n}\n");

        let output = aggregate(&[a, b]);

        assert_eq!(output.files_read, 2);
        assert_eq!(output.blocks, vec![".x {\n  color: red;\n}".to_string()]);
    }

    #[test]
    fn preserves_first_encounter_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.css", ".one {\n  color: red;\n}\n.two {\n  color: blue;\n}\n");
        let b = write_file(dir.path(), "b.css", ".two {\n  color: blue;\n}\n.three {\n  color: green;\n}\n");

        let output = aggregate(&[a, b]);

        let selectors: Vec<_> = output
            .blocks
            .iter()
            .map(|b| b.split_whitespace().next().unwrap().to_string())
            .collect();
        assert_eq!(selectors, vec![".one", ".two", ".three"]);
    }

    #[test]
    fn repeated_input_path_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.css", ".x {\n  color: red;\n}\n");

        let output = aggregate(&[a.clone(), a]);

        assert_eq!(output.files_read, 1);
        assert_eq!(output.kept(), 1);
    }

    #[test]
    fn missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.css", ".x {\n  color: red;\n}\n");
        let missing = dir.path().join("nope.css");

        let output = aggregate(&[missing, a]);

        assert_eq!(output.files_read, 1);
        assert_eq!(output.kept(), 1);
    }

    #[test]
    fn empty_rules_are_elided() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(
            dir.path(),
            "a.css",
            ".empty {\n}\n.full {\n  color: red;\n}\n.commented {\n  /* nothing */\n}\n",
        );

        let output = aggregate(&[a]);

        assert_eq!(output.blocks, vec![".full {\n  color: red;\n}".to_string()]);
    }

    #[test]
    fn imports_use_their_own_registry() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(
            dir.path(),
            "a.css",
            "@import \"x.css\";\n.a {\n  color: red;\n}\n",
        );
        let b = write_file(
            dir.path(),
            "b.css",
            "@import \"x.css\";\n.b {\n  color: blue;\n}\n",
        );

        let output = aggregate(&[a, b]);

        let imports = output.blocks.iter().filter(|b| b.starts_with("@import")).count();
        assert_eq!(imports, 1);
        assert_eq!(output.kept(), 3);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.css", ".x {\n  color: red;\n}\n\n.y {\n  color: blue;\n}\n");

        let first = aggregate(std::slice::from_ref(&a)).to_css();
        let second = aggregate(&[a]).to_css();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_rule_detection() {
        assert!(is_empty_rule(".a {\n}"));
        assert!(is_empty_rule(".a {\n  /* gone */\n}"));
        assert!(is_empty_rule(".a {\n  // gone\n}"));
        assert!(!is_empty_rule(".a {\n  color: red;\n}"));
        // no body at all is not "empty", it is just kept
        assert!(!is_empty_rule("color: red;"));
        assert!(!is_empty_rule("{ color: red; }"));
    }
}

//! SCSS compilation via grass.

use std::path::Path;

use anyhow::{Result, anyhow};

/// Compile SCSS source. `@import`/`@use` resolve against `load_dir`.
pub fn compile_scss(source: &str, load_dir: &Path) -> Result<String> {
    let options = grass::Options::default()
        .load_path(load_dir)
        .style(grass::OutputStyle::Expanded);
    grass::from_string(source.to_string(), &options).map_err(|e| anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compile_nested() {
        let dir = TempDir::new().unwrap();
        let css = compile_scss(".a { .b { color: red; } }", dir.path()).unwrap();
        assert!(css.contains(".a .b"));
    }

    #[test]
    fn test_compile_import_partial() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_vars.scss"), "$main: #333;").unwrap();
        let css = compile_scss("@import 'vars';\nbody { color: $main; }", dir.path()).unwrap();
        assert!(css.contains("#333"));
    }

    #[test]
    fn test_compile_error() {
        let dir = TempDir::new().unwrap();
        assert!(compile_scss("body { color: $undefined; }", dir.path()).is_err());
    }
}

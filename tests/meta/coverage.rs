//! Checks that the test tree mirrors `src/` and that every declared target exists

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Relative paths of every `.rs` file below `dir`
    fn rust_files(dir: &Path) -> io::Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();
        collect_rust_files(dir, dir, &mut files)?;
        Ok(files)
    }

    fn collect_rust_files(dir: &Path, base: &Path, files: &mut BTreeSet<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                collect_rust_files(&path, base, files)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                let relative = path
                    .strip_prefix(base)
                    .map_err(|e| io::Error::other(e.to_string()))?;
                files.insert(relative.to_path_buf());
            }
        }
        Ok(())
    }

    fn is_module_root(path: &Path) -> bool {
        matches!(
            path.file_name().and_then(|name| name.to_str()),
            Some("mod.rs" | "lib.rs" | "main.rs")
        )
    }

    /// `(section, key, value)` for every quoted `key = "value"` line of a target table
    fn target_entries(manifest: &str) -> Vec<(String, String, String)> {
        let mut section = String::new();
        let mut entries = Vec::new();

        for line in manifest.lines().map(str::trim) {
            if line.starts_with('[') {
                section = line.to_string();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if let Some(unquoted) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                entries.push((section.clone(), key.trim().to_string(), unquoted.to_string()));
            }
        }
        entries
    }

    // Tests every source module has a mirrored unit test file
    // Verified by adding a src file without a counterpart
    #[test]
    fn test_every_module_has_unit_tests() {
        let src = rust_files(Path::new("src")).expect("Failed to scan src");
        let unit = rust_files(Path::new("tests/unit")).expect("Failed to scan tests/unit");

        let missing: Vec<String> = src
            .iter()
            .filter(|path| !is_module_root(path) && !unit.contains(*path))
            .map(|path| format!("  - src/{0} -> tests/unit/{0}", path.display()))
            .collect();

        assert!(
            missing.is_empty(),
            "Source modules without unit tests:\n{}",
            missing.join("\n")
        );
    }

    // Tests no unit test file outlives the module it covers
    // Verified by renaming a src module
    #[test]
    fn test_no_orphaned_unit_tests() {
        let src = rust_files(Path::new("src")).expect("Failed to scan src");
        let unit = rust_files(Path::new("tests/unit")).expect("Failed to scan tests/unit");

        let orphaned: Vec<String> = unit
            .iter()
            .filter(|path| !is_module_root(path) && !src.contains(*path))
            .map(|path| format!("  - tests/unit/{}", path.display()))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files without a source module:\n{}",
            orphaned.join("\n")
        );
    }

    // Tests every non-module test file defines at least one test
    // Verified by emptying a unit test file
    #[test]
    fn test_test_files_contain_tests() {
        let tests_dir = Path::new("tests");
        let files = rust_files(tests_dir).expect("Failed to scan tests");

        let empty: Vec<String> = files
            .iter()
            .filter(|path| !is_module_root(path))
            .filter(|path| {
                fs::read_to_string(tests_dir.join(path))
                    .map(|content| !content.contains("#[test]"))
                    .unwrap_or(true)
            })
            .map(|path| format!("  - tests/{}", path.display()))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without any #[test] function:\n{}",
            empty.join("\n")
        );
    }

    // Tests test and bench targets in the manifest match files on disk
    // Verified by declaring a bench with no source file
    #[test]
    fn test_manifest_targets_exist() {
        let manifest = fs::read_to_string("Cargo.toml").expect("Failed to read Cargo.toml");
        let entries = target_entries(&manifest);

        let test_paths: Vec<&str> = entries
            .iter()
            .filter(|(section, key, _)| section == "[[test]]" && key == "path")
            .map(|(_, _, value)| value.as_str())
            .collect();
        assert!(test_paths.contains(&"tests/unit/mod.rs"));
        for path in &test_paths {
            assert!(Path::new(path).is_file(), "Declared test target {path} is missing");
        }

        let declared_benches: BTreeSet<PathBuf> = entries
            .iter()
            .filter(|(section, key, _)| section == "[[bench]]" && key == "name")
            .map(|(_, _, name)| PathBuf::from(format!("{name}.rs")))
            .collect();
        let bench_files = rust_files(Path::new("benches")).expect("Failed to scan benches");
        assert_eq!(declared_benches, bench_files);

        assert!(Path::new("tests/synthesis.rs").is_file());
    }
}

use anyhow::Context;
use std::fs;
use std::path::PathBuf;

fn tests_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("tests")
}

fn escape_path(path: &str) -> String {
    // Windows can't handle colons
    path.replace("::", "_")
}

/// Directory with domains and profiles shared by tests.
pub fn test_assets_dir() -> PathBuf {
    tests_dir().join("assets")
}

/// Path to profile file `file` of domain `domain` inside assets directory.
pub fn profile_path(domain: &str, file: &str) -> PathBuf {
    test_assets_dir().join(domain).join(file)
}

/// Creates empty working directory for test. Results of previous run are removed.
pub fn prepare_test_dir(dir_name: &str) -> anyhow::Result<PathBuf> {
    let test_dir: PathBuf = tests_dir()
        .join("test-workdir")
        .join(escape_path(dir_name).as_str());

    if test_dir.exists() {
        fs::remove_dir_all(&test_dir)
            .with_context(|| format!("Removing test directory: {}", test_dir.display()))?;
    }
    fs::create_dir_all(&test_dir)
        .with_context(|| format!("Creating test directory: {}", test_dir.display()))?;
    Ok(test_dir)
}

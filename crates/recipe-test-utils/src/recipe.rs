//! [`TestRecipe`] builder for recipe-resolver test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory holding a recipe, profiles and a fake
/// global config directory.
///
/// # Example
///
/// ```rust,no_run
/// use recipe_test_utils::{TestRecipe, fixtures};
///
/// let project = TestRecipe::new();
/// let manifest = project.write_manifest(fixtures::OPENCV);
/// let profile = project.write_profile("linux.toml", fixtures::LINUX_GCC_PROFILE);
/// assert!(manifest.is_file() && profile.is_file());
/// ```
pub struct TestRecipe {
    temp_dir: TempDir,
}

impl Default for TestRecipe {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRecipe {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a directory with `recipe.toml` already written.
    pub fn with_manifest(content: &str) -> Self {
        let recipe = Self::new();
        recipe.write_manifest(content);
        recipe
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Path of the recipe written by [`TestRecipe::write_manifest`].
    pub fn manifest_path(&self) -> PathBuf {
        self.path("recipe.toml")
    }

    /// Directory to pass as the global config directory override.
    ///
    /// Nothing is created until [`TestRecipe::write_default_profile`] is
    /// called, so by default no global profile exists.
    pub fn config_dir(&self) -> PathBuf {
        self.path("config")
    }

    /// Write `recipe.toml` and return its path.
    pub fn write_manifest(&self, content: &str) -> PathBuf {
        let path = self.manifest_path();
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a profile under `profiles/` and return its path.
    pub fn write_profile(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.path("profiles");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Write the global default profile inside [`TestRecipe::config_dir`].
    pub fn write_default_profile(&self, content: &str) -> PathBuf {
        let dir = self.config_dir().join("profiles");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("default.toml");
        fs::write(&path, content).unwrap();
        path
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let full_path = self.path(relative);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }
}

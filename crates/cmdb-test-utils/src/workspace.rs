//! [`TestWorkspace`] for scenarios that read config and model files.

use std::fs;
use std::path::{Path, PathBuf};

use cmdb_model::Model;
use tempfile::TempDir;

/// A temporary directory holding a `cmdb-sync.toml` and a model file.
///
/// # Example
///
/// ```rust,no_run
/// use cmdb_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_config("[servicenow]\nsite = \"https://x\"\n");
/// ws.init_model("Inventory");
/// assert!(ws.model_path().exists());
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("cmdb-sync.toml")
    }

    pub fn model_path(&self) -> PathBuf {
        self.root().join("model.json")
    }

    /// Write `cmdb-sync.toml`, returning its path
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.config_path();
        fs::write(&path, content).unwrap();
        path
    }

    /// Save an empty model named `name` at [`TestWorkspace::model_path`]
    pub fn init_model(&self, name: &str) -> Model {
        let model = Model::new(name);
        model.save(&self.model_path()).unwrap();
        model
    }

    pub fn load_model(&self) -> Model {
        Model::load(&self.model_path()).unwrap()
    }

    /// Read a file from the repository-level `test-fixtures/` directory
    pub fn fixture(relative: &str) -> String {
        let path = fixtures_dir().join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()))
    }
}

/// Absolute path of the repository-level `test-fixtures/` directory
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

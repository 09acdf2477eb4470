//! Shared setup for the sitegen integration tests.

// Not every helper is used by every test module
#![allow(dead_code)]

use sitegen_onboarding::homepages::HomepageService;
use sitegen_onboarding::store::{FileStore, MemoryStore, SessionStore};
use sitegen_onboarding::test_utils::{StubBackend, fixtures};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A service over an in-memory store and a fresh [`StubBackend`].
pub fn memory_service(seed: u64) -> (HomepageService, Arc<StubBackend>) {
    let backend = Arc::new(StubBackend::new());
    let service = HomepageService::with_seed(Arc::new(MemoryStore::new()), backend.clone(), seed);
    (service, backend)
}

/// A service with the sample prompt set and one batch generated.
pub async fn generated_service(seed: u64) -> (HomepageService, Arc<StubBackend>) {
    let (service, backend) = memory_service(seed);
    let prompt = fixtures::prompt();
    service.set_prompt(&prompt).await.unwrap();
    service.generate(&prompt, false).await.unwrap();
    (service, backend)
}

/// A temporary sitegen home: a config file pointing at a state directory
/// that has a parent theme installed.
pub struct TestHome {
    pub temp: TempDir,
    pub config_path: PathBuf,
    pub state_dir: PathBuf,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let state_dir = temp.path().join("state");
        fs::create_dir_all(&state_dir).unwrap();
        fixtures::install_parent_theme(&state_dir.join("themes"), "yith-wonder");

        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, format!("state_dir = '{}'\n", state_dir.display())).unwrap();

        Self {
            temp,
            config_path,
            state_dir,
        }
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.state_dir.join("themes")
    }

    /// The file store the CLI opens for `session`.
    pub fn store(&self, session: &str) -> Arc<dyn SessionStore> {
        Arc::new(FileStore::open(&self.state_dir, session).unwrap())
    }

    /// Populate `session` with the sample prompt, palettes and one batch.
    pub async fn seed(&self, session: &str) {
        let service =
            HomepageService::with_seed(self.store(session), Arc::new(StubBackend::new()), 3);
        let prompt = fixtures::prompt();
        service.set_prompt(&prompt).await.unwrap();
        service.generate(&prompt, false).await.unwrap();
    }

    /// A `sitegen` invocation against this home.
    pub fn sitegen(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("sitegen").unwrap();
        cmd.env_remove("SITEGEN_SESSION")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(&self.config_path)
            .arg("--no-progress");
        cmd
    }
}

pub fn read_to_string(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use notesai::commands::build_service_with_store;
use notesai::config::Config;
use notesai::service::NotesAiService;
use notesai::storage::SqliteNoteStore;

#[allow(dead_code)]
pub fn create_temp_store() -> (SqliteNoteStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("notes.db");
    let store =
        SqliteNoteStore::new_with_path(db_path).expect("failed to create sqlite store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config pointing the OpenAI-compatible provider at a mock server
#[allow(dead_code)]
pub fn mock_config(api_base: &str, user: Option<&str>) -> Config {
    let mut config = Config::default();
    config.provider.openai.api_base = api_base.to_string();
    config.provider.openai.model = "test-model".to_string();
    config.provider.openai.api_key = Some("sk-test".to_string());
    config.assistant.timeout_seconds = 5;
    config.identity.user_id = user.map(str::to_string);
    config
}

#[allow(dead_code)]
pub fn service_for(config: &Config, store: SqliteNoteStore) -> NotesAiService {
    build_service_with_store(config, Arc::new(store)).expect("failed to build service")
}

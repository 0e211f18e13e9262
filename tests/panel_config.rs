mod support;

use commit_review::config::{ConfigStore, KeyboardShortcuts, PanelConfig};
use commit_review::toolbar::ToolbarOrientation;

use support::TempDir;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn panel_config_defaults_to_vertical_toolbar_and_commit_shortcuts() {
    let config = PanelConfig::default();

    assert!(!config.toolbar_horizontal);
    assert_eq!(config.toolbar_orientation(), ToolbarOrientation::Vertical);
    assert_eq!(
        config.keyboard_shortcuts.commit,
        strings(&["cmd-enter", "ctrl-enter"])
    );
}

#[test]
fn panel_config_parses_without_any_fields() {
    let config: PanelConfig = toml::from_str("").expect("empty config should parse");
    assert_eq!(config, PanelConfig::default());
}

#[test]
fn panel_config_keeps_default_shortcuts_when_only_orientation_is_set() {
    let config: PanelConfig =
        toml::from_str("toolbar_horizontal = true\n").expect("partial config should parse");

    assert_eq!(config.toolbar_orientation(), ToolbarOrientation::Horizontal);
    assert_eq!(config.keyboard_shortcuts, KeyboardShortcuts::default());
}

#[test]
fn panel_config_reads_custom_commit_shortcuts() {
    let raw = "[keyboard_shortcuts]\ncommit = [\"alt-enter\"]\n";
    let config: PanelConfig = toml::from_str(raw).expect("shortcut override should parse");

    assert_eq!(config.keyboard_shortcuts.commit, strings(&["alt-enter"]));
}

#[test]
fn config_store_creates_default_file_on_first_load() {
    let dir = TempDir::new("config-first-load");
    let store = ConfigStore::at(dir.path().join("nested").join("config.toml"));

    let config = store
        .load_or_create_default()
        .expect("default config should be created");

    assert_eq!(config, PanelConfig::default());
    assert!(store.path().exists());
}

#[test]
fn config_store_round_trips_saved_preferences() {
    let dir = TempDir::new("config-round-trip");
    let store = ConfigStore::at(dir.path().join("config.toml"));
    let config = PanelConfig {
        toolbar_horizontal: true,
        keyboard_shortcuts: KeyboardShortcuts {
            commit: strings(&["cmd-k"]),
        },
    };

    store.save(&config).expect("config should save");
    let loaded = store
        .load_or_create_default()
        .expect("config should load");

    assert_eq!(loaded, config);
}

#[test]
fn config_store_reports_malformed_toml_with_the_path() {
    let dir = TempDir::new("config-malformed");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "toolbar_horizontal = \"sideways\"\n").expect("fixture should write");

    let err = ConfigStore::at(&path)
        .load_or_create_default()
        .expect_err("malformed config should fail");

    assert!(format!("{err:#}").contains(&path.display().to_string()));
}

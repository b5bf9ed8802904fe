//! Classification behavior against real directory trees.

use std::path::{Path, PathBuf};

use tscheck_core::{
    CheckError, CheckOptions, ConfigCache, build_invocations, classify_files, is_member,
};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dirs");
    }
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn empty_input_is_rejected() {
    let cache = ConfigCache::new();
    let result = classify_files(&cache, &[]);
    assert!(matches!(result, Err(CheckError::NoFilesSpecified)));
}

#[test]
fn no_config_anywhere_is_a_batch_level_condition() {
    let temp = tempfile::tempdir().expect("temp dir");
    let file = write_file(temp.path(), "src/main.ts", "export const x = 1;\n");

    let cache = ConfigCache::new();
    let result = classify_files(&cache, &[file]);
    assert!(matches!(result, Err(CheckError::NoConfigurationFound)));
}

#[test]
fn files_classify_to_their_nearest_config_without_references() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(root, "tsconfig.json", r#"{"include": ["src"]}"#);
    let a = write_file(root, "src/a.ts", "");
    let b = write_file(root, "src/deep/b.ts", "");

    let cache = ConfigCache::new();
    let classified = classify_files(&cache, &[a.clone(), b.clone()]).expect("classify");

    assert_eq!(classified.len(), 1);
    let group = &classified.groups()[0];
    assert_eq!(group.config.path, root.join("tsconfig.json"));
    assert_eq!(group.files, vec![a, b]);
}

#[test]
fn first_claiming_reference_wins_over_base_and_later_references() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(
        root,
        "tsconfig.json",
        r#"{
          "files": [],
          "references": [{"path": "./a"}, {"path": "./b"}],
        }"#,
    );
    write_file(root, "a/tsconfig.json", r#"{"files": ["lib.ts"]}"#);
    write_file(root, "a/lib.ts", "");
    write_file(root, "b/tsconfig.json", r#"{"files": ["../src/app.ts"]}"#);
    let app = write_file(root, "src/app.ts", "");

    let cache = ConfigCache::new();
    let classified = classify_files(&cache, &[app.clone()]).expect("classify");

    assert_eq!(classified.len(), 1);
    let group = &classified.groups()[0];
    assert_eq!(group.config.path, root.join("b/tsconfig.json"));
    assert_eq!(group.files, vec![app]);
}

#[test]
fn unclaimed_file_falls_back_to_the_nearest_config() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(
        root,
        "tsconfig.json",
        r#"{"include": ["src"], "references": [{"path": "./a"}]}"#,
    );
    write_file(root, "a/tsconfig.json", r#"{"files": ["lib.ts"]}"#);
    let orphan = write_file(root, "src/orphan.ts", "");

    let cache = ConfigCache::new();
    let classified = classify_files(&cache, &[orphan]).expect("classify");
    assert_eq!(classified.groups()[0].config.path, root.join("tsconfig.json"));
}

#[test]
fn membership_is_stable_across_path_spellings() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    let config = write_file(root, "tsconfig.json", r#"{"files": ["src/main.ts"]}"#);
    write_file(root, "src/main.ts", "");

    let cache = ConfigCache::new();
    let plain = root.join("src/main.ts");
    let dotted = root.join("src/./extra/../main.ts");
    assert!(is_member(&cache, &plain, &config).unwrap());
    assert!(is_member(&cache, &dotted, &config).unwrap());
    assert!(!is_member(&cache, &root.join("src/other.ts"), &config).unwrap());
}

#[test]
fn same_config_is_parsed_once_and_identity_stable() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    let config = write_file(root, "tsconfig.json", r#"{"include": ["src"]}"#);

    let cache = ConfigCache::new();
    let first = cache.resolve(&config).expect("first resolve");
    let second = cache.resolve(&config).expect("second resolve");

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn hundred_concurrent_files_trigger_a_single_parse() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(root, "tsconfig.json", r#"{"include": ["src"]}"#);

    let files: Vec<PathBuf> = (0..100).map(|i| root.join(format!("src/f{i}.ts"))).collect();

    let cache = ConfigCache::new();
    let classified = classify_files(&cache, &files).expect("classify");

    assert_eq!(classified.len(), 1);
    assert_eq!(classified.groups()[0].files.len(), 100);
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn two_projects_yield_two_single_file_invocations() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(root, "pkg1/tsconfig.json", r#"{"files": ["index.ts"]}"#);
    let one = write_file(root, "pkg1/index.ts", "");
    write_file(root, "pkg2/tsconfig.json", r#"{"files": ["index.ts"]}"#);
    let two = write_file(root, "pkg2/index.ts", "");

    let cache = ConfigCache::new();
    let classified = classify_files(&cache, &[one.clone(), two.clone()]).expect("classify");
    let invocations = build_invocations(&classified, &CheckOptions::default());

    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].config.path, root.join("pkg1/tsconfig.json"));
    assert_eq!(invocations[0].files, vec![one]);
    assert_eq!(invocations[1].config.path, root.join("pkg2/tsconfig.json"));
    assert_eq!(invocations[1].files, vec![two]);
}

#[test]
fn extended_config_inherits_the_base_member_set() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(root, "base.json", r#"{"files": ["src/entry.ts"]}"#);
    let config = write_file(root, "tsconfig.json", r#"{"extends": "./base.json"}"#);
    let entry = write_file(root, "src/entry.ts", "");
    write_file(root, "src/other.ts", "");

    let cache = ConfigCache::new();
    assert!(is_member(&cache, &entry, &config).unwrap());
    assert!(!is_member(&cache, &root.join("src/other.ts"), &config).unwrap());

    let classified = classify_files(&cache, &[entry.clone()]).expect("classify");
    let group = &classified.groups()[0];
    assert_eq!(group.config.path, config);
    assert_eq!(group.config.file_names, vec![entry]);
}

#[test]
fn mutually_extending_configs_are_a_cycle_error() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    let first = write_file(root, "a.json", r#"{"extends": "./b.json"}"#);
    write_file(root, "b.json", r#"{"extends": "./a.json"}"#);

    let cache = ConfigCache::new();
    match cache.resolve(&first) {
        Err(CheckError::ExtendsCycle { path }) => assert_eq!(path, first),
        other => panic!("expected ExtendsCycle, got {other:?}"),
    }
}

#[test]
fn empty_config_defaults_to_all_sources_except_node_modules() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    let config = write_file(root, "tsconfig.json", "{}");
    let top = write_file(root, "top.tsx", "");
    let nested = write_file(root, "src/app.ts", "");
    write_file(root, "node_modules/dep/index.ts", "");
    write_file(root, "src/notes.md", "");

    let cache = ConfigCache::new();
    let resolved = cache.resolve(&config).expect("resolve");
    assert_eq!(resolved.file_names, vec![nested.clone(), top.clone()]);
    assert!(is_member(&cache, &top, &config).unwrap());
    assert!(is_member(&cache, &nested, &config).unwrap());
    assert!(!is_member(&cache, &root.join("node_modules/dep/index.ts"), &config).unwrap());
}

#[test]
fn parse_errors_carry_the_offending_path() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    let config = write_file(root, "tsconfig.json", "{ not valid json at all");
    let file = write_file(root, "src/a.ts", "");

    let cache = ConfigCache::new();
    match classify_files(&cache, &[file]) {
        Err(CheckError::ConfigParse { path, .. }) => assert_eq!(path, config),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn lint_staged_command_lists_all_flags() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = temp.path();
    write_file(root, "tsconfig.json", r#"{"files": ["main.ts"]}"#);
    let main = write_file(root, "main.ts", "");

    let cache = ConfigCache::new();
    let classified = classify_files(&cache, &[main.clone()]).expect("classify");
    let options = CheckOptions {
        monorepo: true,
        keep_tmp: true,
        debug: true,
        trace: true,
        include: vec!["types/**/*.d.ts".to_string()],
        ..Default::default()
    };
    let invocations = build_invocations(&classified, &options);

    let command = invocations[0].to_command_string();
    assert!(command.starts_with("tscheck --project "));
    assert!(command.contains(&format!("--files {}", main.display())));
    assert!(command.contains("--include types/**/*.d.ts"));
    assert!(command.contains("--trace"));
    assert!(command.contains("--monorepo"));
    assert!(command.contains("--keepTmp"));
    assert!(command.contains("--debug"));
}

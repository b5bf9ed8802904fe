//! `tsconfig.json` parsing and member-file resolution.
//!
//! The accepted grammar is a JSON superset: `//` and `/* */` comments and
//! trailing commas are tolerated before the text is handed to serde. Only
//! the fields that drive classification are modeled (`extends`, `files`,
//! `include`, `exclude`, `references`); `compilerOptions` stays an opaque
//! JSON block so unknown checker options survive the round-trip into an
//! ephemeral configuration unchanged.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{CheckError, Result};

/// Canonical configuration filename this tool looks for.
pub const TSCONFIG_FILENAME: &str = "tsconfig.json";

/// Extensions the include globs pick up, mirroring tsc's supported set.
/// Explicit `files` entries are taken as-is regardless of extension.
const TS_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Directories tsc excludes when the config has no explicit `exclude`.
const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub references: Option<Vec<ProjectReference>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectReference {
    pub path: String,
}

/// A configuration file resolved to concrete absolute paths.
///
/// Values are immutable once constructed; the cache hands out shared
/// references and never mutates an entry after insertion.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Absolute, normalized path of the configuration file itself.
    pub path: PathBuf,
    /// Directory containing the configuration file.
    pub dir: PathBuf,
    /// The file's own raw document (post JSONC normalization, pre
    /// `extends` merging), kept for ephemeral-config synthesis.
    pub raw: Value,
    /// Member source files, absolute and normalized, `files` entries first
    /// and then glob-matched files in sorted order.
    pub file_names: Vec<PathBuf>,
    /// Referenced project configuration paths, in declaration order.
    pub references: Vec<PathBuf>,
    members: FxHashSet<PathBuf>,
}

impl ResolvedConfig {
    /// Whether `file` (absolute, normalized) is a declared member.
    pub fn contains(&self, file: &Path) -> bool {
        self.members.contains(file)
    }
}

/// Lexically normalize `path`, joining it onto `base` when relative.
///
/// `.` components are dropped and `..` pops the previous component; no
/// filesystem access and no symlink resolution, so the same input always
/// maps to the same key regardless of what is on disk.
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Parse JSONC source into the typed config plus its raw document.
pub fn parse_tsconfig(source: &str) -> serde_json::Result<(TsConfig, Value)> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let raw: Value = serde_json::from_str(&normalized)?;
    let config: TsConfig = serde_json::from_value(raw.clone())?;
    Ok((config, raw))
}

/// Read, parse, and fully resolve the configuration at `config_path`.
///
/// `config_path` must be absolute. The `extends` chain is followed only far
/// enough to inherit `files`/`include`/`exclude` (the member-set inputs);
/// compiler-option inheritance stays delegated to the external checker.
pub(crate) fn resolve_config(config_path: &Path) -> Result<ResolvedConfig> {
    let path = normalize_path(config_path, Path::new("/"));
    if !path.is_file() {
        return Err(CheckError::ConfigNotFound { path });
    }
    let dir = match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => return Err(CheckError::ConfigNotFound { path }),
    };

    let (own, raw) = read_config_file(&path)?;

    let references: Vec<PathBuf> = own
        .references
        .iter()
        .flatten()
        .map(|reference| {
            let mut target = normalize_path(Path::new(&reference.path), &dir);
            // A reference may point at a directory holding a tsconfig.json.
            if target.is_dir() {
                target.push(TSCONFIG_FILENAME);
            }
            target
        })
        .collect();

    let mut visited = FxHashSet::default();
    visited.insert(path.clone());
    let merged = merge_extends_chain(own, &path, &mut visited)?;

    let file_names = resolve_member_files(&merged, &path, &dir)?;
    let members = file_names.iter().cloned().collect();

    tracing::debug!(
        config = %path.display(),
        files = file_names.len(),
        references = references.len(),
        "resolved tsconfig"
    );

    Ok(ResolvedConfig {
        path,
        dir,
        raw,
        file_names,
        references,
        members,
    })
}

fn read_config_file(path: &Path) -> Result<(TsConfig, Value)> {
    let source = std::fs::read_to_string(path)
        .map_err(|err| CheckError::io(format!("failed to read {}", path.display()), err))?;
    parse_tsconfig(&source).map_err(|err| CheckError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Fold the `extends` chain into `config`, child fields winning per-field.
fn merge_extends_chain(
    mut config: TsConfig,
    config_path: &Path,
    visited: &mut FxHashSet<PathBuf>,
) -> Result<TsConfig> {
    let Some(extends) = config.extends.take() else {
        return Ok(config);
    };

    let base_path = resolve_extends_path(config_path, &extends);
    if !visited.insert(base_path.clone()) {
        return Err(CheckError::ExtendsCycle { path: base_path });
    }
    if !base_path.is_file() {
        return Err(CheckError::ConfigNotFound { path: base_path });
    }

    let (base, _) = read_config_file(&base_path)?;
    let base = merge_extends_chain(base, &base_path, visited)?;

    Ok(TsConfig {
        extends: None,
        compiler_options: config.compiler_options.or(base.compiler_options),
        files: config.files.or(base.files),
        include: config.include.or(base.include),
        exclude: config.exclude.or(base.exclude),
        // Project references are not inherited through extends.
        references: config.references,
    })
}

fn resolve_extends_path(config_path: &Path, extends: &str) -> PathBuf {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("/"));
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    normalize_path(&candidate, base_dir)
}

/// Expand `files` plus `include`/`exclude` globs into the concrete member
/// list. With neither `files` nor `include` present, tsc's default include
/// (`**/*` over the supported extensions) applies.
fn resolve_member_files(
    config: &TsConfig,
    config_path: &Path,
    base_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut members = Vec::new();
    let mut seen = FxHashSet::default();

    if let Some(files) = &config.files {
        for entry in files {
            let path = normalize_path(Path::new(entry), base_dir);
            if seen.insert(path.clone()) {
                members.push(path);
            }
        }
    }

    let include: Vec<String> = match (&config.files, &config.include) {
        (None, None) => vec!["**/*".to_string()],
        (_, Some(patterns)) => patterns.clone(),
        (Some(_), None) => Vec::new(),
    };
    if include.is_empty() {
        return Ok(members);
    }

    let include_set = build_glob_set(&include, config_path)?;
    let exclude_patterns = match &config.exclude {
        Some(patterns) => patterns.clone(),
        None => DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
    };
    let exclude_set = build_glob_set(&exclude_patterns, config_path)?;

    let mut matched = Vec::new();
    let walker = WalkDir::new(base_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            // Prune excluded directories instead of walking into them.
            if !entry.file_type().is_dir() {
                return true;
            }
            match relative_slash_path(entry.path(), base_dir) {
                Some(rel) if !rel.is_empty() => !exclude_set.is_match(&rel),
                _ => true,
            }
        });

    for entry in walker.filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_ts_extension(path) {
            continue;
        }
        let Some(rel) = relative_slash_path(path, base_dir) else {
            continue;
        };
        if include_set.is_match(&rel) && !exclude_set.is_match(&rel) {
            let normalized = normalize_path(path, base_dir);
            if seen.insert(normalized.clone()) {
                matched.push(normalized);
            }
        }
    }

    matched.sort();
    members.extend(matched);
    Ok(members)
}

fn build_glob_set(patterns: &[String], config_path: &Path) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        for expanded in expand_pattern(pattern) {
            // `*` must not cross directory separators; `**` handles that,
            // matching tsc's pattern semantics.
            let glob = GlobBuilder::new(&expanded)
                .literal_separator(true)
                .build()
                .map_err(|err| CheckError::InvalidGlob {
                    path: config_path.to_path_buf(),
                    pattern: pattern.clone(),
                    message: err.to_string(),
                })?;
            builder.add(glob);
        }
    }
    builder.build().map_err(|err| CheckError::InvalidGlob {
        path: config_path.to_path_buf(),
        pattern: patterns.join(","),
        message: err.to_string(),
    })
}

/// tsc treats a bare directory name like `src` as `src/**/*`; keep the
/// literal form too so patterns naming a single file keep working.
fn expand_pattern(pattern: &str) -> Vec<String> {
    let trimmed = pattern
        .trim()
        .trim_start_matches("./")
        .trim_end_matches('/');
    if trimmed.is_empty() {
        return vec!["**/*".to_string()];
    }
    if trimmed.contains('*') || trimmed.contains('?') {
        vec![trimmed.to_string()]
    } else {
        vec![trimmed.to_string(), format!("{trimmed}/**/*")]
    }
}

fn relative_slash_path(path: &Path, base_dir: &Path) -> Option<String> {
    let rel = path.strip_prefix(base_dir).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn has_ts_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TS_EXTENSIONS.contains(&ext))
}

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    in_line_comment = true;
                    continue;
                }
                Some('*') => {
                    chars.next();
                    in_block_comment = true;
                    continue;
                }
                _ => {}
            }
        }

        out.push(ch);
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == ',' {
            let mut lookahead = chars.clone();
            while let Some(&next) = lookahead.peek() {
                if next.is_whitespace() {
                    lookahead.next();
                } else {
                    break;
                }
            }
            if matches!(lookahead.peek(), Some('}') | Some(']')) {
                continue;
            }
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jsonc_with_comments_and_trailing_commas() {
        let input = r#"
        {
          // nearest project
          "compilerOptions": {
            "strict": true, /* inline */
            "noEmit": true,
          },
          "files": ["src/main.ts",],
        }
        "#;

        let (config, raw) = parse_tsconfig(input).expect("should parse JSONC");
        assert_eq!(config.files, Some(vec!["src/main.ts".to_string()]));
        let options = config.compiler_options.expect("compilerOptions missing");
        assert_eq!(options.get("strict"), Some(&Value::Bool(true)));
        assert!(raw.get("compilerOptions").is_some());
    }

    #[test]
    fn rejects_invalid_json_after_normalization() {
        assert!(parse_tsconfig("{ files: nope }").is_err());
    }

    #[test]
    fn normalize_path_resolves_dots_and_relative_segments() {
        let base = Path::new("/repo/packages/app");
        assert_eq!(
            normalize_path(Path::new("../lib/./tsconfig.json"), base),
            PathBuf::from("/repo/packages/lib/tsconfig.json")
        );
        assert_eq!(
            normalize_path(Path::new("/a/b/../c"), base),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn expand_pattern_treats_bare_directories_as_recursive() {
        assert_eq!(
            expand_pattern("src"),
            vec!["src".to_string(), "src/**/*".to_string()]
        );
        assert_eq!(expand_pattern("src/**/*.ts"), vec!["src/**/*.ts".to_string()]);
    }

    #[test]
    fn strip_jsonc_preserves_comment_like_text_in_strings() {
        let input = r#"{"a": "http://example.com", "b": "/* not a comment */"}"#;
        assert_eq!(strip_jsonc(input), input);
    }

    #[test]
    fn remove_trailing_commas_only_outside_strings() {
        let input = r#"{"a": [1, 2,], "b": "x,}",}"#;
        assert_eq!(remove_trailing_commas(input), r#"{"a": [1, 2], "b": "x,}"}"#);
    }
}

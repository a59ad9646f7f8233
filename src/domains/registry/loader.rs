//! Handler discovery and loading.
//!
//! `load` scans every configured directory, parses each manifest, binds it to
//! a compiled plugin or an external command, extracts its function
//! description and returns a complete snapshot. Any failing unit fails the
//! whole load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use super::error::RegistryError;
use super::manifest::{self, Manifest, SCAFFOLD_TEMPLATE};
use super::snapshot::{CommandSpec, Invoker, LoadedHandler, Snapshot};
use crate::core::config::{HandlerSource, HandlersConfig};
use crate::domains::handlers::PluginTable;
use crate::domains::schema::{ExtractOptions, HandlerDeclaration, extract};

/// File extension of handler manifests.
pub const HANDLER_EXTENSION: &str = "toml";

/// A discovered source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
}

/// Whether a path names a handler manifest.
pub fn is_handler_source(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(HANDLER_EXTENSION)
}

/// Handler name of a manifest: its file stem, suffixed with the source tag.
pub fn handler_name(path: &Path, tag: Option<&str>) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(match tag {
        Some(tag) => format!("{stem}-{tag}"),
        None => stem.to_string(),
    })
}

/// List every manifest in the configured directories.
///
/// Names are checked for case-insensitive collisions across all sources.
pub fn discover(config: &HandlersConfig) -> Result<Vec<Candidate>, RegistryError> {
    let mut candidates = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for source in &config.sources {
        for path in scan_source(source, config.recursive)? {
            let name = handler_name(&path, source.tag.as_deref()).ok_or_else(|| {
                RegistryError::invalid_handler(
                    path.display().to_string(),
                    "file name is not valid UTF-8",
                )
            })?;

            if let Some(first) = seen.insert(name.to_lowercase(), path.clone()) {
                return Err(RegistryError::DuplicateName {
                    name,
                    first,
                    second: path,
                });
            }

            candidates.push(Candidate { name, path });
        }
    }

    Ok(candidates)
}

fn scan_source(source: &HandlerSource, recursive: bool) -> Result<Vec<PathBuf>, RegistryError> {
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut paths = Vec::new();
    for entry in WalkDir::new(&source.dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source.dir.as_path()).to_path_buf();
            RegistryError::io(path, std::io::Error::other(e))
        })?;

        if entry.file_type().is_file() && is_handler_source(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

/// Load every handler in the configured directories into a new snapshot.
#[instrument(skip_all, fields(sources = config.sources.len()))]
pub fn load(config: &HandlersConfig, plugins: &PluginTable) -> Result<Snapshot, RegistryError> {
    let options = ExtractOptions {
        description_fallback: config.description_fallback.clone(),
    };

    let handlers = discover(config)?
        .into_iter()
        .map(|candidate| load_unit(candidate, config, plugins, &options))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Loaded {} handlers", handlers.len());
    Ok(Snapshot::from_handlers(handlers))
}

fn load_unit(
    candidate: Candidate,
    config: &HandlersConfig,
    plugins: &PluginTable,
    options: &ExtractOptions,
) -> Result<LoadedHandler, RegistryError> {
    let Candidate { name, path } = candidate;
    let invalid = |reason: String| RegistryError::invalid_handler(&name, reason);

    let mut text = fs::read_to_string(&path).map_err(|e| RegistryError::io(&path, e))?;

    if manifest::is_blank(&text) {
        if !config.scaffold_empty {
            return Err(invalid("handler file is empty".to_string()));
        }
        fs::write(&path, SCAFFOLD_TEMPLATE).map_err(|e| RegistryError::io(&path, e))?;
        info!("Scaffolded empty handler {} at {}", name, path.display());
        text = SCAFFOLD_TEMPLATE.to_string();
    }

    let manifest = Manifest::parse(&text).map_err(invalid)?;
    let invoke = manifest
        .invoke
        .ok_or_else(|| invalid("missing [invoke] table".to_string()))?;
    if invoke.timeout_secs == Some(0) {
        return Err(invalid("timeout_secs must be at least 1".to_string()));
    }

    let (declaration, invoker) = match (invoke.builtin, invoke.command) {
        (Some(key), None) => {
            if manifest.request.is_some() || manifest.response.is_some() {
                return Err(invalid(
                    "builtin handlers declare their request and response types in code"
                        .to_string(),
                ));
            }
            let plugin = plugins
                .get(&key)
                .ok_or_else(|| invalid(format!("unknown builtin '{key}'")))?;
            let declaration =
                HandlerDeclaration::from_plugin(&name, manifest.description, plugin.as_ref())?;
            (declaration, Invoker::Builtin(plugin))
        }
        (None, Some(command)) => {
            let mut parts = command.into_iter();
            let program = parts
                .next()
                .filter(|program| !program.trim().is_empty())
                .ok_or_else(|| invalid("command is empty".to_string()))?;

            let request = manifest
                .request
                .as_ref()
                .ok_or_else(|| invalid("command handlers must declare a [request] table".to_string()))?;
            let response = manifest
                .response
                .as_ref()
                .ok_or_else(|| invalid("command handlers must declare a [response] table".to_string()))?;

            let declaration = HandlerDeclaration {
                name: name.clone(),
                description: manifest.description,
                request: manifest::declared_fields(request).map_err(invalid)?,
                response: manifest::declared_fields(response).map_err(invalid)?,
            };
            let working_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();

            (
                declaration,
                Invoker::Command(CommandSpec {
                    program,
                    args: parts.collect(),
                    working_dir,
                }),
            )
        }
        (Some(_), Some(_)) => {
            return Err(invalid(
                "[invoke] names both a builtin and a command".to_string(),
            ));
        }
        (None, None) => {
            return Err(invalid(
                "[invoke] must name a builtin or a command".to_string(),
            ));
        }
    };

    let description = extract(&declaration, options)?;
    debug!("Loaded handler {} from {}", name, path.display());

    Ok(LoadedHandler {
        name,
        source: path,
        description,
        invoker,
        timeout: invoke.timeout_secs.map(Duration::from_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::schema::Primitive;
    use tempfile::TempDir;

    const HELLO: &str = "description = \"Greet person by name\"\n[invoke]\nbuiltin = \"greet\"\n";

    fn config_for(dir: &Path) -> HandlersConfig {
        HandlersConfig {
            sources: vec![HandlerSource::new(dir)],
            ..HandlersConfig::default()
        }
    }

    fn write(dir: &Path, file: &str, text: &str) {
        fs::write(dir.join(file), text).unwrap();
    }

    #[test]
    fn test_load_builtin_and_command() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "hello.toml", HELLO);
        write(
            dir.path(),
            "echo.toml",
            r#"
            description = "Echo a message"
            [invoke]
            command = ["cat"]
            timeout_secs = 3
            [request]
            message = "string"
            [response]
            message = "string"
            "#,
        );
        write(dir.path(), "notes.txt", "not a handler");

        let snapshot = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap();
        assert_eq!(snapshot.names(), vec!["echo", "hello"]);

        let hello = snapshot.get("hello").unwrap();
        assert!(matches!(hello.invoker, Invoker::Builtin(_)));
        assert_eq!(hello.description.description, "Greet person by name");
        assert_eq!(
            hello.description.parameters.property("name").unwrap().primitive,
            Primitive::String
        );

        let echo = snapshot.get("echo").unwrap();
        assert_eq!(echo.timeout, Some(Duration::from_secs(3)));
        match &echo.invoker {
            Invoker::Command(spec) => {
                assert_eq!(spec.program, "cat");
                assert_eq!(spec.working_dir, dir.path());
            }
            other => panic!("Expected command invoker, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_names_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "report.toml", HELLO);
        write(dir.path(), "Report.toml", HELLO);

        let err = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));
    }

    #[test]
    fn test_language_tag_disambiguates() {
        let py = TempDir::new().unwrap();
        let ts = TempDir::new().unwrap();
        write(py.path(), "hello.toml", HELLO);
        write(ts.path(), "hello.toml", HELLO);

        let config = HandlersConfig {
            sources: vec![
                HandlerSource {
                    dir: py.path().to_path_buf(),
                    tag: Some("py".to_string()),
                },
                HandlerSource {
                    dir: ts.path().to_path_buf(),
                    tag: Some("ts".to_string()),
                },
            ],
            ..HandlersConfig::default()
        };

        let snapshot = load(&config, &PluginTable::builtin()).unwrap();
        assert_eq!(snapshot.names(), vec!["hello-py", "hello-ts"]);
    }

    #[test]
    fn test_invalid_handler_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "hello.toml", HELLO);
        write(dir.path(), "broken.toml", "description = \"No binding\"\n");

        let err = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap_err();
        match err {
            RegistryError::InvalidHandler { name, .. } => assert_eq!(name, "broken"),
            other => panic!("Expected InvalidHandler, got {:?}", other),
        }
    }

    #[test]
    fn test_contract_violations() {
        let cases = [
            "[invoke]\nbuiltin = \"nope\"\n",
            "[invoke]\nbuiltin = \"greet\"\ncommand = [\"cat\"]\n",
            "[invoke]\ncommand = []\n[request]\n[response]\n",
            "[invoke]\ncommand = [\"cat\"]\n[response]\n",
            "[invoke]\nbuiltin = \"greet\"\n[request]\nname = \"string\"\n",
            "[invoke]\nbuiltin = \"greet\"\ntimeout_secs = 0\n",
            "not toml at all",
        ];

        for case in cases {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "bad.toml", case);
            let err = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidHandler { .. }),
                "case {case:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_unsupported_type_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "when.toml",
            "description = \"x\"\n[invoke]\ncommand = [\"cat\"]\n[request]\nat = \"DateTime\"\n[response]\n",
        );

        let err = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap_err();
        assert!(matches!(err, RegistryError::Extraction(_)));
        assert!(err.to_string().contains("'at'"));
    }

    #[test]
    fn test_empty_file_is_scaffolded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fresh.toml", "");

        let snapshot = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap();
        assert!(snapshot.get("fresh").is_some());

        let written = fs::read_to_string(dir.path().join("fresh.toml")).unwrap();
        assert_eq!(written, SCAFFOLD_TEMPLATE);
    }

    #[test]
    fn test_empty_file_without_scaffolding() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fresh.toml", "");

        let config = HandlersConfig {
            scaffold_empty: false,
            ..config_for(dir.path())
        };
        let err = load(&config, &PluginTable::builtin()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidHandler { .. }));
        assert_eq!(fs::read_to_string(dir.path().join("fresh.toml")).unwrap(), "");
    }

    #[test]
    fn test_recursive_discovery() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "deep.toml", HELLO);
        write(dir.path(), "top.toml", HELLO);

        let flat = load(&config_for(dir.path()), &PluginTable::builtin()).unwrap();
        assert_eq!(flat.names(), vec!["top"]);

        let config = HandlersConfig {
            recursive: true,
            ..config_for(dir.path())
        };
        let deep = load(&config, &PluginTable::builtin()).unwrap();
        assert_eq!(deep.names(), vec!["deep", "top"]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load(
            &config_for(&dir.path().join("absent")),
            &PluginTable::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_shipped_functions_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("functions");
        let snapshot = load(&config_for(&dir), &PluginTable::builtin()).unwrap();
        assert_eq!(
            snapshot.names(),
            vec!["hello", "kelvin_to_celsius", "multiply_matrices", "word_count"]
        );

        let word_count = &snapshot.get("word_count").unwrap().description;
        assert_eq!(word_count.parameters.required(), ["text"]);
        assert_eq!(
            word_count.returns.property("words").unwrap().primitive,
            Primitive::Integer
        );
    }

    #[test]
    fn test_handler_name() {
        assert_eq!(
            handler_name(Path::new("functions/hello.toml"), None).as_deref(),
            Some("hello")
        );
        assert_eq!(
            handler_name(Path::new("functions/hello.toml"), Some("py")).as_deref(),
            Some("hello-py")
        );
    }
}

//! Resolves dotted module names to source files and loads them as [`Module`]s.
//!
//! `subdir.subhello` is looked up as `<search path>/subdir/subhello.<extension>` for every
//! search path and then every extension, in order. The first file that exists wins.

use std::{
    fs, io,
    ops::Deref,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    compiler::{CompiledUnit, Compiler},
    lexer::SyntaxError,
};

pub const DEFAULT_EXTENSIONS: [&str; 2] = ["bf", "b"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("`{name}` isn't a valid module name")]
    InvalidName { name: String },

    #[error("no module named `{name}`")]
    NotFound { name: String },

    #[error("couldn't read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{}: {source}", .path.display())]
    Syntax { path: PathBuf, source: SyntaxError },
}

#[derive(Debug, Clone)]
pub struct Loader {
    search_paths: Vec<PathBuf>,
    extensions: Vec<String>,
    compiler: Compiler,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            search_paths: vec![],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            compiler: Compiler::default(),
        }
    }
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Replaces the default extensions, given without the leading `.`
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Used to translate every module this loader loads
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    fn split_name(name: &str) -> Option<Vec<&str>> {
        let parts: Vec<&str> = name.split('.').collect();
        let valid = parts
            .iter()
            .all(|part| !part.is_empty() && !part.contains(['/', '\\']));
        valid.then_some(parts)
    }

    pub fn find_module_path(&self, name: &str) -> Option<PathBuf> {
        let parts = Self::split_name(name)?;
        let (file_stem, directories) = parts.split_last()?;

        for base in self.search_paths.iter() {
            let directory = directories
                .iter()
                .fold(base.clone(), |path, part| path.join(part));
            for extension in self.extensions.iter() {
                let candidate = directory.join(format!("{file_stem}.{extension}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// [`Loader::find_module_path`], with an error explaining why nothing was found
    pub fn resolve(&self, name: &str) -> Result<PathBuf, LoadError> {
        if Self::split_name(name).is_none() {
            return Err(LoadError::InvalidName {
                name: name.to_string(),
            });
        }
        self.find_module_path(name)
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn load(&self, name: &str) -> Result<Module, LoadError> {
        let path = self.resolve(name)?;
        self.load_path(name, &path)
    }

    /// Loads a file directly, bypassing the search paths
    pub fn load_path(&self, name: &str, path: &Path) -> Result<Module, LoadError> {
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let unit = self
            .compiler
            .translate(&source)
            .map_err(|source| LoadError::Syntax {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Module {
            name: name.to_string(),
            path: path.to_path_buf(),
            unit,
        })
    }
}

/// A loaded source file.
///
/// A module is callable itself (it derefs to its [`CompiledUnit`]) and also exposes the unit
/// under its base name, i.e. `subdir.subhello` has a `subhello` member.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    path: PathBuf,
    unit: CompiledUnit,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last segment of the dotted name
    #[allow(dead_code)]
    pub fn base_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    #[allow(dead_code)]
    pub fn get(&self, member: &str) -> Option<&CompiledUnit> {
        (member == self.base_name()).then_some(&self.unit)
    }

    pub fn into_unit(self) -> CompiledUnit {
        self.unit
    }
}

impl Deref for Module {
    type Target = CompiledUnit;

    fn deref(&self) -> &CompiledUnit {
        &self.unit
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::interpreter::EofPolicy;

    const HELLO: &str = include_str!("../../programs/hellosmall.bf");

    fn programs_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("programs")
    }

    #[test]
    fn loads_from_the_programs_directory() {
        let loader = Loader::new().with_search_path(programs_dir());
        let hello = loader.load("hello").unwrap();
        assert_eq!(hello.name(), "hello");
        assert_eq!(hello.path(), programs_dir().join("hello.bf"));
        // the module is itself callable
        assert_eq!(hello.call_str("").unwrap(), "Hello World!\n");
        // and exposes the unit under its base name
        assert_eq!(
            hello.get("hello").unwrap().call_str("").unwrap(),
            "Hello World!\n"
        );
        assert!(hello.get("goodbye").is_none());
    }

    #[test]
    fn dotted_names_are_subdirectories() {
        let loader = Loader::new().with_search_path(programs_dir());
        let module = loader.load("subdir.subhello").unwrap();
        assert_eq!(module.base_name(), "subhello");
        assert_eq!(module.path(), programs_dir().join("subdir").join("subhello.bf"));
        assert_eq!(module.get("subhello").unwrap().call(b"").unwrap(), b"Hello World!\n");
    }

    #[test]
    fn missing_modules() {
        let loader = Loader::new().with_search_path(programs_dir());
        assert!(matches!(loader.load("nope"), Err(LoadError::NotFound { .. })));
        assert!(matches!(loader.load("subdir"), Err(LoadError::NotFound { .. })));
        // nothing resolves without a search path
        assert!(matches!(Loader::new().load("hello"), Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn invalid_names() {
        let loader = Loader::new().with_search_path(programs_dir());
        for name in ["", "a..b", ".hello", "hello.", "../hello", "sub/hello"] {
            assert!(
                matches!(loader.load(name), Err(LoadError::InvalidName { .. })),
                "{name:?}"
            );
            assert!(loader.find_module_path(name).is_none());
        }
    }

    #[test]
    fn search_paths_and_extensions_are_tried_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("greet.b"), "+++.").unwrap();
        fs::write(second.path().join("greet.bf"), "++.").unwrap();

        let loader = Loader::new()
            .with_search_path(first.path())
            .with_search_path(second.path());
        // the first search path wins even though its extension comes second
        assert_eq!(loader.load("greet").unwrap().call(b"").unwrap(), vec![3]);

        let bf_only = Loader::new()
            .with_search_path(first.path())
            .with_search_path(second.path())
            .with_extensions(["bf"]);
        assert_eq!(bf_only.load("greet").unwrap().call(b"").unwrap(), vec![2]);
    }

    #[test]
    fn custom_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.bar"), HELLO).unwrap();

        let default = Loader::new().with_search_path(dir.path());
        assert!(matches!(default.load("hello"), Err(LoadError::NotFound { .. })));

        let custom = Loader::new()
            .with_search_path(dir.path())
            .with_extensions(["bar"]);
        assert_eq!(custom.load("hello").unwrap().call_str("").unwrap(), "Hello World!\n");
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.bf");
        fs::write(&path, "+[.").unwrap();

        let loader = Loader::new().with_search_path(dir.path());
        match loader.load("broken") {
            Err(LoadError::Syntax { path: error_path, source }) => {
                assert_eq!(error_path, path);
                assert!(matches!(source, SyntaxError::UnmatchedOpen { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unreadable_files() {
        let dir = TempDir::new().unwrap();
        let err = Loader::new()
            .load_path("ghost", &dir.path().join("ghost.bf"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn compiler_settings_apply_to_loaded_modules() {
        let loader = Loader::new()
            .with_search_path(programs_dir())
            .with_compiler(Compiler::new().with_eof(EofPolicy::Max));
        let rot13 = loader.load("rot13").unwrap();
        assert_eq!(rot13.eof_policy(), EofPolicy::Max);
        assert_eq!(rot13.call_str("foobar").unwrap(), "sbbone");
        assert_eq!(rot13.into_unit().call_str("Hello").unwrap(), "Uryyb");
    }
}

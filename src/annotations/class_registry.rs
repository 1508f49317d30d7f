use crate::error::ResourceLoadError;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Position of a class in the registry.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClassIndex(pub usize);

impl fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of looking up a detection label in the registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassLookup {
    Found(ClassIndex),
    NotFound,
}

/// The ordered list of class names a detector can produce.
///
/// Class names give meaning to the integer ids that come out of the inference session, and
/// their positions select palette colors. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    /// Builds a registry, rejecting names that collide after trimming.
    pub fn new(names: Vec<String>) -> Result<Self, ResourceLoadError> {
        for (second, name) in names.iter().enumerate() {
            let trimmed = name.trim();
            if let Some(first) = names[..second].iter().position(|n| n.trim() == trimmed) {
                return Err(ResourceLoadError::DuplicateClass {
                    name: trimmed.to_string(),
                    first,
                    second,
                });
            }
        }
        Ok(ClassRegistry { names })
    }

    /// Reads a newline delimited class list. Blank lines are ignored.
    pub fn load(filepath: &Path) -> Result<Self, ResourceLoadError> {
        let to_error = |source: io::Error| ResourceLoadError::ClassList {
            path: filepath.to_path_buf(),
            source,
        };
        let lines: Vec<String> = BufReader::new(File::open(filepath).map_err(to_error)?)
            .lines()
            .collect::<Result<_, _>>()
            .map_err(to_error)?;
        let names: Vec<String> = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if names.is_empty() {
            return Err(ResourceLoadError::EmptyClassList(filepath.to_path_buf()));
        }
        Self::new(names)
    }

    /// Finds the class whose trimmed name equals the trimmed label.
    pub fn resolve(&self, label: &str) -> ClassLookup {
        let label = label.trim();
        match self.names.iter().position(|name| name.trim() == label) {
            Some(index) => ClassLookup::Found(ClassIndex(index)),
            None => ClassLookup::NotFound,
        }
    }

    pub fn name(&self, index: ClassIndex) -> Option<&str> {
        self.names.get(index.0).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassIndex, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (ClassIndex(index), name.as_str()))
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Architectural tier of a file.
///
/// The four project layers are ordered `Application > Module > Core > Shared`;
/// a file may only reference its own layer or a lower one. `External` and
/// `Unknown` sit outside that ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Application,
    Module,
    Core,
    Shared,
    External,
    Unknown,
}

impl Layer {
    /// Rank in the layering order, higher is further up. `None` for layers
    /// that take no part in ordering checks.
    pub fn rank(self) -> Option<u8> {
        match self {
            Layer::Application => Some(3),
            Layer::Module => Some(2),
            Layer::Core => Some(1),
            Layer::Shared => Some(0),
            Layer::External | Layer::Unknown => None,
        }
    }

    pub fn is_ordered(self) -> bool {
        self.rank().is_some()
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layer::Application => "application",
            Layer::Module => "module",
            Layer::Core => "core",
            Layer::Shared => "shared",
            Layer::External => "external",
            Layer::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "application" | "app" => Ok(Layer::Application),
            "module" | "modules" => Ok(Layer::Module),
            "core" => Ok(Layer::Core),
            "shared" => Ok(Layer::Shared),
            "external" => Ok(Layer::External),
            "unknown" => Ok(Layer::Unknown),
            _ => Err(format!("Unknown layer: {}", s)),
        }
    }
}

/// Responsibility of a file, derived from its name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Ui,
    Store,
    Service,
    Index,
    Other,
}

impl FileRole {
    pub const ALL: [FileRole; 5] = [
        FileRole::Ui,
        FileRole::Store,
        FileRole::Service,
        FileRole::Index,
        FileRole::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Ui => "ui",
            FileRole::Store => "store",
            FileRole::Service => "service",
            FileRole::Index => "index",
            FileRole::Other => "other",
        }
    }

    /// Role named by a single file-name segment, if any.
    pub fn from_name_segment(segment: &str) -> Option<Self> {
        match segment.to_lowercase().as_str() {
            "index" => Some(FileRole::Index),
            "ui" | "view" | "page" | "component" => Some(FileRole::Ui),
            "store" | "state" | "slice" => Some(FileRole::Store),
            "service" | "api" | "client" | "repository" => Some(FileRole::Service),
            _ => None,
        }
    }

    /// Role implied by the name of the directory holding a file.
    pub fn from_dir_name(dir: &str) -> Option<Self> {
        match dir.to_lowercase().as_str() {
            "ui" | "components" | "views" | "pages" => Some(FileRole::Ui),
            "store" | "stores" | "state" => Some(FileRole::Store),
            "services" | "api" => Some(FileRole::Service),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ui" => Ok(FileRole::Ui),
            "store" => Ok(FileRole::Store),
            "service" => Ok(FileRole::Service),
            "index" => Ok(FileRole::Index),
            "other" => Ok(FileRole::Other),
            _ => Err(format!("Unknown file role: {}", s)),
        }
    }
}

/// Where a path sits in the architecture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Classification {
    pub layer: Layer,
    pub module: Option<String>,
    pub role: Option<FileRole>,
}

impl Classification {
    pub fn external() -> Self {
        Self {
            layer: Layer::External,
            module: None,
            role: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            layer: Layer::Unknown,
            module: None,
            role: None,
        }
    }

    pub fn same_module(&self, other: &Classification) -> bool {
        self.module.is_some() && self.module == other.module
    }
}

/// A discovered file. Identity is the absolute path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub path: PathBuf,
    pub layer: Layer,
    pub module: Option<String>,
    pub role: Option<FileRole>,
}

impl SourceFile {
    pub fn new(path: PathBuf, classification: Classification) -> Self {
        Self {
            path,
            layer: classification.layer,
            module: classification.module,
            role: classification.role,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn classification(&self) -> Classification {
        Classification {
            layer: self.layer,
            module: self.module.clone(),
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_order() {
        assert!(Layer::Application.rank() > Layer::Module.rank());
        assert!(Layer::Module.rank() > Layer::Core.rank());
        assert!(Layer::Core.rank() > Layer::Shared.rank());
        assert!(!Layer::External.is_ordered());
        assert!(!Layer::Unknown.is_ordered());
    }

    #[test]
    fn test_role_segments() {
        assert_eq!(FileRole::from_name_segment("Store"), Some(FileRole::Store));
        assert_eq!(FileRole::from_name_segment("api"), Some(FileRole::Service));
        assert_eq!(FileRole::from_name_segment("helpers"), None);
        assert_eq!(FileRole::from_dir_name("components"), Some(FileRole::Ui));
    }
}

use serde::{Deserialize, Serialize};

/// A source file to be added to the project.
///
/// Logical files are supplied by the driver and never persisted by the engine.
/// The `relative_path` is relative to the source root and is what the reference
/// identifier is derived from, so two files with the same name in different
/// folders still get distinct references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalFile {
    pub name: String,
    /// Logical group, `/`-separated for nested groups (e.g. `Views/Auth`).
    #[serde(rename = "group")]
    pub group_name: String,
    #[serde(rename = "path")]
    pub relative_path: String,
}

impl LogicalFile {
    pub fn new(
        name: impl Into<String>,
        group_name: impl Into<String>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group_name: group_name.into(),
            relative_path: relative_path.into(),
        }
    }

    /// Key the file reference identifier is generated from.
    pub fn reference_key(&self) -> String {
        format!("fileref_{}", self.relative_path)
    }

    /// Key the build file identifier is generated from.
    pub fn build_key(&self) -> String {
        format!("buildfile_{}", self.name)
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }
}

/// Key a synthesized group identifier is generated from.
pub fn group_key(group_name: &str) -> String {
    format!("group_{}", group_name)
}

/// File type as Xcode records it in `lastKnownFileType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Swift,
    ObjC,
    ObjCpp,
    C,
    Cpp,
    Header,
    Metal,
    Other,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "swift" => Self::Swift,
            "m" => Self::ObjC,
            "mm" => Self::ObjCpp,
            "c" => Self::C,
            "cc" | "cpp" | "cxx" => Self::Cpp,
            "h" | "hh" | "hpp" => Self::Header,
            "metal" => Self::Metal,
            _ => Self::Other,
        }
    }

    pub fn last_known_file_type(&self) -> &'static str {
        match self {
            Self::Swift => "sourcecode.swift",
            Self::ObjC => "sourcecode.c.objc",
            Self::ObjCpp => "sourcecode.cpp.objcpp",
            Self::C => "sourcecode.c.c",
            Self::Cpp => "sourcecode.cpp.cpp",
            Self::Header => "sourcecode.c.h",
            Self::Metal => "sourcecode.metal",
            Self::Other => "text",
        }
    }

    /// Whether files of this kind belong in the sources build phase.
    pub fn compiles(&self) -> bool {
        !matches!(self, Self::Header | Self::Other)
    }
}

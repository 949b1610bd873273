use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapgenError {
    #[error("Library {path} not found.")]
    LibraryNotFound { path: String },
    #[error("Directory {path} not found.")]
    DirectoryNotFound { path: String },
    #[error("Script {source_name} failed: {message}")]
    Script {
        source_name: String,
        message: String,
    },
    #[error("Probable infinite inheritance loop in entity template {path}")]
    TemplateInheritanceLoop { path: String },
    #[error("Failed to parse {document}: {message}")]
    DocumentParse { document: String, message: String },
    #[error("Failed to read {path}: {message}")]
    FileRead { path: String, message: String },
    #[error("{message}")]
    Host { code: &'static str, message: String },
}

impl MapgenError {
    pub fn script(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Script {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn document_parse(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentParse {
            document: document.into(),
            message: message.into(),
        }
    }

    pub fn file_read(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub fn host(code: &'static str, message: impl Into<String>) -> Self {
        Self::Host {
            code,
            message: message.into(),
        }
    }

    /// Stable machine-readable code, printed by the CLI on failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LibraryNotFound { .. } => "LIBRARY_NOT_FOUND",
            Self::DirectoryNotFound { .. } => "DIRECTORY_NOT_FOUND",
            Self::Script { .. } => "SCRIPT_ERROR",
            Self::TemplateInheritanceLoop { .. } => "TEMPLATE_INHERITANCE_LOOP",
            Self::DocumentParse { .. } => "DOCUMENT_PARSE_ERROR",
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::Host { code, .. } => code,
        }
    }
}

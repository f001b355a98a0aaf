#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("Invalid view: {0}")]
    InvalidView(String),

    #[error("Failed to serialize TOML: {0}")]
    SerializeTOML(#[from] toml_edit::ser::Error),

    #[error("Failed to deserialize TOML: {0}")]
    DeserializeTOML(#[from] toml_edit::de::Error),

    #[error("Failed to parse TOML document: {0}")]
    ParseTOML(#[from] toml_edit::TomlError),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

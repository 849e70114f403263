#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Column not found: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;

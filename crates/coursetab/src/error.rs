#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid session label: {0:?}")]
    InvalidSession(String),

    #[error("Invalid field pattern: {0}")]
    InvalidFieldPattern(#[from] regex::Error),

    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: usize },
}

#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Could not read document: {0}")]
    Ingestion(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

impl From<pdf::PdfError> for Error {
    fn from(err: pdf::PdfError) -> Self {
        Error::Ingestion(err.to_string())
    }
}

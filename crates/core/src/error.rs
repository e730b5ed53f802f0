#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("translation failed: {0}")]
    Translation(String),
    #[error("translation timed out after {0} ms")]
    TranslationTimeout(u64),
    #[error("annotation service failed: {0}")]
    Annotation(String),
    #[error("annotation service timed out after {0} ms")]
    AnnotationTimeout(u64),
    #[error("failed to read lexicon file: {0}")]
    LexiconRead(std::io::Error),
    #[error("invalid lexicon entry on line {line}: {reason}")]
    LexiconEntry { line: usize, reason: String },

    #[error("failed to read model artifact: {0}")]
    ArtifactRead(std::io::Error),
    #[error("failed to fetch model artifact: {0}")]
    ArtifactFetch(String),
    #[error("object store returned status {status} for {key}")]
    ArtifactStatus { status: u16, key: String },
    #[error("failed to deserialize model artifact: {0}")]
    ArtifactDeserialization(String),
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("classifier returned class {0}, which has no severity label")]
    UnknownSeverityClass(i64),
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;

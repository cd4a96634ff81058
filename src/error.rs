use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown piece type '{0}'")]
    UnknownPieceType(String),
    #[error("piece index {0} is out of range")]
    UnknownPieceIndex(usize),
    #[error("random bag must hold at least one value")]
    EmptyBag,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

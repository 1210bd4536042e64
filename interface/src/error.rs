use thiserror::Error;

/// Errors raised while interpreting the interface descriptor or encoding/decoding data against it.
#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("Invalid IDL document: {0}")]
    InvalidIdl(String),
    #[error("Unknown instruction `{0}`")]
    UnknownInstruction(String),
    #[error("Unknown type `{0}`")]
    UnknownType(String),
    #[error("Unresolved account `{account}` for instruction `{instruction}`")]
    UnresolvedAccount {
        instruction: String,
        account: String,
    },
    #[error("Expected {expected} argument(s), got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Value doesn't match IDL type {expected}: {value}")]
    TypeMismatch { expected: String, value: String },
    #[error("Account data is uninitialized")]
    Uninitialized,
    #[error("Account discriminator mismatch: expected {expected:?}, got {actual:?}")]
    DiscriminatorMismatch { expected: [u8; 8], actual: [u8; 8] },
    #[error("Malformed account data: {0}")]
    Malformed(String),
}

/// A custom error declared by the program in its IDL `errors` table.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ProgramError {
    pub code: u32,
    pub name: String,
    #[serde(default)]
    pub msg: Option<String>,
}

impl std::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.msg {
            Some(msg) => write!(f, "{} ({}): {msg}", self.name, self.code),
            None => write!(f, "{} ({})", self.name, self.code),
        }
    }
}

/// Name of the program error raised when an upvote targets a link with no entry.
pub const ENTRY_NOT_FOUND: &str = "EntryNotFound";

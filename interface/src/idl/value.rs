use std::fmt::{
    self,
    Display,
    Formatter,
};

use solana_sdk::pubkey::Pubkey;

use crate::error::InterfaceError;

/// A dynamically typed value decoded from (or encodable to) account or instruction data according
/// to an [`super::IdlType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdlValue {
    Bool(bool),
    Unsigned(u128),
    Signed(i128),
    String(String),
    Bytes(Vec<u8>),
    PublicKey(Pubkey),
    Vec(Vec<IdlValue>),
    Option(Option<Box<IdlValue>>),
    Array(Vec<IdlValue>),
    /// Struct fields in declaration order.
    Struct(Vec<(String, IdlValue)>),
}

impl IdlValue {
    pub fn field(&self, name: &str) -> Result<&IdlValue, InterfaceError> {
        match self {
            Self::Struct(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value)
                .ok_or_else(|| InterfaceError::Malformed(format!("missing field `{name}`"))),
            other => Err(mismatch("struct", other)),
        }
    }

    pub fn as_u64(&self) -> Result<u64, InterfaceError> {
        match self {
            Self::Unsigned(v) => u64::try_from(*v).map_err(|_| mismatch("u64", self)),
            other => Err(mismatch("u64", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, InterfaceError> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(mismatch("string", other)),
        }
    }

    pub fn as_pubkey(&self) -> Result<Pubkey, InterfaceError> {
        match self {
            Self::PublicKey(pk) => Ok(*pk),
            other => Err(mismatch("publicKey", other)),
        }
    }

    pub fn as_slice(&self) -> Result<&[IdlValue], InterfaceError> {
        match self {
            Self::Vec(items) | Self::Array(items) => Ok(items),
            other => Err(mismatch("vec", other)),
        }
    }
}

fn mismatch(expected: &str, value: &IdlValue) -> InterfaceError {
    InterfaceError::TypeMismatch {
        expected: expected.to_string(),
        value: value.to_string(),
    }
}

impl Display for IdlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::PublicKey(pk) => write!(f, "{pk}"),
            Self::Option(None) => f.write_str("null"),
            Self::Option(Some(inner)) => write!(f, "{inner}"),
            Self::Vec(items) | Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

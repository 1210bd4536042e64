//! Serde model of the program's interface descriptor (legacy Anchor IDL JSON) and the helpers that
//! drive encoding and decoding from it.

mod codec;
mod discriminator;
mod value;

use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};
use solana_sdk::{
    instruction::{
        AccountMeta,
        Instruction,
    },
    pubkey::Pubkey,
};
use strum::IntoEnumIterator;

pub use codec::*;
pub use discriminator::*;
pub use value::*;

use crate::{
    error::{
        InterfaceError,
        ProgramError,
    },
    instructions::GifPortalInstruction,
};

const BUNDLED_IDL: &str = include_str!("../../idl.json");

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Idl {
    pub version: String,
    pub name: String,
    pub instructions: Vec<IdlInstruction>,
    #[serde(default)]
    pub accounts: Vec<IdlTypeDefinition>,
    #[serde(default)]
    pub types: Vec<IdlTypeDefinition>,
    #[serde(default)]
    pub errors: Vec<ProgramError>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdlMetadata {
    pub address: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdlInstruction {
    pub name: String,
    pub accounts: Vec<IdlAccountItem>,
    pub args: Vec<IdlField>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccountItem {
    pub name: String,
    pub is_mut: bool,
    pub is_signer: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdlTypeDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlTypeDefinitionTy,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlTypeDefinitionTy {
    Struct { fields: Vec<IdlField> },
}

/// A field type as written in the IDL. Primitives are plain strings (`"u64"`, `"publicKey"`) and
/// compound types are single-key objects (`{"vec": ...}`, `{"defined": "Name"}`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IdlType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    U128,
    I128,
    String,
    Bytes,
    PublicKey,
    Vec(Box<IdlType>),
    Option(Box<IdlType>),
    Array(Box<IdlType>, usize),
    Defined(String),
}

impl std::fmt::Display for IdlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vec(inner) => write!(f, "vec<{inner}>"),
            Self::Option(inner) => write!(f, "option<{inner}>"),
            Self::Array(inner, len) => write!(f, "[{inner}; {len}]"),
            Self::Defined(name) => f.write_str(name),
            primitive => write!(f, "{}", format!("{primitive:?}").to_lowercase()),
        }
    }
}

/// Maps IDL account names (e.g. `baseAccount`, `user`) to concrete addresses.
pub type AccountResolver = HashMap<&'static str, Pubkey>;

impl Idl {
    /// Parses the IDL compiled into this crate.
    pub fn bundled() -> Result<Self, InterfaceError> {
        Self::from_json(BUNDLED_IDL)
    }

    pub fn from_json(json: &str) -> Result<Self, InterfaceError> {
        serde_json::from_str(json).map_err(|e| InterfaceError::InvalidIdl(e.to_string()))
    }

    pub fn program_address(&self) -> Result<Pubkey, InterfaceError> {
        let address = self
            .metadata
            .as_ref()
            .map(|m| m.address.as_str())
            .ok_or_else(|| InterfaceError::InvalidIdl("missing metadata.address".into()))?;
        address
            .parse()
            .map_err(|_| InterfaceError::InvalidIdl(format!("invalid program address {address}")))
    }

    /// Checks that every instruction the client calls is declared and that every referenced type
    /// resolves.
    pub fn validate(&self) -> Result<(), InterfaceError> {
        for instruction in GifPortalInstruction::iter() {
            self.instruction(&instruction.to_string())?;
        }
        for definition in self.accounts.iter().chain(self.types.iter()) {
            let IdlTypeDefinitionTy::Struct { fields } = &definition.ty;
            for field in fields {
                self.check_type(&field.ty)?;
            }
        }
        Ok(())
    }

    fn check_type(&self, ty: &IdlType) -> Result<(), InterfaceError> {
        match ty {
            IdlType::Vec(inner) | IdlType::Option(inner) | IdlType::Array(inner, _) => {
                self.check_type(inner)
            }
            IdlType::Defined(name) => self.type_definition(name).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn instruction(&self, name: &str) -> Result<&IdlInstruction, InterfaceError> {
        self.instructions
            .iter()
            .find(|ix| ix.name == name)
            .ok_or_else(|| InterfaceError::UnknownInstruction(name.to_string()))
    }

    /// Looks up a struct definition in `accounts` first, then `types`.
    pub fn type_definition(&self, name: &str) -> Result<&IdlTypeDefinition, InterfaceError> {
        self.accounts
            .iter()
            .chain(self.types.iter())
            .find(|def| def.name == name)
            .ok_or_else(|| InterfaceError::UnknownType(name.to_string()))
    }

    pub fn error_by_code(&self, code: u32) -> Option<&ProgramError> {
        self.errors.iter().find(|e| e.code == code)
    }

    pub fn error_by_name(&self, name: &str) -> Option<&ProgramError> {
        self.errors.iter().find(|e| e.name == name)
    }

    /// Builds a program instruction by IDL name: account metas come from the IDL's account list,
    /// resolved through `resolver`, and the data is the instruction discriminator followed by the
    /// Borsh-encoded `args`.
    pub fn build_instruction(
        &self,
        program_id: Pubkey,
        name: &str,
        resolver: &AccountResolver,
        args: &[IdlValue],
    ) -> Result<Instruction, InterfaceError> {
        let instruction = self.instruction(name)?;
        let accounts = instruction
            .accounts
            .iter()
            .map(|item| {
                let pubkey = resolver.get(item.name.as_str()).copied().ok_or_else(|| {
                    InterfaceError::UnresolvedAccount {
                        instruction: name.to_string(),
                        account: item.name.clone(),
                    }
                })?;
                Ok(if item.is_mut {
                    AccountMeta::new(pubkey, item.is_signer)
                } else {
                    AccountMeta::new_readonly(pubkey, item.is_signer)
                })
            })
            .collect::<Result<Vec<_>, InterfaceError>>()?;

        Ok(Instruction {
            program_id,
            accounts,
            data: encode_instruction(self, name, args)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitive_and_compound_types() {
        let ty: IdlType = serde_json::from_str(r#"{"vec":{"defined":"ItemStruct"}}"#).unwrap();
        assert_eq!(
            ty,
            IdlType::Vec(Box::new(IdlType::Defined("ItemStruct".into())))
        );
        let ty: IdlType = serde_json::from_str(r#""publicKey""#).unwrap();
        assert_eq!(ty, IdlType::PublicKey);
        let ty: IdlType = serde_json::from_str(r#"{"array":["u8",32]}"#).unwrap();
        assert_eq!(ty, IdlType::Array(Box::new(IdlType::U8), 32));
    }

    #[test]
    fn bundled_idl_declares_every_client_instruction() {
        let idl = Idl::bundled().unwrap();
        idl.validate().unwrap();
        assert_eq!(idl.instruction("add_entry").unwrap().args.len(), 1);
        assert!(matches!(
            idl.instruction("start_stuff_off"),
            Err(InterfaceError::UnknownInstruction(_))
        ));
    }

    #[test]
    fn validate_rejects_dangling_type_reference() {
        let json = BUNDLED_IDL.replace(r#"{ "defined": "ItemStruct" }"#, r#"{ "defined": "Missing" }"#);
        let idl = Idl::from_json(&json).unwrap();
        assert!(matches!(idl.validate(), Err(InterfaceError::UnknownType(name)) if name == "Missing"));
    }

    #[test]
    fn build_instruction_resolves_accounts_by_name() {
        let idl = Idl::bundled().unwrap();
        let base = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let resolver = AccountResolver::from([("baseAccount", base), ("user", user)]);

        let ix = idl
            .build_instruction(
                crate::program::ID,
                "add_entry",
                &resolver,
                &[IdlValue::String("https://example.com/a.gif".into())],
            )
            .unwrap();
        assert_eq!(ix.accounts, vec![AccountMeta::new(base, false), AccountMeta::new(user, true)]);
        assert_eq!(ix.data[..8], instruction_discriminator("add_entry"));

        let missing = idl.build_instruction(crate::program::ID, "initialize", &resolver, &[]);
        assert!(matches!(
            missing,
            Err(InterfaceError::UnresolvedAccount { account, .. }) if account == "systemProgram"
        ));
    }

    #[test]
    fn error_table_lookup() {
        let idl = Idl::bundled().unwrap();
        assert_eq!(idl.error_by_code(6000).unwrap().name, "EntryNotFound");
        assert!(idl.error_by_code(0).is_none());
    }
}

//! Interface definitions for the GIF portal program: program identity, the bundled interface
//! descriptor (IDL), the IDL-driven account/instruction codec, and typed views over the portal's
//! data account.

pub mod error;
pub mod idl;
pub mod instructions;
pub mod state;

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use crate::{
    error::InterfaceError,
    idl::Idl,
};

pub mod program {
    use solana_sdk::pubkey::Pubkey;

    /// The deployed GIF portal program address.
    pub const ID: Pubkey = Pubkey::from_str_const("Borqy3dEjw9az7Uj9nW69A9ZDansFGHWEggUx7tkv44f");
}

/// The system program, required when creating the data account.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::from_str_const("11111111111111111111111111111111");

/// A program address bound to the interface descriptor that describes it.
#[derive(Clone, Debug)]
pub struct ProgramIdentity {
    pub id: Pubkey,
    pub idl: Arc<Idl>,
}

impl ProgramIdentity {
    /// The identity compiled into this build: [`program::ID`] and the bundled IDL.
    pub fn bundled() -> Result<Self, InterfaceError> {
        Self::from_idl(Idl::bundled()?)
    }

    /// Builds an identity from an IDL, taking the program address from its metadata.
    pub fn from_idl(idl: Idl) -> Result<Self, InterfaceError> {
        let id = idl.program_address()?;
        idl.validate()?;
        Ok(Self {
            id,
            idl: Arc::new(idl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_identity_matches_declared_id() {
        let identity = ProgramIdentity::bundled().expect("Bundled IDL should parse");
        assert_eq!(identity.id, program::ID);
    }
}

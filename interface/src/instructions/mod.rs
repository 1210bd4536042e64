use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
};

use crate::{
    error::InterfaceError,
    idl::{
        AccountResolver,
        IdlValue,
    },
    ProgramIdentity,
    SYSTEM_PROGRAM_ID,
};

/// The program instructions the portal calls. The display form is the IDL instruction name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum GifPortalInstruction {
    Initialize,
    AddEntry,
    UpvoteEntry,
}

/// Builds portal instructions against one program identity and the singleton data account.
#[derive(Clone, Debug)]
pub struct PortalInstructions {
    pub program: ProgramIdentity,
    pub data_account: Pubkey,
}

impl PortalInstructions {
    pub fn new(program: ProgramIdentity, data_account: Pubkey) -> Self {
        Self {
            program,
            data_account,
        }
    }

    fn resolver(&self, user: Pubkey) -> AccountResolver {
        AccountResolver::from([
            ("baseAccount", self.data_account),
            ("user", user),
            ("systemProgram", SYSTEM_PROGRAM_ID),
        ])
    }

    fn build(
        &self,
        instruction: GifPortalInstruction,
        user: Pubkey,
        args: &[IdlValue],
    ) -> Result<Instruction, InterfaceError> {
        self.program.idl.build_instruction(
            self.program.id,
            &instruction.to_string(),
            &self.resolver(user),
            args,
        )
    }

    /// Creates the data account with an empty entry list. `user` pays for the account.
    pub fn initialize(&self, user: Pubkey) -> Result<Instruction, InterfaceError> {
        self.build(GifPortalInstruction::Initialize, user, &[])
    }

    pub fn add_entry(&self, user: Pubkey, link: &str) -> Result<Instruction, InterfaceError> {
        self.build(
            GifPortalInstruction::AddEntry,
            user,
            &[IdlValue::String(link.to_string())],
        )
    }

    pub fn upvote_entry(&self, user: Pubkey, link: &str) -> Result<Instruction, InterfaceError> {
        self.build(
            GifPortalInstruction::UpvoteEntry,
            user,
            &[IdlValue::String(link.to_string())],
        )
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::instruction::AccountMeta;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::idl::{
        decode_instruction,
        instruction_discriminator,
    };

    fn instructions() -> PortalInstructions {
        PortalInstructions::new(ProgramIdentity::bundled().unwrap(), Pubkey::new_unique())
    }

    #[test]
    fn instruction_names_match_idl() {
        let names: Vec<String> = GifPortalInstruction::iter().map(|i| i.to_string()).collect();
        assert_eq!(names, ["initialize", "add_entry", "upvote_entry"]);
    }

    #[test]
    fn initialize_signs_with_data_account_and_user() {
        let builder = instructions();
        let user = Pubkey::new_unique();
        let ix = builder.initialize(user).unwrap();

        assert_eq!(ix.program_id, crate::program::ID);
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new(builder.data_account, true),
                AccountMeta::new(user, true),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            ]
        );
        assert_eq!(ix.data, instruction_discriminator("initialize"));
    }

    #[test]
    fn upvote_only_touches_data_account() {
        let builder = instructions();
        let ix = builder
            .upvote_entry(Pubkey::new_unique(), "https://example.com/a.gif")
            .unwrap();

        assert_eq!(ix.accounts, vec![AccountMeta::new(builder.data_account, false)]);
        let (name, args) = decode_instruction(&builder.program.idl, &ix.data).unwrap();
        assert_eq!(name, "upvote_entry");
        assert_eq!(args, vec![IdlValue::String("https://example.com/a.gif".into())]);
    }
}

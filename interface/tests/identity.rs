use gif_portal_interface::{
    error::InterfaceError,
    idl::Idl,
    instructions::PortalInstructions,
    ProgramIdentity,
};
use solana_sdk::pubkey::Pubkey;

const BUNDLED: &str = include_str!("../idl.json");

fn edited_idl(edit: impl FnOnce(&mut serde_json::Value)) -> anyhow::Result<Idl> {
    let mut json: serde_json::Value = serde_json::from_str(BUNDLED)?;
    edit(&mut json);
    Ok(Idl::from_json(&json.to_string())?)
}

#[test]
fn redeployed_program_address_comes_from_idl() -> anyhow::Result<()> {
    let redeployed = Pubkey::new_unique();
    let idl = edited_idl(|json| {
        json["metadata"]["address"] = redeployed.to_string().into();
    })?;
    let identity = ProgramIdentity::from_idl(idl)?;
    assert_eq!(identity.id, redeployed);

    let data_account = Pubkey::new_unique();
    let user = Pubkey::new_unique();
    let ix = PortalInstructions::new(identity, data_account)
        .add_entry(user, "https://example.com/a.gif")?;
    assert_eq!(ix.program_id, redeployed);
    assert_eq!(ix.accounts[0].pubkey, data_account);
    assert_eq!(ix.accounts[1].pubkey, user);

    Ok(())
}

#[test]
fn idl_without_a_called_instruction_is_rejected() -> anyhow::Result<()> {
    let idl = edited_idl(|json| {
        if let Some(instructions) = json["instructions"].as_array_mut() {
            instructions.retain(|ix| ix["name"] != "upvote_entry");
        }
    })?;

    assert!(matches!(
        ProgramIdentity::from_idl(idl),
        Err(InterfaceError::UnknownInstruction(name)) if name == "upvote_entry"
    ));
    Ok(())
}

#[test]
fn idl_without_an_address_is_rejected() -> anyhow::Result<()> {
    let idl = edited_idl(|json| {
        if let Some(object) = json.as_object_mut() {
            object.remove("metadata");
        }
    })?;

    assert!(matches!(
        ProgramIdentity::from_idl(idl),
        Err(InterfaceError::InvalidIdl(_))
    ));
    Ok(())
}

//! Typed views over the portal's data account, built from the IDL-decoded value.

use solana_sdk::pubkey::Pubkey;

use crate::{
    error::InterfaceError,
    idl::IdlValue,
};

/// IDL name of the data account type.
pub const BASE_ACCOUNT: &str = "BaseAccount";

/// Space the program allocates for the data account, discriminator included.
pub const BASE_ACCOUNT_SPACE: usize = 9000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub gif_link: String,
    pub user_address: Pubkey,
    pub likes: u64,
}

/// Entries in the order the program stored them.
pub type EntryList = Vec<Entry>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseAccountView {
    pub total_entries: u64,
    pub entries: EntryList,
}

impl TryFrom<&IdlValue> for Entry {
    type Error = InterfaceError;

    fn try_from(value: &IdlValue) -> Result<Self, Self::Error> {
        Ok(Self {
            gif_link: value.field("gifLink")?.as_str()?.to_string(),
            user_address: value.field("userAddress")?.as_pubkey()?,
            likes: value.field("likes")?.as_u64()?,
        })
    }
}

impl From<&Entry> for IdlValue {
    fn from(entry: &Entry) -> Self {
        IdlValue::Struct(vec![
            ("gifLink".into(), IdlValue::String(entry.gif_link.clone())),
            ("userAddress".into(), IdlValue::PublicKey(entry.user_address)),
            ("likes".into(), IdlValue::Unsigned(entry.likes.into())),
        ])
    }
}

impl TryFrom<&IdlValue> for BaseAccountView {
    type Error = InterfaceError;

    fn try_from(value: &IdlValue) -> Result<Self, Self::Error> {
        let entries = value
            .field("gifList")?
            .as_slice()?
            .iter()
            .map(Entry::try_from)
            .collect::<Result<EntryList, _>>()?;
        Ok(Self {
            total_entries: value.field("totalGifs")?.as_u64()?,
            entries,
        })
    }
}

impl From<&BaseAccountView> for IdlValue {
    fn from(view: &BaseAccountView) -> Self {
        IdlValue::Struct(vec![
            ("totalGifs".into(), IdlValue::Unsigned(view.total_entries.into())),
            (
                "gifList".into(),
                IdlValue::Vec(view.entries.iter().map(IdlValue::from).collect()),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{
        decode_account,
        encode_account,
        Idl,
    };

    #[test]
    fn view_survives_account_encoding() {
        let idl = Idl::bundled().unwrap();
        let view = BaseAccountView {
            total_entries: 2,
            entries: vec![
                Entry {
                    gif_link: "https://example.com/a.gif".into(),
                    user_address: Pubkey::new_unique(),
                    likes: 0,
                },
                Entry {
                    gif_link: "https://example.com/b.gif".into(),
                    user_address: Pubkey::new_unique(),
                    likes: 7,
                },
            ],
        };
        let data = encode_account(&idl, BASE_ACCOUNT, &IdlValue::from(&view)).unwrap();
        let decoded = decode_account(&idl, BASE_ACCOUNT, &data).unwrap();
        assert_eq!(BaseAccountView::try_from(&decoded).unwrap(), view);
    }

    #[test]
    fn missing_field_is_reported() {
        let value = IdlValue::Struct(vec![("gifLink".into(), IdlValue::String("a".into()))]);
        assert!(matches!(
            Entry::try_from(&value),
            Err(InterfaceError::Malformed(msg)) if msg.contains("userAddress")
        ));
    }
}

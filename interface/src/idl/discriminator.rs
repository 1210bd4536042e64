//! Anchor-style 8-byte discriminators: the first eight bytes of `sha256("<namespace>:<name>")`.

use sha2::{
    Digest,
    Sha256,
};

pub const DISCRIMINATOR_LEN: usize = 8;

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

fn sighash(namespace: &str, name: &str) -> Discriminator {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// Prefix of every instruction's data for the instruction named `name`.
pub fn instruction_discriminator(name: &str) -> Discriminator {
    sighash("global", name)
}

/// Prefix of the data of every account whose type is named `name`.
pub fn account_discriminator(name: &str) -> Discriminator {
    sighash("account", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[rustfmt::skip]
    fn known_discriminators() {
        assert_eq!(instruction_discriminator("initialize"), [175, 175, 109, 31, 13, 152, 155, 237]);
        assert_eq!(instruction_discriminator("add_entry"), [170, 45, 66, 212, 251, 230, 45, 38]);
        assert_eq!(instruction_discriminator("upvote_entry"), [1, 5, 220, 254, 78, 65, 153, 5]);
        assert_eq!(account_discriminator("BaseAccount"), [16, 90, 130, 242, 159, 10, 232, 133]);
    }
}

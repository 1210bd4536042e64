//! Predefined deterministic wallet keypairs for local testing.

macro_rules! acc_keypair_fn {
    ($fn_name:ident, $b58:literal) => {
        #[inline]
        pub fn $fn_name() -> &'static ::solana_sdk::signature::Keypair {
            static KP: ::std::sync::LazyLock<::solana_sdk::signature::Keypair> =
                ::std::sync::LazyLock::new(|| {
                    ::solana_sdk::signature::Keypair::from_base58_string($b58)
                });

            ::std::sync::LazyLock::force(&KP)
        }
    };
}

#[rustfmt::skip]
mod unformatted {
    acc_keypair_fn!(wallet_alice, "3pAqE74Zke1svHnqwVhCSZr3R4AfnM2WpQduhKRjBkQLCLdnCrcGtEPT5XzEfUE8jgzLaXxfhSsAkYpGcHJ3KrJj");
    acc_keypair_fn!(wallet_bob, "4jCrUezRXeiBqbkiLvSdqDxAyrg1mSccpHovTuHihRoyX6cBBw6k6hsTVjXm1ozD2sdQawqXcZz9A8hSanfJ5Z89");
    acc_keypair_fn!(wallet_carol, "3yYmhGMJijwqLCZpn9DAAg4VaJ18rXLqasvK6A56W78TDgRZQoSeewDPfApAtD9Mn3kvLJAVSXTE5jAqBF7xphtZ");
}

pub use unformatted::*;

#[cfg(test)]
mod tests {
    use solana_sdk::signer::Signer;

    use super::*;

    #[test]
    #[rustfmt::skip]
    fn check_pubkeys() {
        assert_eq!(wallet_alice().pubkey().to_string(), "A1T5b9BRgVEtv21Fdm6NaoLrysazw3wfsQ24KvjwBZv7");
        assert_eq!(wallet_bob().pubkey().to_string(), "CPYec6bfKah7Ppc7bzRzDSqNXumPwZLcFFh6tHPcUXid");
        assert_eq!(wallet_carol().pubkey().to_string(), "BFu3AAvNn1DSmYdKxH4yMc32fuJm2H5HHBZ6mz5dcGN1");
    }
}

//! An in-process stand-in for a cluster running the GIF portal program, used to drive the client
//! end to end in tests. It verifies signatures, charges fees, executes the portal instructions
//! against an account map, and fails the way a real node's preflight does.

pub mod fixture;

use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::{
        Mutex,
        MutexGuard,
        PoisonError,
    },
};

use async_trait::async_trait;
use gif_portal_interface::{
    error::{
        InterfaceError,
        ENTRY_NOT_FOUND,
    },
    idl::{
        decode_account,
        decode_instruction,
        encode_account,
        IdlValue,
    },
    instructions::GifPortalInstruction,
    state::{
        BaseAccountView,
        Entry,
        BASE_ACCOUNT,
        BASE_ACCOUNT_SPACE,
    },
    ProgramIdentity,
};
use solana_account::Account;
use solana_instruction_error::InstructionError;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    rent::Rent,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_error::TransactionError;
use strum::IntoEnumIterator;

use crate::chain::{
    ChainError,
    ChainRpc,
};

pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// System program: the account to create already exists.
const ACCOUNT_ALREADY_IN_USE: u32 = 0;
/// System program: the funder can't cover the transfer.
const RESULT_WITH_NEGATIVE_LAMPORTS: u32 = 1;
/// Anchor framework error codes.
const INSTRUCTION_FALLBACK_NOT_FOUND: u32 = 101;
const ACCOUNT_DID_NOT_DESERIALIZE: u32 = 3003;
const ACCOUNT_DID_NOT_SERIALIZE: u32 = 3004;
const ACCOUNT_OWNED_BY_WRONG_PROGRAM: u32 = 3007;
const ACCOUNT_NOT_SIGNER: u32 = 3010;
const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

/// Lamports needed to keep an account holding `space` bytes rent exempt.
pub fn rent_exempt_minimum(space: usize) -> u64 {
    Rent::default().minimum_balance(space)
}

#[derive(Default)]
struct Ledger {
    accounts: HashMap<Pubkey, Account>,
    blockhashes: HashSet<Hash>,
    offline: bool,
    requests: usize,
    transactions: usize,
}

/// A signer and account key pair from a compiled instruction.
#[derive(Clone, Copy)]
struct AccountRef {
    key: Pubkey,
    is_signer: bool,
}

pub struct LocalChain {
    program: ProgramIdentity,
    ledger: Mutex<Ledger>,
}

impl LocalChain {
    pub fn new(program: ProgramIdentity) -> Self {
        Self {
            program,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credits `lamports` to `address`, creating a system account if needed.
    pub fn airdrop(&self, address: &Pubkey, lamports: u64) {
        let mut ledger = self.ledger();
        let account = ledger.accounts.entry(*address).or_default();
        account.lamports += lamports;
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.ledger().accounts.get(address).cloned()
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.account(address).map_or(0, |a| a.lamports)
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.ledger().accounts.insert(address, account);
    }

    /// While offline, every request fails as if the endpoint were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.ledger().offline = offline;
    }

    /// Requests that reached the node.
    pub fn request_count(&self) -> usize {
        self.ledger().requests
    }

    /// Transactions that executed successfully.
    pub fn transaction_count(&self) -> usize {
        self.ledger().transactions
    }

    /// Reads the data account at `address` the way the program would.
    pub fn base_account(&self, address: &Pubkey) -> Option<BaseAccountView> {
        let account = self.account(address)?;
        let value = decode_account(&self.program.idl, BASE_ACCOUNT, &account.data).ok()?;
        BaseAccountView::try_from(&value).ok()
    }

    /// Opens a request, failing if the node is offline.
    fn request(&self) -> Result<MutexGuard<'_, Ledger>, ChainError> {
        let mut ledger = self.ledger();
        if ledger.offline {
            return Err(ChainError::NetworkUnavailable(
                "error sending request: connection refused".into(),
            ));
        }
        ledger.requests += 1;
        Ok(ledger)
    }

    fn execute(&self, ledger: &mut Ledger, tx: &Transaction) -> Result<(), TransactionError> {
        if !ledger.blockhashes.contains(&tx.message.recent_blockhash) {
            return Err(TransactionError::BlockhashNotFound);
        }
        tx.verify()?;

        let message = &tx.message;
        let fee = LAMPORTS_PER_SIGNATURE * u64::from(message.header.num_required_signatures);
        let fee_payer = message
            .account_keys
            .first()
            .ok_or(TransactionError::AccountNotFound)?;

        // Work on a copy so a failing instruction leaves no trace.
        let mut accounts = ledger.accounts.clone();
        let payer = accounts
            .get_mut(fee_payer)
            .ok_or(TransactionError::AccountNotFound)?;
        payer.lamports = payer
            .lamports
            .checked_sub(fee)
            .ok_or(TransactionError::InsufficientFundsForFee)?;

        for (index, compiled) in message.instructions.iter().enumerate() {
            let index = index as u8;
            let program_id = message.account_keys[compiled.program_id_index as usize];
            let refs = compiled
                .accounts
                .iter()
                .map(|i| AccountRef {
                    key: message.account_keys[*i as usize],
                    is_signer: message.is_signer(*i as usize),
                })
                .collect::<Vec<_>>();

            if program_id != self.program.id {
                return Err(TransactionError::InstructionError(
                    index,
                    InstructionError::IncorrectProgramId,
                ));
            }
            self.process(&mut accounts, &refs, &compiled.data)
                .map_err(|e| TransactionError::InstructionError(index, e))?;
        }

        ledger.accounts = accounts;
        ledger.transactions += 1;
        Ok(())
    }

    fn process(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        refs: &[AccountRef],
        data: &[u8],
    ) -> Result<(), InstructionError> {
        let idl = &self.program.idl;
        let (name, args) = decode_instruction(idl, data)
            .map_err(|_| InstructionError::Custom(INSTRUCTION_FALLBACK_NOT_FOUND))?;
        let expected_accounts = idl
            .instruction(name)
            .map_err(|_| InstructionError::Custom(INSTRUCTION_FALLBACK_NOT_FOUND))?
            .accounts
            .len();
        if refs.len() < expected_accounts {
            return Err(InstructionError::MissingAccount);
        }
        let instruction = GifPortalInstruction::iter()
            .find(|ix| ix.to_string() == name)
            .ok_or(InstructionError::Custom(INSTRUCTION_FALLBACK_NOT_FOUND))?;

        match instruction {
            GifPortalInstruction::Initialize => self.initialize(accounts, refs[0], refs[1]),
            GifPortalInstruction::AddEntry => {
                let link = link_arg(&args)?;
                let user = refs[1];
                if !user.is_signer {
                    return Err(InstructionError::Custom(ACCOUNT_NOT_SIGNER));
                }
                self.mutate_base(accounts, &refs[0].key, |view| {
                    view.entries.push(Entry {
                        gif_link: link,
                        user_address: user.key,
                        likes: 0,
                    });
                    view.total_entries += 1;
                    Ok(())
                })
            }
            GifPortalInstruction::UpvoteEntry => {
                let link = link_arg(&args)?;
                let not_found = idl
                    .error_by_name(ENTRY_NOT_FOUND)
                    .map(|e| e.code)
                    .ok_or(InstructionError::InvalidInstructionData)?;
                self.mutate_base(accounts, &refs[0].key, |view| {
                    let entry = view
                        .entries
                        .iter_mut()
                        .find(|entry| entry.gif_link == link)
                        .ok_or(InstructionError::Custom(not_found))?;
                    entry.likes = entry
                        .likes
                        .checked_add(1)
                        .ok_or(InstructionError::ArithmeticOverflow)?;
                    Ok(())
                })
            }
        }
    }

    fn initialize(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        base: AccountRef,
        user: AccountRef,
    ) -> Result<(), InstructionError> {
        if !base.is_signer || !user.is_signer {
            return Err(InstructionError::MissingRequiredSignature);
        }
        if accounts.get(&base.key).is_some_and(|a| a.lamports > 0) {
            return Err(InstructionError::Custom(ACCOUNT_ALREADY_IN_USE));
        }

        let rent = rent_exempt_minimum(BASE_ACCOUNT_SPACE);
        let funder = accounts
            .get_mut(&user.key)
            .ok_or(InstructionError::Custom(RESULT_WITH_NEGATIVE_LAMPORTS))?;
        funder.lamports = funder
            .lamports
            .checked_sub(rent)
            .ok_or(InstructionError::Custom(RESULT_WITH_NEGATIVE_LAMPORTS))?;

        let empty = BaseAccountView {
            total_entries: 0,
            entries: vec![],
        };
        let mut data = encode_account(&self.program.idl, BASE_ACCOUNT, &IdlValue::from(&empty))
            .map_err(|_| InstructionError::Custom(ACCOUNT_DID_NOT_SERIALIZE))?;
        data.resize(BASE_ACCOUNT_SPACE, 0);

        accounts.insert(
            base.key,
            Account {
                lamports: rent,
                data,
                owner: self.program.id,
                executable: false,
                rent_epoch: 0,
            },
        );
        Ok(())
    }

    /// Loads the data account, applies `f`, and writes it back in place.
    fn mutate_base(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        address: &Pubkey,
        f: impl FnOnce(&mut BaseAccountView) -> Result<(), InstructionError>,
    ) -> Result<(), InstructionError> {
        let idl = &self.program.idl;
        let account = accounts
            .get_mut(address)
            .filter(|a| a.lamports > 0)
            .ok_or(InstructionError::Custom(ACCOUNT_NOT_INITIALIZED))?;
        if account.owner != self.program.id {
            return Err(InstructionError::Custom(ACCOUNT_OWNED_BY_WRONG_PROGRAM));
        }

        let mut view = decode_account(idl, BASE_ACCOUNT, &account.data)
            .and_then(|value| BaseAccountView::try_from(&value))
            .map_err(|e| match e {
                InterfaceError::Uninitialized => InstructionError::Custom(ACCOUNT_NOT_INITIALIZED),
                _ => InstructionError::Custom(ACCOUNT_DID_NOT_DESERIALIZE),
            })?;
        f(&mut view)?;

        let data = encode_account(idl, BASE_ACCOUNT, &IdlValue::from(&view))
            .map_err(|_| InstructionError::Custom(ACCOUNT_DID_NOT_SERIALIZE))?;
        if data.len() > account.data.len() {
            return Err(InstructionError::Custom(ACCOUNT_DID_NOT_SERIALIZE));
        }
        account.data[..data.len()].copy_from_slice(&data);
        Ok(())
    }
}

fn link_arg(args: &[IdlValue]) -> Result<String, InstructionError> {
    args.first()
        .and_then(|arg| arg.as_str().ok())
        .map(str::to_string)
        .ok_or(InstructionError::InvalidInstructionData)
}

#[async_trait]
impl ChainRpc for LocalChain {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ChainError> {
        tokio::task::yield_now().await;
        let ledger = self.request()?;
        Ok(ledger.accounts.get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash, ChainError> {
        tokio::task::yield_now().await;
        let mut ledger = self.request()?;
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&(ledger.blockhashes.len() as u64 + 1).to_le_bytes());
        let blockhash = Hash::new_from_array(bytes);
        ledger.blockhashes.insert(blockhash);
        Ok(blockhash)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ChainError> {
        tokio::task::yield_now().await;
        let mut ledger = self.request()?;
        self.execute(&mut ledger, transaction)
            .map_err(|e| ChainError::preflight_failure(&e))?;
        Ok(transaction.signatures[0])
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::{
        message::Message,
        signature::Keypair,
        signer::Signer,
    };

    use super::*;
    use crate::chain::RejectCause;

    fn chain() -> LocalChain {
        LocalChain::new(ProgramIdentity::bundled().unwrap())
    }

    #[tokio::test]
    async fn unsigned_transactions_are_rejected() {
        let chain = chain();
        let payer = Keypair::new();
        chain.airdrop(&payer.pubkey(), 1_000_000);

        let blockhash = chain.latest_blockhash().await.unwrap();
        let mut tx = Transaction::new_unsigned(Message::new(&[], Some(&payer.pubkey())));
        tx.message.recent_blockhash = blockhash;

        let err = chain.send_and_confirm(&tx).await.unwrap_err();
        assert!(matches!(err, ChainError::RpcRejected { .. }));
        assert_eq!(chain.transaction_count(), 0);
    }

    #[tokio::test]
    async fn unfunded_payer_cannot_pay_fees() {
        let chain = chain();
        let payer = Keypair::new();
        chain.airdrop(&payer.pubkey(), LAMPORTS_PER_SIGNATURE - 1);

        let blockhash = chain.latest_blockhash().await.unwrap();
        let tx = Transaction::new_signed_with_payer(&[], Some(&payer.pubkey()), &[&payer], blockhash);

        let ChainError::RpcRejected { cause, .. } = chain.send_and_confirm(&tx).await.unwrap_err() else {
            panic!("Expected a rejection");
        };
        assert_eq!(cause, RejectCause::InsufficientFunds);
        assert_eq!(chain.balance(&payer.pubkey()), LAMPORTS_PER_SIGNATURE - 1);
    }

    #[tokio::test]
    async fn instruction_short_of_accounts_is_rejected() {
        let chain = chain();
        let payer = Keypair::new();
        chain.airdrop(&payer.pubkey(), 1_000_000);

        let builder = gif_portal_interface::instructions::PortalInstructions::new(
            ProgramIdentity::bundled().unwrap(),
            Pubkey::new_unique(),
        );
        let mut ix = builder
            .add_entry(payer.pubkey(), "https://example.com/a.gif")
            .unwrap();
        ix.accounts.truncate(1);

        let blockhash = chain.latest_blockhash().await.unwrap();
        let tx = Transaction::new_signed_with_payer(&[ix], Some(&payer.pubkey()), &[&payer], blockhash);

        let ChainError::RpcRejected { message, .. } = chain.send_and_confirm(&tx).await.unwrap_err() else {
            panic!("Expected a rejection");
        };
        let expected = TransactionError::InstructionError(0, InstructionError::MissingAccount);
        assert!(message.contains(&expected.to_string()));
        assert_eq!(chain.transaction_count(), 0);
    }

    #[tokio::test]
    async fn offline_chain_counts_no_requests() {
        let chain = chain();
        chain.set_offline(true);
        assert!(matches!(
            chain.get_account(&Pubkey::new_unique()).await,
            Err(ChainError::NetworkUnavailable(_))
        ));
        assert_eq!(chain.request_count(), 0);
    }
}

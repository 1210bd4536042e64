//! Maps RPC client and transaction failures onto the chain client's three error kinds.

use solana_client::{
    client_error::{
        ClientError,
        ClientErrorKind,
    },
    rpc_request::{
        RpcError,
        RpcResponseErrorData,
    },
    rpc_response::RpcSimulateTransactionResult,
};
use solana_instruction_error::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_transaction_error::TransactionError;
use thiserror::Error;

/// JSON-RPC error code returned when a transaction fails preflight simulation.
pub const PREFLIGHT_FAILURE_CODE: i64 = -32002;

/// Code used for transaction failures that arrive without a JSON-RPC error, e.g. a transaction
/// that landed but failed during confirmation.
pub const TRANSACTION_FAILURE_CODE: i64 = 0;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),
    #[error("RPC rejected the request ({code}): {message}")]
    RpcRejected {
        code: i64,
        message: String,
        cause: RejectCause,
    },
    #[error("Failed to decode account: {0}")]
    DecodeFailed(DecodeFailure),
}

/// Why the RPC node or the runtime refused a request, as far as the client can tell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectCause {
    /// A program returned `Custom(code)` while executing the instruction at `instruction_index`.
    ProgramError { instruction_index: u8, code: u32 },
    /// The fee payer couldn't cover the fee or a transfer.
    InsufficientFunds,
    Other,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeFailure {
    /// The account exists but holds no data written by the program yet.
    #[error("account holds no initialized data")]
    Uninitialized,
    #[error("account is owned by {0}, not the program")]
    ForeignOwner(Pubkey),
    #[error("{0}")]
    Layout(String),
    #[error("malformed RPC response: {0}")]
    Response(String),
}

impl ChainError {
    /// Whether the failure means the account hasn't been initialized, as opposed to holding data
    /// the client can't read.
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::DecodeFailed(DecodeFailure::Uninitialized))
    }

    /// A preflight rejection for a transaction that failed with `error`.
    pub fn preflight_failure(error: &TransactionError) -> Self {
        Self::RpcRejected {
            code: PREFLIGHT_FAILURE_CODE,
            message: format!("Transaction simulation failed: {error}"),
            cause: RejectCause::from(error),
        }
    }
}

impl From<&TransactionError> for RejectCause {
    fn from(error: &TransactionError) -> Self {
        match error {
            TransactionError::InstructionError(instruction_index, InstructionError::Custom(code)) => {
                Self::ProgramError {
                    instruction_index: *instruction_index,
                    code: *code,
                }
            }
            TransactionError::InstructionError(_, InstructionError::InsufficientFunds)
            | TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. }
            | TransactionError::AccountNotFound => Self::InsufficientFunds,
            _ => Self::Other,
        }
    }
}

impl From<ClientError> for ChainError {
    fn from(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::RpcError(RpcError::RpcResponseError {
                code,
                message,
                data,
            }) => {
                let cause = match data {
                    RpcResponseErrorData::SendTransactionPreflightFailure(
                        RpcSimulateTransactionResult {
                            err: Some(ui_err), ..
                        },
                    ) => {
                        let transaction_error: TransactionError = ui_err.clone().into();
                        RejectCause::from(&transaction_error)
                    }
                    _ => RejectCause::Other,
                };
                Self::RpcRejected {
                    code: *code,
                    message: message.clone(),
                    cause,
                }
            }
            ClientErrorKind::RpcError(RpcError::ParseError(msg)) => {
                Self::DecodeFailed(DecodeFailure::Response(msg.clone()))
            }
            ClientErrorKind::RpcError(RpcError::ForUser(msg)) => Self::RpcRejected {
                code: TRANSACTION_FAILURE_CODE,
                message: msg.clone(),
                cause: RejectCause::Other,
            },
            ClientErrorKind::TransactionError(transaction_error) => Self::RpcRejected {
                code: TRANSACTION_FAILURE_CODE,
                message: transaction_error.to_string(),
                cause: RejectCause::from(transaction_error),
            },
            ClientErrorKind::SerdeJson(e) => Self::DecodeFailed(DecodeFailure::Response(e.to_string())),
            ClientErrorKind::SigningError(e) => Self::RpcRejected {
                code: TRANSACTION_FAILURE_CODE,
                message: e.to_string(),
                cause: RejectCause::Other,
            },
            // Transport failures, request errors and confirmation timeouts.
            _ => Self::NetworkUnavailable(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_program_errors_keep_index_and_code() {
        let error = TransactionError::InstructionError(0, InstructionError::Custom(6000));
        let chain_error = ChainError::preflight_failure(&error);
        let ChainError::RpcRejected { code, cause, .. } = chain_error else {
            panic!("Expected a rejection");
        };
        assert_eq!(code, PREFLIGHT_FAILURE_CODE);
        assert_eq!(
            cause,
            RejectCause::ProgramError {
                instruction_index: 0,
                code: 6000
            }
        );
    }

    #[test]
    fn fee_failures_are_insufficient_funds() {
        assert_eq!(
            RejectCause::from(&TransactionError::InsufficientFundsForFee),
            RejectCause::InsufficientFunds
        );
        assert_eq!(
            RejectCause::from(&TransactionError::BlockhashNotFound),
            RejectCause::Other
        );
    }

    #[test]
    fn transport_errors_are_network_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = ChainError::from(ClientError::from(io));
        assert!(matches!(error, ChainError::NetworkUnavailable(_)));
    }
}

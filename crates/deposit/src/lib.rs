//! Deposits into an OP Stack chain through the L1 OptimismPortal.
//!
//! A deposit is submitted as a signed `depositTransaction` call and then
//! confirmed by polling for its receipt. [`DepositSubmitter`] handles the
//! first half, [`ConfirmationPoller`] the second.

pub mod amount;
pub mod poll;
pub mod request;
pub mod rpc;
pub mod submit;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use amount::{ether_to_wei, to_base_units, Amount, AmountError, ETHER_DECIMALS};
pub use poll::{Confirmation, ConfirmationPoller, ConfirmationStatus, PollConfig, PollError};
pub use request::{minimum_gas_limit, DepositRequest, Transactor, GAS_PER_CALLDATA_BYTE};
pub use rpc::{DepositEvent, DepositReceipt, DepositRpc, RpcClient};
pub use submit::{DepositSubmitter, SubmittedDeposit};

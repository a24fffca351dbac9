//! OP Stack contract bindings.
//!
//! Includes the L1 entrypoint for L1→L2 deposits:
//! - OptimismPortal (L1 contract)

use alloy_sol_types::sol;

sol! {
    /// OptimismPortal - L1 contract that accepts deposits into the L2
    interface IOptimismPortal {
        /// Emitted for every deposit; the L2 derivation pipeline turns it into a
        /// deposited transaction.
        ///
        /// `opaqueData` is the packed encoding of
        /// `(mint, value, gasLimit, isCreation, data)`.
        event TransactionDeposited(
            address indexed from,
            address indexed to,
            uint256 indexed version,
            bytes opaqueData
        );

        /// Deposit ETH and/or a call into the L2
        function depositTransaction(
            address _to,
            uint256 _value,
            uint64 _gasLimit,
            bool _isCreation,
            bytes memory _data
        ) external payable;
    }
}

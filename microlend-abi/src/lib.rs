//! Solidity ABI definitions for the MicroLending contract.
//!
//! This crate holds the `sol!`-generated call types the client uses to encode
//! calldata and decode return data. It does no I/O.

#![allow(clippy::too_many_arguments)]
#![allow(non_snake_case)]

pub use alloy_primitives::{hex, utils, Address, Bytes, U256};
pub use alloy_sol_types::{SolCall, SolValue};

alloy_sol_types::sol! {
    /// Client-facing surface of the deployed MicroLending contract.
    interface MicroLending {
        function owner() external view returns (address);

        function getUserDetails(address user)
            external
            view
            returns (string memory name, uint256 creditScore, bool isSHGMember);

        function lenderPools(address lender) external view returns (uint256[] memory);

        function requestLoan(uint256 poolId, uint256 amount, uint256 duration) external;

        function createLendingPool(uint256 maxLoanAmount, uint256 interestRate, uint256 minCreditScore) external;

        function updateCreditScoreParameters(address user, uint256 newCreditScore) external;
    }
}

/// Function names the deployed ABI must expose for this client to work.
pub const REQUIRED_FUNCTIONS: [&str; 6] = [
    "owner",
    "getUserDetails",
    "lenderPools",
    "requestLoan",
    "createLendingPool",
    "updateCreditScoreParameters",
];

//! Building and submitting bridge transactions.

mod builder;
pub use builder::{gas_limit_with_buffer, TransactionBuilder, TransactionDraft};

mod submitter;
pub use submitter::{explain_failure, Outcome, Submission, TransactionSubmitter};

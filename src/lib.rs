//! Synchronous client binding for the Pagar.me v1 payments API.
//!
//! The [`Client`] holds the API key and acts as a factory for
//! [`Transaction`] objects; each transaction serializes itself into a
//! form-encoded payload, performs one blocking HTTP round trip and
//! hydrates its fields from the JSON response.
//!
//! ```no_run
//! use pagarme_client::{Client, TransactionParams};
//!
//! # fn main() -> Result<(), pagarme_client::Error> {
//! let client = Client::new("ak_test_yourkey")?;
//! let mut transaction = client.start_transaction(TransactionParams::new(314, "hashcard"))?;
//! transaction.charge()?;
//! println!("charged: {:?} ({:?})", transaction.id, transaction.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transaction;
pub mod validation;

pub use client::{Client, ListQuery};
pub use config::Config;
pub use error::Error;
pub use transaction::{PaymentMethod, Transaction, TransactionParams};

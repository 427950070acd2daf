//! Search runs: fetch a batch from the catalog, drop what this search profile has
//! already rejected, classify the rest, and persist the outcome.

pub mod classifier;
pub mod fingerprint;
pub mod handlers;
pub mod ledger;
pub mod params;
pub mod run;

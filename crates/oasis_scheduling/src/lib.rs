// --- File: crates/oasis_scheduling/src/lib.rs ---
// Declare modules within this crate
pub mod availability;
#[cfg(test)]
mod availability_proptest;
pub mod catalog;
pub mod conflict;
pub mod handlers;
pub mod inference;
#[cfg(test)]
mod inference_test;
pub mod lifecycle;
pub mod models;
pub mod poll;
#[cfg(test)]
mod poll_test;
pub mod routes;
pub mod store;
pub mod upsell;
pub mod waitlist;

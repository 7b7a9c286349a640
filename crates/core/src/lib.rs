//! Core ledger logic for VaultCore.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and the posting
//! engine live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: entries, validation, locking,
//!   the append-only store, balance derivation, and the posting engine

pub mod ledger;

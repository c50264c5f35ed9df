//! Garita: the admission core of a facility access-control gate.
//!
//! Decides who may enter, loans and tracks physical badge tokens, keeps the
//! entry/exit ledger, and maintains the blacklist and badge-incident
//! registries. All durable state lives in a remote backend authority; this
//! crate orchestrates it and audits every privileged action.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub mod alerts;
pub mod badges;
pub mod blacklist;
pub mod eligibility;
pub mod occupancy;

pub mod workflow;

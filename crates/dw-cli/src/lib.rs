//! deploy-watch: Deploy challenges through a webhook and watch them
//!
//! Provides the reconciliation loop that threads poll ids from one response
//! into the next request, and the `deploy-watch` CLI around it.

pub mod commands;
pub mod output;
pub mod overrides;
pub mod reconcile;

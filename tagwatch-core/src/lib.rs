#![doc = "tagwatch-core: fetch, retry, dedup and publish pipeline for upstream tags and releases."]

//! Two detection strategies share this crate:
//!
//! - the per-repository Atom fetch ([`fetch_tags`], built on [`retry`], [`client`], [`atom`]
//!   and [`error_report`]);
//! - the global events monitor ([`monitor`], built on [`events`], [`window`] and [`token`]).
//!
//! Everything outside the core (cache, token store, message queue) is reached through the
//! traits in [`contract`].

pub mod atom;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod error_report;
pub mod events;
pub mod fetch_tags;
pub mod monitor;
pub mod retry;
pub mod token;
pub mod window;

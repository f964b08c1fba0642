//! Skillcast - Voice-Skill Request Processing Core
//!
//! This crate decodes tagged skill request envelopes, dispatches them
//! through an ordered chain of cross-cutting behaviors to the winning
//! handler, and encodes the typed response back to the platform wire
//! format.

pub mod adapters;
pub mod application;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;

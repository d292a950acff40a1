//! Vetrina is a self-hosted profile-page service for lending teams.
//!
//! Officers customize one of a fixed set of visual templates, publish the
//! result, and share it through a token-addressable public link. This crate
//! implements the resolution pipeline behind that flow: a Postgres-backed
//! template store fronted by a distributed cache tier and a local fallback
//! tier, request deduplication for concurrent fetches, an explicit
//! customizer editing mode, and the versioned HTTP API consumed by the
//! dashboard and the public profile pages.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

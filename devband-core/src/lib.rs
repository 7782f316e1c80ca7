//! devband core — price series, data providers, EMA, and deviation bands.
//!
//! This crate contains everything that computes on a single symbol:
//! - Domain types (price points, ordered price series)
//! - Data providers (Yahoo Finance, CSV import, synthetic) behind one trait
//! - Same-day backfill reconciliation for the trailing bars
//! - EMA indicator seeded from the first observation
//! - Episode extraction, the three-tier band builder, and the classifier

pub mod bands;
pub mod data;
pub mod domain;
pub mod indicators;

//! # staffdir
//!
//! An internal employee directory: list, add, edit, view and delete employee
//! records, each with an optional photo and a set of decorative badges. An
//! admin surface shows which host instance served the request and can start
//! a CPU stress run for infrastructure testing.
//!
//! # Architecture: Photo Ingestion
//!
//! The core of the crate is the photo normalizer. Every upload, whatever its
//! format, size or orientation, is turned into one predictable artifact:
//!
//! ```text
//! bytes → decode → EXIF orientation fix → fit (never upscale) → center on
//!         transparent canvas → PNG (RGBA, exactly canvas-sized)
//! ```
//!
//! The normalized PNG is stored under a random key in the object store, the
//! key is persisted on the employee record, and pages show the photo through
//! a time-limited signed URL.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Photo normalizer: orientation, fit, compose, PNG encode |
//! | [`directory`] | List / view / save / delete, absorbing photo-only failures |
//! | [`store`] | [`RecordStore`](store::RecordStore) trait with SQLite and JSON key-value backends |
//! | [`objects`] | [`ObjectStore`](objects::ObjectStore) trait, filesystem buckets, HMAC-signed URLs |
//! | [`context`] | Instance identity for page footers and the info page |
//! | [`pages`] | Maud HTML for every route, plus static export |
//! | [`batch`] | Parallel normalization of files and directories |
//! | [`admin`] | CPU stress trigger |
//! | [`config`] | Layered TOML + environment configuration and validation |
//! | [`badges`] | Badge CSV parsing and the badge catalog |
//! | [`types`] | Shared record and view types |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failures That Only Touch the Photo Are Absorbed
//!
//! A photo that does not decode, cannot be stored, or cannot be signed never
//! blocks the rest of a request. The record is saved without a new key, or
//! the page renders without an image, and the cause is logged. Everything
//! else (validation, record store errors) is returned as a typed error.
//!
//! ## Only Orientations 3, 6 and 8
//!
//! Rotations are applied for the three upright-restoring EXIF values. The
//! mirrored variants are deliberately left as stored.
//!
//! ## Two Record Stores Behind One Trait
//!
//! The relational and key-value backends differ in id format and in how they
//! store badges, but both list by name and both keep an existing photo key
//! when an update carries none. The backend is picked once at startup.
//!
//! ## Explicit Request Context
//!
//! Instance identity is looked up once per invocation and passed to every
//! renderer as a [`RequestContext`](context::RequestContext) value.

pub mod admin;
pub mod badges;
pub mod batch;
pub mod config;
pub mod context;
pub mod directory;
pub mod imaging;
pub mod objects;
pub mod output;
pub mod pages;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

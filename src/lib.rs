//! FresherPaint: a terminal client for the physics and computer science
//! analytics dashboard, plus a local development backend.
//!
//! Control flow: [`session`] gate, [`loader`] fetch/normalize, [`view`]
//! selection, [`charts`] dispatch, [`render`] output.

pub mod api;
pub mod charts;
pub mod cli;
pub mod config;
pub mod events;
pub mod loader;
pub mod records;
pub mod render;
pub mod server;
pub mod session;
pub mod storage;
pub mod view;

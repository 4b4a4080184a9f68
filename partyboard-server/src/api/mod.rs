//! HTTP API for the presentation layer.

pub mod board;

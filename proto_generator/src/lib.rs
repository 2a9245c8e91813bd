//! Build-only crate: see build.rs

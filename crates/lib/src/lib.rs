//! sdkpack-lib: package descriptors and the host that builds them.
//!
//! This crate provides the pieces used to assemble an SDK bundle out of
//! third-party dependencies:
//! - `PackageDef` / `Package`: what to fetch and how to prep/build/install it
//! - `Registry`: the set of known descriptors, in registration order
//! - `Host`: drives each package through its lifecycle into a staged prefix
//! - `placeholder`: `%{...}` template expansion for shell commands

pub mod config;
pub mod consts;
pub mod execute;
pub mod host;
pub mod package;
pub mod pkgs;
pub mod placeholder;
pub mod platform;
pub mod registry;
pub mod source;
pub mod util;

//! Shared helpers for the ghpc pull-request commenter.
//! This crate holds the pure pieces of the comment protocol: remote comment
//! shapes, slot/layout rendering, the slot filter, the output splitter,
//! output templates, commit-status modelling, and transport helpers consumed
//! by the runtime crate.

pub mod comment_filter;
pub mod comment_slot;
pub mod comment_types;
pub mod commit_status;
pub mod github_transport_helpers;
pub mod output_split;
pub mod output_template;

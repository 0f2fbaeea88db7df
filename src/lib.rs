//! adk-chat - a streaming chat client for ADK agent servers
//!
//! Bytes from `POST /run_sse` flow through [`sse::RecordReader`] and
//! [`sse::parse_record`] into the [`tracker::PartialTracker`], whose
//! [`transcript::TranscriptOp`]s are applied by the [`state::ChatStore`].
//! [`controller::ChatController`] drives the user-facing actions.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod preferences;
pub mod sse;
pub mod state;
pub mod stream;
pub mod tracker;
pub mod traits;
pub mod transcript;

//! MCP (Model Context Protocol) Server for the movies catalog
//!
//! This crate implements an MCP server that exposes a curated movie and
//! actor catalog, plus derived analytics, to AI assistants over JSON-RPC
//! 2.0 on stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    AI Assistant (agent)                          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ MCP Protocol (JSON-RPC over stdio)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 crates/movies_mcp/                               │
//! │                                                                  │
//! │  Server        │ stdio framing, dispatch, initialize lifecycle  │
//! │  Tools         │ 23 typed handlers behind one schema boundary   │
//! │  Services      │ MovieService / ActorService coordinators       │
//! │  Context cache │ TTL-bound paginated result materializations    │
//! │  Resources     │ movies:// dump, stats, poster collection       │
//! │  Prompts       │ prompt catalog + genre completion              │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                 crates/movies_db (sqlx / SQLite)
//! ```
//!
//! # Design Principles
//!
//! 1. **Typed inputs at the boundary:** the wire delivers untyped JSON;
//!    the registry collapses it into per-tool typed inputs before any
//!    handler runs. Raw maps never travel downstream.
//!
//! 2. **One error translator:** domain errors are a small closed set;
//!    the dispatch boundary is the only place they become JSON-RPC codes.
//!
//! 3. **Pipelining-safe stdio:** requests run concurrently, responses pair
//!    by ID, and a single writer keeps output lines whole.

pub mod context_cache;
pub mod dto;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod service;
pub mod tools;

pub use context_cache::ContextCache;
pub use prompts::PromptRegistry;
pub use resources::ResourceRegistry;
pub use server::{McpServer, McpServerConfig};
pub use service::{ActorService, MovieService};
pub use tools::{AppContext, ToolRegistry};

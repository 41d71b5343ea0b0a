//! MCP server exposing a loaded search index.

use crate::state::IndexState;
use crate::tools::get_entry::{GetEntryRequest, handle_get_entry};
use crate::tools::index_info::handle_index_info;
use crate::tools::lookup::{LookupRequest, handle_lookup};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server answering lookups against one immutable index.
#[derive(Clone)]
pub struct IndexServer {
    /// Loaded once at startup and shared read-only by every request
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for IndexServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexServer")
            .field("search_dir", &self.state.search_dir())
            .field("entries", &self.state.store().len())
            .finish()
    }
}

#[tool_router]
impl IndexServer {
    pub fn new(state: Arc<IndexState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<IndexState> {
        &self.state
    }

    #[tool(
        description = "Find documentation index entries whose key starts with a prefix. Matching is case-insensitive and results keep index order. Optionally restrict to one category (functions, classes, namespaces, files, ...)."
    )]
    async fn lookup(
        &self,
        Parameters(request): Parameters<LookupRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup(&self.state, request)
    }

    #[tool(
        description = "Show the entry stored under an exact key, with every destination URL and the scope it belongs to. Use lookup first to discover keys."
    )]
    async fn get_entry(
        &self,
        Parameters(request): Parameters<GetEntryRequest>,
    ) -> std::result::Result<String, String> {
        handle_get_entry(&self.state, request)
    }

    #[tool(
        description = "Describe the loaded search index: directory, shard list, entry counts and any shards that failed to load."
    )]
    async fn index_info(&self) -> std::result::Result<String, String> {
        Ok(handle_index_info(&self.state))
    }
}

#[tool_handler]
impl ServerHandler for IndexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(format!(
                "searchdata-mcp: prefix lookups over a generated documentation search index \
                 ({} entries from {}). Use lookup to find keys by prefix, get_entry for the \
                 destinations of one key and index_info for an overview.",
                self.state.store().len(),
                self.state.search_dir().display()
            ))
    }
}

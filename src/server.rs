//! MCP server exposing the search tools over stdio.

use crate::state::IndexState;
use crate::tools::inspect_entry::{InspectEntryRequest, handle_inspect_entry};
use crate::tools::list_sections::{ListSectionsRequest, handle_list_sections};
use crate::tools::search::{SearchRequest, handle_search};
use crate::tools::validate::{ValidateRequest, handle_validate};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for documentation search indexes
#[derive(Clone)]
pub struct SearchServer {
    /// Shared catalog state (LRU cache, in-flight loads, config)
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl SearchServer {
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
        description = "Search a documentation search index the way its search field does. Mode 'prefix' matches the start of symbol names, 'substring' matches anywhere, 'words' matches stemmed words of the name. Returns each match with its scope label and page URL.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "Show every link of the entry with an exact display name: labels (overloads and scopes), page URLs, anchors, and the sections listing it.",
        input_schema = inline_schema_for_type::<InspectEntryRequest>()
    )]
    async fn inspect_entry(
        &self,
        Parameters(request): Parameters<InspectEntryRequest>,
    ) -> std::result::Result<String, String> {
        handle_inspect_entry(&self.state, request).await
    }

    #[tool(
        description = "List the sections of a search index (all, classes, functions, ...) with labels, entry counts, and the leading letters that have a table.",
        input_schema = inline_schema_for_type::<ListSectionsRequest>()
    )]
    async fn list_sections(
        &self,
        Parameters(request): Parameters<ListSectionsRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_sections(&self.state, request).await
    }

    #[tool(
        description = "Check a search index for broken keys, duplicate keys, empty URLs, misplaced entries, and ordering problems. Reports errors and warnings.",
        input_schema = inline_schema_for_type::<ValidateRequest>()
    )]
    async fn validate(
        &self,
        Parameters(request): Parameters<ValidateRequest>,
    ) -> std::result::Result<String, String> {
        handle_validate(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        let default_dir = self
            .state
            .config()
            .search_dir
            .as_ref()
            .map_or_else(
                || "No default search directory is configured; pass `directory` to each tool.".to_string(),
                |dir| format!("Default search directory: {}.", dir.display()),
            );

        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(format!(
                "doxysearch-mcp: looks up symbols in the search index of generated HTML documentation \
                 (the `search/` directory with searchdata.js and per-letter table files). {} \
                 Use list_sections to see what the index holds, search to find symbols, and \
                 inspect_entry for every overload of a name.",
                default_dir
            ))
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true`
/// so enums such as the match mode are inlined instead of referenced.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();

    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        // A root schema always serializes to an object
        _ => Arc::new(JsonObject::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use assert2::check;

    #[test]
    fn test_inline_schema_inlines_mode_enum() {
        let schema = inline_schema_for_type::<SearchRequest>();
        let text = serde_json::to_string(&*schema).unwrap();
        check!(schema.contains_key("properties"));
        check!(text.contains("\"substring\""));
        check!(!text.contains("$ref"));
    }

    #[test]
    fn test_server_lists_tools() {
        let server = SearchServer::new(Arc::new(IndexState::new(Config::default())));
        let names: Vec<_> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        for name in ["search", "inspect_entry", "list_sections", "validate"] {
            check!(names.contains(&name.to_string()));
        }
    }
}

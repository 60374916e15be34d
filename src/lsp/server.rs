use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{error, info, warn};

use super::capabilities::server_capabilities;
use super::config::CodeAssistConfig;
use super::handlers::completion::handle_completion;
use crate::completion::engine::FilePathHelper;
use crate::language::{LanguageRegistry, language_id_from_path};
use crate::workspace::{Workspace, document::Document};

pub struct Backend {
    client: Client,
    pub workspace: Arc<Workspace>,
    registry: RwLock<Arc<LanguageRegistry>>,
    pub config: RwLock<CodeAssistConfig>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            workspace: Arc::new(Workspace::default()),
            registry: RwLock::new(Arc::new(LanguageRegistry::new())),
            config: RwLock::new(CodeAssistConfig::default()),
        }
    }

    /// The client's language id when we serve it, otherwise one inferred from
    /// the file extension.
    async fn effective_language(&self, uri: &Url, language_id: &str) -> Option<String> {
        let registry = self.registry.read().await;
        if registry.find(language_id).is_some() {
            return Some(language_id.to_string());
        }
        language_id_from_path(uri.path())
            .filter(|id| registry.find(id).is_some())
            .map(str::to_string)
    }

    /// Accept `{ "codeAssist": {...} }` or the bare settings object.
    pub async fn update_config(&self, params: serde_json::Value) -> bool {
        let settings = match params {
            serde_json::Value::Object(mut map) if map.contains_key("codeAssist") => {
                map.remove("codeAssist").unwrap_or_default()
            }
            other => other,
        };
        match CodeAssistConfig::from_value(settings) {
            Ok(new_config) => {
                info!(config = ?new_config, "config updated");
                *self.config.write().await = new_config;
                true
            }
            Err(e) => {
                error!(error = %e, "failed to parse incoming config");
                false
            }
        }
    }

    /// Rebuild and warm the catalog in the background.
    async fn spawn_catalog_rebuild(&self) {
        let config = self.config.read().await.clone();
        let workspace = Arc::clone(&self.workspace);
        let client = self.client.clone();
        tokio::spawn(async move {
            let notify = client.clone();
            with_progress(
                &client,
                "code-assist/catalog",
                "Loading assembly metadata",
                move || async move {
                    match workspace.rebuild_catalog(config).await {
                        Ok(()) => {
                            notify
                                .log_message(MessageType::INFO, "✓ Assembly metadata loaded")
                                .await;
                        }
                        Err(e) => {
                            warn!(error = %e, "catalog rebuild failed");
                            notify
                                .log_message(
                                    MessageType::WARNING,
                                    format!("Assembly metadata not loaded: {:#}", e),
                                )
                                .await;
                        }
                    }
                },
            )
            .await;
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        info!("LSP initialize");

        if let Some(options) = params.initialization_options {
            self.update_config(options).await;
        }

        let root = params
            .root_uri
            .as_ref()
            .and_then(|u| u.to_file_path().ok())
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .and_then(|f| f.uri.to_file_path().ok())
            });
        if let Some(root) = root {
            info!(root = %root.display(), "file path lookups rooted at workspace");
            *self.registry.write().await = Arc::new(LanguageRegistry::with_embedded_helper(
                Arc::new(FilePathHelper::new(root)),
            ));
        }

        self.spawn_catalog_rebuild().await;

        let triggers = self.registry.read().await.trigger_characters();
        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "code-assist".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            capabilities: server_capabilities(triggers),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("LSP initialized");
        self.client
            .log_message(MessageType::INFO, "code-assist ready")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        info!("LSP shutdown");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let td = params.text_document;
        let Some(language_id) = self.effective_language(&td.uri, &td.language_id).await else {
            return;
        };
        info!(uri = %td.uri, lang = %language_id, "did_open");
        self.workspace.documents.open(Document::new(
            td.uri,
            language_id,
            td.version,
            &td.text,
        ));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // full sync: the last change carries the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.workspace.documents.update(
            &params.text_document.uri,
            params.text_document.version,
            &change.text,
        );
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = &params.text_document.uri;
        info!(uri = %uri, "did_close");
        self.workspace.documents.close(uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if self.update_config(params.settings).await {
            self.spawn_catalog_rebuild().await;
        }
    }

    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let registry = Arc::clone(&*self.registry.read().await);
        let allow_non_public = self.config.read().await.allow_non_public;
        let response = handle_completion(
            Arc::clone(&self.workspace),
            registry,
            allow_non_public,
            params,
        )
        .await;
        Ok(response)
    }
}

async fn with_progress<F, Fut>(client: &Client, token: &str, title: &str, f: F)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let token = NumberOrString::String(token.to_string());
    client
        .send_request::<tower_lsp::lsp_types::request::WorkDoneProgressCreate>(
            WorkDoneProgressCreateParams {
                token: token.clone(),
            },
        )
        .await
        .ok();

    client
        .send_notification::<tower_lsp::lsp_types::notification::Progress>(ProgressParams {
            token: token.clone(),
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: title.to_string(),
                cancellable: Some(false),
                message: None,
                percentage: None,
            })),
        })
        .await;

    f().await;

    client
        .send_notification::<tower_lsp::lsp_types::notification::Progress>(ProgressParams {
            token,
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                message: None,
            })),
        })
        .await;
}

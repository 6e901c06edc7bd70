//! Main language server implementation

use std::collections::HashMap;
use std::sync::Arc;

use crate::features::commands::{
    parse_command, run_extraction, CommandError, ExtractOutcome, COMMANDS,
};
use crate::features::completion::{
    completion_items, CompletionCandidate, CompletionDictionary, LoadedDictionary,
};
use crate::features::semantic_tokens::{
    collect_semantic_tokens, encode_semantic_tokens, MindesSemanticToken, SUBKEY_TOKEN_TYPES,
};
use crate::features::settings::ServerSettings;
use mindes_config::MindesConfig;
use mindes_parser::report::split_lines;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeConfigurationParams, ExecuteCommandOptions, ExecuteCommandParams, InitializeParams,
    InitializeResult, InitializedParams, MessageType, Position, SemanticTokenType, SemanticTokens,
    SemanticTokensFullOptions, SemanticTokensLegend, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensResult, ServerCapabilities, ServerInfo, TextDocumentItem,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgressOptions,
};
use tower_lsp::Client;

/// The parts of the client connection the server talks back through.
#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn log_message(&self, typ: MessageType, message: String);
    async fn show_message(&self, typ: MessageType, message: String);
}

#[async_trait]
impl LspClient for Client {
    async fn log_message(&self, typ: MessageType, message: String) {
        Client::log_message(self, typ, message).await;
    }

    async fn show_message(&self, typ: MessageType, message: String) {
        Client::show_message(self, typ, message).await;
    }
}

pub trait FeatureProvider: Send + Sync + 'static {
    fn semantic_tokens(&self, text: &str) -> Vec<MindesSemanticToken>;
    fn completion(&self, before_cursor: &str) -> Vec<CompletionCandidate>;
    fn execute_command(
        &self,
        command: &str,
        arguments: &[Value],
        output_extension: &str,
    ) -> std::result::Result<ExtractOutcome, CommandError>;
}

/// Feature layer backed by the parser crate and a read-only completion dictionary.
#[derive(Default)]
pub struct DefaultFeatureProvider {
    dictionary: CompletionDictionary,
}

impl DefaultFeatureProvider {
    pub fn new(dictionary: CompletionDictionary) -> Self {
        Self { dictionary }
    }
}

impl FeatureProvider for DefaultFeatureProvider {
    fn semantic_tokens(&self, text: &str) -> Vec<MindesSemanticToken> {
        collect_semantic_tokens(text)
    }

    fn completion(&self, before_cursor: &str) -> Vec<CompletionCandidate> {
        completion_items(&self.dictionary, before_cursor)
    }

    fn execute_command(
        &self,
        command: &str,
        arguments: &[Value],
        output_extension: &str,
    ) -> std::result::Result<ExtractOutcome, CommandError> {
        let request = parse_command(command, arguments)?;
        run_extraction(&request, output_extension)
    }
}

#[derive(Default)]
struct DocumentStore {
    entries: RwLock<HashMap<Url, Arc<String>>>,
}

impl DocumentStore {
    async fn upsert(&self, uri: Url, text: String) {
        self.entries.write().await.insert(uri, Arc::new(text));
    }

    async fn get(&self, uri: &Url) -> Option<Arc<String>> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn remove(&self, uri: &Url) {
        self.entries.write().await.remove(uri);
    }
}

fn semantic_tokens_legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: SUBKEY_TOKEN_TYPES
            .iter()
            .copied()
            .map(SemanticTokenType::new)
            .collect(),
        token_modifiers: Vec::new(),
    }
}

pub struct MindesLanguageServer<C = Client, P = DefaultFeatureProvider> {
    client: C,
    documents: DocumentStore,
    features: Arc<P>,
    defaults: ServerSettings,
    settings: RwLock<ServerSettings>,
    startup_messages: Vec<(MessageType, String)>,
}

impl MindesLanguageServer<Client, DefaultFeatureProvider> {
    pub fn new(client: Client, dictionary: LoadedDictionary, config: &MindesConfig) -> Self {
        let typ = if dictionary.failed {
            MessageType::WARNING
        } else {
            MessageType::INFO
        };
        Self::with_features(
            client,
            Arc::new(DefaultFeatureProvider::new(dictionary.dictionary)),
            ServerSettings::from_config(config),
        )
        .with_startup_message(typ, dictionary.message)
    }
}

impl<C, P> MindesLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    pub fn with_features(client: C, features: Arc<P>, settings: ServerSettings) -> Self {
        Self {
            client,
            documents: DocumentStore::default(),
            features,
            settings: RwLock::new(settings.clone()),
            defaults: settings,
            startup_messages: Vec::new(),
        }
    }

    /// Queue a message for the client log, sent once the client reports `initialized`.
    pub fn with_startup_message(mut self, typ: MessageType, message: String) -> Self {
        self.startup_messages.push((typ, message));
        self
    }

    async fn apply_settings(&self, payload: &Value) {
        let applied = self.settings.write().await.apply(payload, &self.defaults);
        if !applied {
            self.client
                .log_message(
                    MessageType::WARNING,
                    "Ignoring malformed MInDesServer settings".to_string(),
                )
                .await;
        }
    }
}

/// The current line up to `position`, whose `character` counts UTF-16 code units.
fn line_prefix(text: &str, position: Position) -> &str {
    let Some(line) = split_lines(text).into_iter().nth(position.line as usize) else {
        return "";
    };
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= position.character {
            return &line[..idx];
        }
        units += ch.len_utf16() as u32;
    }
    line
}

fn command_error(err: &CommandError) -> Error {
    match err {
        CommandError::UnknownCommand(_) => Error::invalid_request(),
        CommandError::MissingInput => Error::invalid_params(err.to_string()),
        CommandError::Load(_) | CommandError::Write { .. } => Error {
            code: ErrorCode::InternalError,
            message: err.to_string().into(),
            data: None,
        },
    }
}

#[async_trait]
impl<C, P> tower_lsp::LanguageServer for MindesLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options.as_ref() {
            self.apply_settings(options).await;
        }

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(true),
                trigger_characters: Some(vec![".".to_string()]),
                ..CompletionOptions::default()
            }),
            semantic_tokens_provider: Some(
                lsp_types::SemanticTokensServerCapabilities::SemanticTokensOptions(
                    SemanticTokensOptions {
                        work_done_progress_options: WorkDoneProgressOptions::default(),
                        legend: semantic_tokens_legend(),
                        range: None,
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                    },
                ),
            ),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: COMMANDS.iter().map(|command| command.to_string()).collect(),
                work_done_progress_options: WorkDoneProgressOptions::default(),
            }),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "mindes-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        for (typ, message) in &self.startup_messages {
            self.client.log_message(*typ, message.clone()).await;
        }
        self.client
            .log_message(MessageType::INFO, "Server initialized".to_string())
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: lsp_types::DidOpenTextDocumentParams) {
        let TextDocumentItem { uri, text, .. } = params.text_document;
        self.documents.upsert(uri, text).await;
    }

    async fn did_change(&self, params: lsp_types::DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents
                .upsert(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_close(&self, params: lsp_types::DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_settings(&params.settings).await;
        let settings = self.settings.read().await.clone();
        tracing::debug!(?settings, "configuration changed");
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let Some(text) = self.documents.get(&params.text_document.uri).await else {
            return Ok(None);
        };
        let data = if self.settings.read().await.semantic_highlighting {
            encode_semantic_tokens(&self.features.semantic_tokens(text.as_str()))
        } else {
            Vec::new()
        };
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data,
        })))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let Some(text) = self.documents.get(&position.text_document.uri).await else {
            return Ok(None);
        };
        let before_cursor = line_prefix(text.as_str(), position.position);
        let items = self
            .features
            .completion(before_cursor)
            .into_iter()
            .map(|candidate| CompletionItem {
                label: candidate.label,
                kind: Some(candidate.kind),
                ..CompletionItem::default()
            })
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(item)
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let output_extension = self.settings.read().await.output_extension.clone();
        // Extraction reads and writes files; keep it off the async workers.
        let features = Arc::clone(&self.features);
        let ExecuteCommandParams {
            command, arguments, ..
        } = params;
        let result = tokio::task::spawn_blocking(move || {
            features.execute_command(&command, &arguments, &output_extension)
        })
        .await
        .map_err(|err| Error {
            code: ErrorCode::InternalError,
            message: format!("command task failed: {}", err).into(),
            data: None,
        })?;
        match result {
            Ok(outcome) => {
                if !outcome.malformed.is_empty() {
                    self.client
                        .show_message(
                            MessageType::WARNING,
                            format!("Skipped {} malformed row(s)", outcome.malformed.len()),
                        )
                        .await;
                }
                self.client
                    .show_message(
                        MessageType::INFO,
                        format!(
                            "Extracted contents written to: {}",
                            outcome.output.display()
                        ),
                    )
                    .await;
                Ok(Some(Value::String(outcome.output.display().to_string())))
            }
            Err(err) => {
                let typ = match err {
                    CommandError::MissingInput => MessageType::WARNING,
                    _ => MessageType::ERROR,
                };
                if !matches!(err, CommandError::UnknownCommand(_)) {
                    self.client.show_message(typ, err.to_string()).await;
                }
                Err(command_error(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{sample_dictionary, SAMPLE_DOCUMENT};
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower_lsp::lsp_types::{
        CompletionItemKind, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
        DidOpenTextDocumentParams, TextDocumentContentChangeEvent, TextDocumentIdentifier,
        TextDocumentPositionParams, VersionedTextDocumentIdentifier,
    };
    use tower_lsp::LanguageServer;

    #[derive(Clone, Default)]
    struct RecordingClient {
        messages: Arc<Mutex<Vec<(MessageType, String)>>>,
    }

    #[async_trait]
    impl LspClient for RecordingClient {
        async fn log_message(&self, typ: MessageType, message: String) {
            self.messages.lock().unwrap().push((typ, message));
        }

        async fn show_message(&self, typ: MessageType, message: String) {
            self.messages.lock().unwrap().push((typ, message));
        }
    }

    impl RecordingClient {
        fn messages(&self) -> Vec<(MessageType, String)> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct MockFeatureProvider {
        semantic_tokens_called: AtomicUsize,
        completion_called: AtomicUsize,
        last_before_cursor: Mutex<Option<String>>,
        command_thread: Mutex<Option<std::thread::ThreadId>>,
    }

    impl FeatureProvider for MockFeatureProvider {
        fn semantic_tokens(&self, _: &str) -> Vec<MindesSemanticToken> {
            self.semantic_tokens_called.fetch_add(1, Ordering::SeqCst);
            vec![MindesSemanticToken {
                line: 0,
                start: 0,
                length: 6,
                token_type: 0,
            }]
        }

        fn completion(&self, before_cursor: &str) -> Vec<CompletionCandidate> {
            self.completion_called.fetch_add(1, Ordering::SeqCst);
            *self.last_before_cursor.lock().unwrap() = Some(before_cursor.to_string());
            vec![CompletionCandidate {
                label: "Loop".into(),
                kind: CompletionItemKind::PROPERTY,
            }]
        }

        fn execute_command(
            &self,
            command: &str,
            _: &[Value],
            output_extension: &str,
        ) -> std::result::Result<ExtractOutcome, CommandError> {
            *self.command_thread.lock().unwrap() = Some(std::thread::current().id());
            match command {
                "mindes.extractRawInput" => Ok(ExtractOutcome {
                    output: PathBuf::from(format!("/runs/run1.{}", output_extension)),
                    lines: 2,
                    malformed: Vec::new(),
                }),
                "mindes.extractFullInput" => Err(CommandError::MissingInput),
                other => Err(CommandError::UnknownCommand(other.to_string())),
            }
        }
    }

    fn default_settings() -> ServerSettings {
        ServerSettings::from_config(&mindes_config::load_defaults().unwrap())
    }

    fn sample_uri() -> Url {
        Url::parse("file:///runs/sample.mindes").unwrap()
    }

    fn mock_server() -> (
        MindesLanguageServer<RecordingClient, MockFeatureProvider>,
        Arc<MockFeatureProvider>,
        RecordingClient,
    ) {
        let provider = Arc::new(MockFeatureProvider::default());
        let client = RecordingClient::default();
        let server =
            MindesLanguageServer::with_features(client.clone(), provider.clone(), default_settings());
        (server, provider, client)
    }

    async fn open_document<P: FeatureProvider>(
        server: &MindesLanguageServer<RecordingClient, P>,
        text: &str,
    ) {
        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: sample_uri(),
                    language_id: "mindes".into(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
    }

    fn semantic_params() -> SemanticTokensParams {
        SemanticTokensParams {
            text_document: TextDocumentIdentifier { uri: sample_uri() },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        }
    }

    fn completion_params(line: u32, character: u32) -> CompletionParams {
        CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: sample_uri() },
                position: Position::new(line, character),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        }
    }

    fn token_count(result: SemanticTokensResult) -> usize {
        match result {
            SemanticTokensResult::Tokens(tokens) => tokens.data.len(),
            SemanticTokensResult::Partial(partial) => partial.data.len(),
        }
    }

    #[test]
    fn line_prefix_counts_utf16_units() {
        let text = "a.b = 1\r\nµ.x = \u{1F600}.y";
        assert_eq!(line_prefix(text, Position::new(0, 4)), "a.b ");
        assert_eq!(line_prefix(text, Position::new(1, 2)), "µ.");
        assert_eq!(line_prefix(text, Position::new(1, 8)), "µ.x = \u{1F600}");
        assert_eq!(line_prefix(text, Position::new(1, 99)), "µ.x = \u{1F600}.y");
        assert_eq!(line_prefix(text, Position::new(7, 0)), "");
    }

    #[tokio::test]
    async fn initialize_advertises_legend_and_triggers() {
        let (server, _, _) = mock_server();
        let result = server.initialize(InitializeParams::default()).await.unwrap();
        let completion = result.capabilities.completion_provider.unwrap();
        assert_eq!(completion.trigger_characters, Some(vec![".".to_string()]));
        assert_eq!(completion.resolve_provider, Some(true));
        match result.capabilities.semantic_tokens_provider.unwrap() {
            lsp_types::SemanticTokensServerCapabilities::SemanticTokensOptions(options) => {
                let names: Vec<&str> = options
                    .legend
                    .token_types
                    .iter()
                    .map(|token_type| token_type.as_str())
                    .collect();
                assert_eq!(names, SUBKEY_TOKEN_TYPES.to_vec());
            }
            _ => panic!("unexpected semantic token capability"),
        }
        let commands = result.capabilities.execute_command_provider.unwrap().commands;
        assert!(commands.contains(&"mindes.extractRawInput".to_string()));
    }

    #[tokio::test]
    async fn initialized_flushes_startup_messages() {
        let (server, _, client) = mock_server();
        let server = server.with_startup_message(MessageType::WARNING, "no dictionary".into());
        server.initialized(InitializedParams {}).await;
        let messages = client.messages();
        assert_eq!(messages[0], (MessageType::WARNING, "no dictionary".to_string()));
        assert_eq!(messages[1].1, "Server initialized");
    }

    #[tokio::test]
    async fn semantic_tokens_call_feature_layer() {
        let (server, provider, _) = mock_server();
        open_document(&server, SAMPLE_DOCUMENT).await;

        let result = server
            .semantic_tokens_full(semantic_params())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(provider.semantic_tokens_called.load(Ordering::SeqCst), 1);
        assert_eq!(token_count(result), 1);
    }

    #[tokio::test]
    async fn semantic_tokens_returns_none_when_document_missing() {
        let (server, _, _) = mock_server();
        assert!(server
            .semantic_tokens_full(semantic_params())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn disabled_highlighting_returns_no_tokens() {
        let (server, provider, _) = mock_server();
        open_document(&server, SAMPLE_DOCUMENT).await;
        server
            .did_change_configuration(DidChangeConfigurationParams {
                settings: json!({ "MInDesServer": { "semanticHighlighting": false } }),
            })
            .await;

        let result = server
            .semantic_tokens_full(semantic_params())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token_count(result), 0);
        assert_eq!(provider.semantic_tokens_called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn initialization_options_apply_settings() {
        let (server, _, _) = mock_server();
        server
            .initialize(InitializeParams {
                initialization_options: Some(
                    json!({ "MInDesServer": { "outputExtension": "in" } }),
                ),
                ..InitializeParams::default()
            })
            .await
            .unwrap();
        assert_eq!(server.settings.read().await.output_extension, "in");
    }

    #[tokio::test]
    async fn completion_passes_text_before_cursor() {
        let (server, provider, _) = mock_server();
        open_document(&server, SAMPLE_DOCUMENT).await;

        let response = server
            .completion(completion_params(1, 12))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(provider.completion_called.load(Ordering::SeqCst), 1);
        assert_eq!(
            provider.last_before_cursor.lock().unwrap().as_deref(),
            Some("Solver.Loop.")
        );
        match response {
            CompletionResponse::Array(items) => {
                assert_eq!(items[0].label, "Loop");
                assert_eq!(items[0].kind, Some(CompletionItemKind::PROPERTY));
            }
            _ => panic!("unexpected completion response"),
        }
    }

    #[tokio::test]
    async fn completion_uses_latest_document_text() {
        let server = MindesLanguageServer::with_features(
            RecordingClient::default(),
            Arc::new(DefaultFeatureProvider::new(sample_dictionary())),
            default_settings(),
        );
        open_document(&server, "Solver.").await;
        server
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: sample_uri(),
                    version: 2,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "Solver.Loop.".into(),
                }],
            })
            .await;

        let response = server
            .completion(completion_params(0, 12))
            .await
            .unwrap()
            .unwrap();
        let labels: Vec<String> = match response {
            CompletionResponse::Array(items) => items.into_iter().map(|item| item.label).collect(),
            _ => panic!("unexpected completion response"),
        };
        assert_eq!(labels, vec!["begin_step", "end_step", "dt"]);
    }

    #[tokio::test]
    async fn closed_documents_have_no_completions() {
        let (server, _, _) = mock_server();
        open_document(&server, SAMPLE_DOCUMENT).await;
        server
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: sample_uri() },
            })
            .await;
        assert!(server
            .completion(completion_params(1, 12))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn completion_resolve_is_identity() {
        let (server, _, _) = mock_server();
        let item = CompletionItem {
            label: "Mesh".into(),
            ..CompletionItem::default()
        };
        assert_eq!(server.completion_resolve(item.clone()).await.unwrap(), item);
    }

    #[tokio::test]
    async fn execute_command_reports_output_path() {
        let (server, _, client) = mock_server();
        let value = server
            .execute_command(ExecuteCommandParams {
                command: "mindes.extractRawInput".into(),
                arguments: vec![json!("/runs/run1/input_report.txt")],
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap();
        assert_eq!(value, Some(json!("/runs/run1.mindes")));
        assert_eq!(
            client.messages(),
            vec![(
                MessageType::INFO,
                "Extracted contents written to: /runs/run1.mindes".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn execute_command_runs_on_blocking_pool() {
        let (server, provider, _) = mock_server();
        server
            .execute_command(ExecuteCommandParams {
                command: "mindes.extractRawInput".into(),
                arguments: vec![json!("/runs/run1/input_report.txt")],
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap();
        let thread = provider.command_thread.lock().unwrap().expect("command ran");
        assert_ne!(thread, std::thread::current().id());
    }

    #[tokio::test]
    async fn execute_command_surfaces_errors() {
        let (server, _, client) = mock_server();
        let err = server
            .execute_command(ExecuteCommandParams {
                command: "mindes.extractFullInput".into(),
                arguments: Vec::new(),
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert_eq!(client.messages()[0].0, MessageType::WARNING);

        let err = server
            .execute_command(ExecuteCommandParams {
                command: "mindes.unknown".into(),
                arguments: Vec::new(),
                work_done_progress_params: Default::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(client.messages().len(), 1);
    }
}

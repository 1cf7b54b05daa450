use anyhow::{anyhow, Result};
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use fitscope_core::api::admin::{ActivityEntry, Metrics, ModelConfig};
use fitscope_core::api::docs::DocMeta;
use fitscope_core::api::sheets::SheetData;
use fitscope_core::api::{
    AdminClient, AnalysisClient, ChatReply, ConversationClient, DocsClient, SheetsClient,
};
use fitscope_core::{Analysis, Config, Conversation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Analyze,
    Report,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    List,
    Content,
    Suggestions,
    Input,
}

/// Email drafts the backend knows how to write.
pub const EMAIL_TYPES: &[&str] = &["introduction", "follow-up", "proposal", "pricing"];

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Backend clients
    pub analysis_api: AnalysisClient,
    pub conversation_api: ConversationClient,
    pub docs_api: DocsClient,
    pub sheets_api: SheetsClient,
    pub admin_api: AdminClient,
    pub history_limit: usize,
    pub export_dir: String,

    // Dashboard state
    pub metrics: Option<Metrics>,
    pub activity: Vec<ActivityEntry>,
    pub history: Vec<Analysis>,
    pub history_state: ListState,
    pub show_sheet_panel: bool,
    pub sheet_data: Option<SheetData>,
    pub status: Option<String>,

    // Analyze state
    pub transcript_input: String,
    pub docs: Vec<DocMeta>,
    pub docs_state: ListState,
    pub doc_search_input: String,
    pub doc_search_cursor: usize,
    pub analysis_folder_id: Option<String>,
    pub selected_doc_id: Option<String>,

    // Report state
    pub report: Option<Analysis>,
    pub report_scroll: u16,
    pub report_height: u16,
    pub report_total_lines: u16,

    // Chat state
    pub conversation: Conversation,
    pub chat_input: String,
    pub chat_cursor: usize,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub suggestions: Vec<String>,
    pub suggestions_state: ListState,

    // Animation state
    pub animation_frame: u8,

    // Popup state
    pub show_model_picker: bool,
    pub model_config: Option<ModelConfig>,
    pub model_picker_state: ListState,
    pub show_email_picker: bool,
    pub email_picker_state: ListState,

    // In-flight backend work, polled from the render loop
    pub overview_task: Option<JoinHandle<Result<(Metrics, Vec<ActivityEntry>)>>>,
    pub history_task: Option<JoinHandle<Result<Vec<Analysis>>>>,
    pub health_task: Option<JoinHandle<Result<bool>>>,
    pub connections_task: Option<JoinHandle<Result<String>>>,
    pub docs_task: Option<JoinHandle<Result<(Option<String>, Vec<DocMeta>)>>>,
    pub extract_task: Option<JoinHandle<Result<(String, String)>>>,
    pub analyze_task: Option<JoinHandle<Result<Analysis>>>,
    pub report_task: Option<JoinHandle<Result<Analysis>>>,
    pub chat_task: Option<(u64, JoinHandle<Result<ChatReply>>)>,
    pub email_task: Option<(u64, JoinHandle<Result<String>>)>,
    pub suggestions_task: Option<JoinHandle<Result<Vec<String>>>>,
    pub sheet_task: Option<JoinHandle<Result<SheetData>>>,
    pub export_task: Option<JoinHandle<Result<String>>>,
    pub delete_task: Option<JoinHandle<Result<String>>>,
    pub model_task: Option<JoinHandle<Result<ModelConfig>>>,
    pub set_model_task: Option<JoinHandle<Result<String>>>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let base_url = config.backend_url();

        let mut history_state = ListState::default();
        history_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            focus: FocusPane::List,

            analysis_api: AnalysisClient::new(base_url),
            conversation_api: ConversationClient::new(base_url),
            docs_api: DocsClient::new(base_url),
            sheets_api: SheetsClient::new(base_url),
            admin_api: AdminClient::new(base_url),
            history_limit: config.history_limit(),
            export_dir: config.export_dir.clone().unwrap_or_else(|| ".".to_string()),

            metrics: None,
            activity: Vec::new(),
            history: Vec::new(),
            history_state,
            show_sheet_panel: false,
            sheet_data: None,
            status: None,

            transcript_input: String::new(),
            docs: Vec::new(),
            docs_state: ListState::default(),
            doc_search_input: String::new(),
            doc_search_cursor: 0,
            analysis_folder_id: None,
            selected_doc_id: None,

            report: None,
            report_scroll: 0,
            report_height: 0,
            report_total_lines: 0,

            conversation: Conversation::new(),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            suggestions: Vec::new(),
            suggestions_state: ListState::default(),

            animation_frame: 0,

            show_model_picker: false,
            model_config: None,
            model_picker_state: ListState::default(),
            show_email_picker: false,
            email_picker_state: ListState::default(),

            overview_task: None,
            history_task: None,
            health_task: None,
            connections_task: None,
            docs_task: None,
            extract_task: None,
            analyze_task: None,
            report_task: None,
            chat_task: None,
            email_task: None,
            suggestions_task: None,
            sheet_task: None,
            export_task: None,
            delete_task: None,
            model_task: None,
            set_model_task: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.analyze_task.is_some()
            || self.report_task.is_some()
            || self.chat_task.is_some()
            || self.email_task.is_some()
            || self.extract_task.is_some()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // ---- Dashboard ----

    pub fn refresh_dashboard(&mut self) {
        let admin = self.admin_api.clone();
        self.overview_task = Some(tokio::spawn(async move {
            let metrics = admin.metrics().await?;
            // Activity is decoration; a failure there should not blank the
            // metrics panel
            let activity = admin.activity().await.unwrap_or_default();
            Ok((metrics, activity))
        }));

        let analysis = self.analysis_api.clone();
        let limit = self.history_limit;
        self.history_task = Some(tokio::spawn(async move { analysis.history(limit).await }));
    }

    pub fn check_backend(&mut self) {
        let admin = self.admin_api.clone();
        self.health_task = Some(tokio::spawn(async move { admin.health().await }));
    }

    pub fn test_connections(&mut self) {
        let admin = self.admin_api.clone();
        self.connections_task = Some(tokio::spawn(async move {
            let statuses = admin.test_connections().await?;
            if statuses.is_empty() {
                return Ok("No integrations reported".to_string());
            }
            let summary: Vec<String> = statuses
                .iter()
                .map(|s| {
                    format!(
                        "{}: {}",
                        s.service,
                        if s.connected { "ok" } else { "down" }
                    )
                })
                .collect();
            Ok(summary.join(", "))
        }));
    }

    pub fn selected_history(&self) -> Option<&Analysis> {
        self.history_state
            .selected()
            .and_then(|i| self.history.get(i))
    }

    pub fn history_nav_down(&mut self) {
        let len = self.history.len();
        if len > 0 {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn history_nav_up(&mut self) {
        let i = self.history_state.selected().unwrap_or(0);
        self.history_state.select(Some(i.saturating_sub(1)));
    }

    /// Open the selected analysis. Refetches by id when the backend gave us
    /// one, so the report reflects server state rather than the history row.
    pub fn open_selected_report(&mut self) {
        let Some(selected) = self.selected_history().cloned() else {
            return;
        };

        match selected.id.clone() {
            Some(id) => {
                let api = self.analysis_api.clone();
                self.report_task = Some(tokio::spawn(async move { api.get(&id).await }));
            }
            None => self.open_report(selected),
        }
    }

    pub fn open_report(&mut self, analysis: Analysis) {
        self.report = Some(analysis);
        self.report_scroll = 0;
        self.screen = Screen::Report;
        self.input_mode = InputMode::Normal;
        self.focus = FocusPane::Content;
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_history().and_then(|a| a.id.clone()) else {
            self.status = Some("Selected analysis has no id to delete".to_string());
            return;
        };

        let api = self.analysis_api.clone();
        self.delete_task = Some(tokio::spawn(async move {
            api.delete(&id).await?;
            Ok(id)
        }));
    }

    pub fn export_analysis(&mut self, analysis: Option<&Analysis>) {
        let Some(id) = analysis.and_then(|a| a.id.clone()) else {
            self.status = Some("Analysis has no id to export".to_string());
            return;
        };

        let api = self.analysis_api.clone();
        let dir = self.export_dir.clone();
        self.export_task = Some(tokio::spawn(async move {
            let bytes = api.export(&id).await?;
            let path = std::path::Path::new(&dir).join(format!("fit-report-{}.pdf", id));
            tokio::fs::write(&path, bytes).await?;
            Ok(path.display().to_string())
        }));
    }

    pub fn toggle_sheet_panel(&mut self) {
        self.show_sheet_panel = !self.show_sheet_panel;
        if self.show_sheet_panel && self.sheet_data.is_none() && self.sheet_task.is_none() {
            let api = self.sheets_api.clone();
            self.sheet_task = Some(tokio::spawn(async move {
                let sheets = api.list().await?;
                let first = sheets
                    .first()
                    .ok_or_else(|| anyhow!("no spreadsheets available"))?;
                api.data(&first.id, None).await
            }));
        }
    }

    // ---- Analyze ----

    pub fn enter_analyze(&mut self) {
        self.screen = Screen::Analyze;
        self.input_mode = InputMode::Normal;
        self.focus = FocusPane::Input;
        if self.docs.is_empty() && self.docs_task.is_none() {
            self.load_docs();
        }
    }

    pub fn load_docs(&mut self) {
        let api = self.docs_api.clone();
        self.docs_task = Some(tokio::spawn(async move {
            // The analysis folder is a convention, not a requirement; fall
            // back to the default listing when the backend has none
            let folder_id = api.analysis_folder().await.ok().map(|f| f.id);
            let docs = api.list(folder_id.as_deref()).await?;
            Ok((folder_id, docs))
        }));
    }

    pub fn search_docs(&mut self) {
        let query = self.doc_search_input.trim().to_string();
        if query.is_empty() {
            self.load_docs();
            return;
        }

        let api = self.docs_api.clone();
        let folder = self.analysis_folder_id.clone();
        self.docs_task = Some(tokio::spawn(async move {
            let docs = api.search(&query, folder.as_deref()).await?;
            Ok((folder, docs))
        }));
    }

    pub fn docs_nav_down(&mut self) {
        let len = self.docs.len();
        if len > 0 {
            let i = self.docs_state.selected().unwrap_or(0);
            self.docs_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn docs_nav_up(&mut self) {
        let i = self.docs_state.selected().unwrap_or(0);
        self.docs_state.select(Some(i.saturating_sub(1)));
    }

    /// Pull the selected document's text into the transcript box.
    pub fn extract_selected_doc(&mut self) {
        let Some(doc) = self
            .docs_state
            .selected()
            .and_then(|i| self.docs.get(i))
            .cloned()
        else {
            return;
        };

        let api = self.docs_api.clone();
        self.extract_task = Some(tokio::spawn(async move {
            let content = api.extract(&doc.id).await?;
            Ok((doc.id, content))
        }));
    }

    pub fn submit_transcript(&mut self) {
        let transcript = self.transcript_input.trim().to_string();
        if transcript.is_empty() {
            self.status = Some("Nothing to analyze: transcript is empty".to_string());
            return;
        }
        if self.analyze_task.is_some() {
            return;
        }

        let api = self.analysis_api.clone();
        let document_id = self.selected_doc_id.clone();
        self.analyze_task = Some(tokio::spawn(async move {
            api.submit_transcript(&transcript, document_id.as_deref())
                .await
        }));
    }

    // ---- Chat ----

    pub fn enter_chat(&mut self) {
        self.screen = Screen::Chat;
        self.input_mode = InputMode::Editing;
        self.focus = FocusPane::Input;

        if self.suggestions.is_empty() && self.suggestions_task.is_none() {
            if let Some(id) = self.report.as_ref().and_then(|a| a.id.clone()) {
                let api = self.conversation_api.clone();
                self.suggestions_task =
                    Some(tokio::spawn(async move { api.suggestions(&id).await }));
            }
        }
    }

    pub fn send_chat(&mut self) {
        let query = self.chat_input.trim().to_string();
        // One request at a time; the input stays locked until the reply (or
        // failure) lands
        if query.is_empty() || self.conversation.request_pending() {
            return;
        }

        self.conversation.push_user(query.clone());
        let seq = self.conversation.begin_request();

        let api = self.conversation_api.clone();
        let analysis_id = self.report.as_ref().and_then(|a| a.id.clone());
        let conversation_id = self.conversation.conversation_id().map(str::to_string);
        self.chat_task = Some((
            seq,
            tokio::spawn(async move {
                api.query(&query, analysis_id.as_deref(), conversation_id.as_deref())
                    .await
            }),
        ));

        self.chat_input.clear();
        self.chat_cursor = 0;
        self.scroll_chat_to_bottom();
    }

    pub fn generate_email(&mut self, email_type: &str) {
        if self.conversation.request_pending() {
            return;
        }
        let Some(id) = self.report.as_ref().and_then(|a| a.id.clone()) else {
            self.status = Some("Open an analysis before drafting an email".to_string());
            return;
        };

        self.conversation
            .push_user(format!("Draft a {} email", email_type));
        let seq = self.conversation.begin_request();

        let api = self.conversation_api.clone();
        let email_type = email_type.to_string();
        self.email_task = Some((
            seq,
            tokio::spawn(async move { api.generate_email(&id, &email_type, None).await }),
        ));
        self.scroll_chat_to_bottom();
    }

    pub fn suggestions_nav_down(&mut self) {
        let len = self.suggestions.len();
        if len > 0 {
            let i = self.suggestions_state.selected().unwrap_or(0);
            self.suggestions_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn suggestions_nav_up(&mut self) {
        let i = self.suggestions_state.selected().unwrap_or(0);
        self.suggestions_state.select(Some(i.saturating_sub(1)));
    }

    /// Copy the selected suggestion into the input box for editing.
    pub fn take_suggestion(&mut self) {
        if let Some(text) = self
            .suggestions_state
            .selected()
            .and_then(|i| self.suggestions.get(i))
            .cloned()
        {
            self.chat_cursor = text.chars().count();
            self.chat_input = text;
            self.focus = FocusPane::Input;
            self.input_mode = InputMode::Editing;
        }
    }

    /// Scroll chat so the latest message (or the Thinking indicator) is
    /// visible. Line math mirrors the chat renderer closely enough for
    /// anchoring; exact pixel-perfection is not required.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.conversation.messages() {
            total_lines += 1; // Role line
            for line in msg.text.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        total_lines += 2; // Role line + Thinking indicator

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    // ---- Report scrolling ----

    pub fn report_scroll_down(&mut self) {
        let max = self.report_total_lines.saturating_sub(self.report_height);
        if self.report_scroll < max {
            self.report_scroll = self.report_scroll.saturating_add(1);
        }
    }

    pub fn report_scroll_up(&mut self) {
        self.report_scroll = self.report_scroll.saturating_sub(1);
    }

    pub fn report_half_page_down(&mut self) {
        let half = self.report_height / 2;
        let max = self.report_total_lines.saturating_sub(self.report_height);
        self.report_scroll = (self.report_scroll + half).min(max);
    }

    pub fn report_half_page_up(&mut self) {
        let half = self.report_height / 2;
        self.report_scroll = self.report_scroll.saturating_sub(half);
    }

    // ---- Model picker ----

    pub fn open_model_picker(&mut self) {
        self.show_model_picker = true;
        self.model_picker_state.select(Some(0));
        if self.model_task.is_none() {
            let api = self.admin_api.clone();
            self.model_task = Some(tokio::spawn(async move { api.model_config().await }));
        }
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = self
            .model_config
            .as_ref()
            .map(|c| c.available_models.len())
            .unwrap_or(0);
        if len > 0 {
            let i = self.model_picker_state.selected().unwrap_or(0);
            self.model_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn apply_selected_model(&mut self) {
        let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| {
                self.model_config
                    .as_ref()
                    .and_then(|c| c.available_models.get(i))
            })
            .cloned()
        else {
            return;
        };

        let api = self.admin_api.clone();
        let chosen = model.clone();
        self.set_model_task = Some(tokio::spawn(async move {
            api.set_model(&chosen).await?;
            Ok(chosen)
        }));
        self.show_model_picker = false;
    }

    // ---- Email picker ----

    pub fn email_picker_nav_down(&mut self) {
        let i = self.email_picker_state.selected().unwrap_or(0);
        self.email_picker_state
            .select(Some((i + 1).min(EMAIL_TYPES.len() - 1)));
    }

    pub fn email_picker_nav_up(&mut self) {
        let i = self.email_picker_state.selected().unwrap_or(0);
        self.email_picker_state.select(Some(i.saturating_sub(1)));
    }

    // ---- Task polling ----

    /// Drain finished background tasks into app state. Called from the main
    /// loop after every event, including ticks, so results land within one
    /// tick of completion.
    pub async fn poll_tasks(&mut self) {
        if let Some(task) = take_finished(&mut self.overview_task) {
            match task.await {
                Ok(Ok((metrics, activity))) => {
                    self.metrics = Some(metrics);
                    self.activity = activity;
                }
                Ok(Err(e)) => self.status = Some(format!("Metrics unavailable: {}", e)),
                Err(e) => self.status = Some(format!("Metrics task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.history_task) {
            match task.await {
                Ok(Ok(history)) => {
                    self.history = history;
                    let len = self.history.len();
                    match self.history_state.selected() {
                        Some(i) if len > 0 => self.history_state.select(Some(i.min(len - 1))),
                        _ if len > 0 => self.history_state.select(Some(0)),
                        _ => self.history_state.select(None),
                    }
                }
                Ok(Err(e)) => self.status = Some(format!("History unavailable: {}", e)),
                Err(e) => self.status = Some(format!("History task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.health_task) {
            match task.await {
                Ok(Ok(true)) => {}
                Ok(Ok(false)) => self.status = Some("Backend health check failed".to_string()),
                Ok(Err(e)) => self.status = Some(format!("Backend unreachable: {}", e)),
                Err(e) => self.status = Some(format!("Health task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.connections_task) {
            match task.await {
                Ok(Ok(summary)) => self.status = Some(summary),
                Ok(Err(e)) => self.status = Some(format!("Connection test failed: {}", e)),
                Err(e) => self.status = Some(format!("Connection test failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.docs_task) {
            match task.await {
                Ok(Ok((folder_id, docs))) => {
                    self.analysis_folder_id = folder_id;
                    self.docs = docs;
                    if self.docs.is_empty() {
                        self.docs_state.select(None);
                    } else {
                        self.docs_state.select(Some(0));
                    }
                }
                Ok(Err(e)) => self.status = Some(format!("Documents unavailable: {}", e)),
                Err(e) => self.status = Some(format!("Documents task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.extract_task) {
            match task.await {
                Ok(Ok((doc_id, content))) => {
                    self.transcript_input = content;
                    self.selected_doc_id = Some(doc_id);
                    self.focus = FocusPane::Input;
                    self.status = Some("Document text loaded into transcript".to_string());
                }
                Ok(Err(e)) => self.status = Some(format!("Extract failed: {}", e)),
                Err(e) => self.status = Some(format!("Extract task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.analyze_task) {
            match task.await {
                Ok(Ok(analysis)) => {
                    self.status = Some(format!("Analyzed {}", analysis.display_name()));
                    self.conversation.clear();
                    self.suggestions.clear();
                    self.open_report(analysis);
                    self.refresh_dashboard();
                }
                Ok(Err(e)) => self.status = Some(format!("Analysis failed: {}", e)),
                Err(e) => self.status = Some(format!("Analysis task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.report_task) {
            match task.await {
                Ok(Ok(analysis)) => {
                    self.conversation.clear();
                    self.suggestions.clear();
                    self.open_report(analysis);
                }
                Ok(Err(e)) => self.status = Some(format!("Could not open analysis: {}", e)),
                Err(e) => self.status = Some(format!("Report task failed: {}", e)),
            }
        }

        let chat_done = matches!(&self.chat_task, Some((_, t)) if t.is_finished());
        if chat_done {
            if let Some((seq, task)) = self.chat_task.take() {
                match task.await {
                    Ok(Ok(reply)) => {
                        if self.conversation.complete_request(seq, reply.text) {
                            if let Some(id) = reply.conversation_id {
                                self.conversation.set_conversation_id(id);
                            }
                            self.scroll_chat_to_bottom();
                        }
                    }
                    Ok(Err(e)) => {
                        self.conversation.fail_request(seq, &e.to_string());
                    }
                    Err(e) => {
                        self.conversation.fail_request(seq, &e.to_string());
                    }
                }
            }
        }

        let email_done = matches!(&self.email_task, Some((_, t)) if t.is_finished());
        if email_done {
            if let Some((seq, task)) = self.email_task.take() {
                match task.await {
                    Ok(Ok(draft)) => {
                        if self.conversation.complete_request(seq, draft) {
                            self.scroll_chat_to_bottom();
                        }
                    }
                    Ok(Err(e)) => {
                        self.conversation.fail_request(seq, &e.to_string());
                    }
                    Err(e) => {
                        self.conversation.fail_request(seq, &e.to_string());
                    }
                }
            }
        }

        if let Some(task) = take_finished(&mut self.suggestions_task) {
            match task.await {
                Ok(Ok(suggestions)) => {
                    self.suggestions = suggestions;
                    if !self.suggestions.is_empty() {
                        self.suggestions_state.select(Some(0));
                    }
                }
                // Suggestions are optional decoration; stay quiet on failure
                Ok(Err(e)) => tracing::debug!("suggestions unavailable: {}", e),
                Err(e) => tracing::debug!("suggestions task failed: {}", e),
            }
        }

        if let Some(task) = take_finished(&mut self.sheet_task) {
            match task.await {
                Ok(Ok(data)) => self.sheet_data = Some(data),
                Ok(Err(e)) => self.status = Some(format!("Sheet data unavailable: {}", e)),
                Err(e) => self.status = Some(format!("Sheet task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.export_task) {
            match task.await {
                Ok(Ok(path)) => self.status = Some(format!("Exported to {}", path)),
                Ok(Err(e)) => self.status = Some(format!("Export failed: {}", e)),
                Err(e) => self.status = Some(format!("Export task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.delete_task) {
            match task.await {
                Ok(Ok(id)) => {
                    self.history.retain(|a| a.id.as_deref() != Some(id.as_str()));
                    let len = self.history.len();
                    match self.history_state.selected() {
                        Some(i) if len > 0 => self.history_state.select(Some(i.min(len - 1))),
                        _ if len == 0 => self.history_state.select(None),
                        _ => {}
                    }
                    self.status = Some("Analysis deleted".to_string());
                }
                Ok(Err(e)) => self.status = Some(format!("Delete failed: {}", e)),
                Err(e) => self.status = Some(format!("Delete task failed: {}", e)),
            }
        }

        if let Some(task) = take_finished(&mut self.model_task) {
            match task.await {
                Ok(Ok(config)) => {
                    let current = self
                        .model_config
                        .as_ref()
                        .and_then(|c| c.model.clone())
                        .or_else(|| config.model.clone());
                    let selected = current
                        .and_then(|m| config.available_models.iter().position(|c| *c == m))
                        .unwrap_or(0);
                    self.model_picker_state.select(Some(selected));
                    self.model_config = Some(config);
                }
                Ok(Err(e)) => {
                    self.show_model_picker = false;
                    self.status = Some(format!("Model config unavailable: {}", e));
                }
                Err(e) => {
                    self.show_model_picker = false;
                    self.status = Some(format!("Model task failed: {}", e));
                }
            }
        }

        if let Some(task) = take_finished(&mut self.set_model_task) {
            match task.await {
                Ok(Ok(model)) => {
                    if let Some(config) = self.model_config.as_mut() {
                        config.model = Some(model.clone());
                    }
                    self.status = Some(format!("Model set to {}", model));
                }
                Ok(Err(e)) => self.status = Some(format!("Model update failed: {}", e)),
                Err(e) => self.status = Some(format!("Model update task failed: {}", e)),
            }
        }
    }
}

/// Take a background task out of its slot once it has finished; leave it in
/// place while it is still running.
fn take_finished<T>(slot: &mut Option<JoinHandle<T>>) -> Option<JoinHandle<T>> {
    if slot.as_ref().map(|t| t.is_finished()).unwrap_or(false) {
        slot.take()
    } else {
        None
    }
}

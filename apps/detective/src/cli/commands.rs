//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command runs against one [`Context`]: the loaded configuration,
//! the state database, the REST client and the restored stores. The board
//! session and the chat transcript are read at the start of the commands
//! that need them and written back after every change.

use crate::api::{ApiError, DetectiveClient, Language, SearchRequest};
use crate::auth::AuthStore;
use crate::chat::{CHAT_STATE_KEY, ChatMessage, ChatRole, ChatSession, ChatTranscript};
use crate::cli::BoardCommand;
use crate::config::Config;
use crate::controller::{
    BoardController, GraphRequest, mirror_board_into_store, sync_positions_into_store,
};
use crate::resources::{CaseCatalog, DocumentFeed, EntityIndex, SearchSession};
use detective_core::primitives::BOARD_STATE_KEY;
use detective_core::{
    BoardChange, BoardKind, DetectiveError, DocType, EntityType, EvidenceBoard, GameStore,
    ItemKind, JsonMap, MemoryStorage, PinnedItem, Position, RedbStorage, SharedStorage,
    SubmissionDraft, persist_state, restore_or_default,
};
use serde::Serialize;
use std::sync::Arc;

/// Entities fetched by listings and lookups.
const ENTITY_PAGE_LIMIT: usize = 100;

/// Characters of a search hit shown in text mode.
const SNIPPET_LENGTH: usize = 160;

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything a command needs, opened once per invocation.
pub struct Context {
    pub config: Config,
    pub json_mode: bool,
    pub storage: SharedStorage,
    pub client: DetectiveClient,
    pub auth: AuthStore,
    pub store: GameStore,
}

impl Context {
    /// Open storage and restore the auth and game stores.
    ///
    /// With `ephemeral` the state lives in memory and is gone after the
    /// command.
    pub async fn open(config: Config, json_mode: bool, ephemeral: bool) -> Result<Self, ApiError> {
        let storage = if ephemeral {
            MemoryStorage::shared()
        } else {
            let redb = RedbStorage::open(&config.state_path)?;
            Arc::new(redb) as SharedStorage
        };
        tracing::debug!(
            api_url = %config.api_url,
            state = ?config.state_path,
            ephemeral,
            "opening context"
        );

        let client = DetectiveClient::new(config.api_url.clone(), config.timeout())?;
        let auth = AuthStore::with_storage(client.clone(), Arc::clone(&storage)).await;
        let store = GameStore::with_storage(Arc::clone(&storage));

        Ok(Self {
            config,
            json_mode,
            storage,
            client,
            auth,
            store,
        })
    }

    fn active_case(&self) -> Result<String, ApiError> {
        self.store
            .current_case_id()
            .map(str::to_string)
            .ok_or(ApiError::NoActiveCase)
    }

    fn save_board(&self, board: &EvidenceBoard) -> Result<(), ApiError> {
        persist_state(self.storage.as_ref(), BOARD_STATE_KEY, board)?;
        Ok(())
    }

    /// Board session of `case_id`, caught up with the store's board items.
    fn board_controller(&self, case_id: &str) -> BoardController {
        let board: EvidenceBoard = restore_or_default(self.storage.as_ref(), BOARD_STATE_KEY);
        let mut controller = BoardController::new(self.client.clone(), case_id, board);
        controller.board_mut().sync_from_store(self.store.state());
        controller
    }

    fn chat_session(&self, case_id: &str) -> ChatSession {
        let transcript: ChatTranscript = restore_or_default(self.storage.as_ref(), CHAT_STATE_KEY);
        ChatSession::resume(self.client.clone(), case_id, transcript)
    }

    fn save_chat(&self, transcript: &ChatTranscript) -> Result<(), ApiError> {
        persist_state(self.storage.as_ref(), CHAT_STATE_KEY, transcript)?;
        Ok(())
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

fn print_title(title: &str) {
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
}

/// The recorded error of a request that produced nothing.
fn request_failed(error: Option<ApiError>) -> ApiError {
    error.unwrap_or_else(|| ApiError::Parse("request was superseded".to_string()))
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_LENGTH {
        return flat;
    }
    let cut: String = flat.chars().take(SNIPPET_LENGTH).collect();
    format!("{}...", cut)
}

fn print_message(message: &ChatMessage) {
    let speaker = match message.role {
        ChatRole::User => "You",
        ChatRole::Assistant => "Assistant",
    };
    println!("{}: {}", speaker, message.content);
    for citation in &message.citations {
        println!("    [{}] \"{}\"", citation.doc_id, citation.quote);
    }
}

// =============================================================================
// ACCOUNT COMMANDS
// =============================================================================

pub async fn cmd_login(ctx: &mut Context, email: &str, password: &str) -> Result<(), ApiError> {
    ctx.auth.login(email, password).await?;
    print_session(ctx, "Logged in");
    Ok(())
}

pub async fn cmd_register(
    ctx: &mut Context,
    email: &str,
    name: &str,
    password: &str,
    language: Option<Language>,
) -> Result<(), ApiError> {
    ctx.auth.register(email, password, name, language).await?;
    print_session(ctx, "Registered");
    Ok(())
}

fn print_session(ctx: &Context, verb: &str) {
    if ctx.json_mode {
        print_json(&serde_json::json!({
            "authenticated": ctx.auth.is_authenticated(),
            "user": ctx.auth.user(),
        }));
        return;
    }
    match ctx.auth.user() {
        Some(user) => println!("{} as {} <{}>", verb, user.name, user.email),
        None => println!("{}", verb),
    }
}

pub async fn cmd_logout(ctx: &mut Context) -> Result<(), ApiError> {
    ctx.auth.logout().await;
    if ctx.json_mode {
        print_json(&serde_json::json!({ "authenticated": false }));
    } else {
        println!("Logged out");
    }
    Ok(())
}

pub async fn cmd_profile(
    ctx: &mut Context,
    name: Option<String>,
    language: Option<Language>,
) -> Result<(), ApiError> {
    if name.is_some() || language.is_some() {
        ctx.auth.update_user(name, language).await?;
    }
    let Some(user) = ctx.auth.user() else {
        return Err(ApiError::NotAuthenticated);
    };

    if ctx.json_mode {
        print_json(user);
        return Ok(());
    }

    print_title("Profile");
    println!("Name:         {}", user.name);
    println!("Email:        {}", user.email);
    println!("Language:     {}", user.preferred_language.as_str());
    println!("Member since: {}", user.created_at);
    Ok(())
}

// =============================================================================
// CASE COMMANDS
// =============================================================================

pub async fn cmd_cases(ctx: &Context, skip: usize, limit: usize) -> Result<(), ApiError> {
    let mut catalog = CaseCatalog::new(ctx.client.clone());
    if catalog.load(skip, limit).await.is_none() {
        return Err(request_failed(catalog.take_error()));
    }
    let current = ctx.store.current_case_id();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "total": catalog.total(),
            "current_case_id": current,
            "cases": catalog.cases(),
        }));
        return Ok(());
    }

    print_title(&format!("Cases ({} total)", catalog.total()));
    if catalog.cases().is_empty() {
        println!("(no cases)");
    }
    for case in catalog.cases() {
        let marker = if current == Some(case.case_id.as_str()) { "*" } else { " " };
        println!(
            "{} {}  {}  [{}, difficulty {}]  {} documents, {} entities",
            marker,
            case.case_id,
            case.title,
            case.scenario_type,
            case.difficulty,
            case.document_count,
            case.entity_count
        );
    }
    Ok(())
}

/// Select the active case. Switching starts a fresh board and chat.
pub async fn cmd_case(ctx: &mut Context, case_id: &str) -> Result<(), ApiError> {
    let mut catalog = CaseCatalog::new(ctx.client.clone());
    let Some(case) = catalog.get(case_id).await else {
        return Err(request_failed(catalog.take_error()));
    };

    let switched = ctx.store.set_current_case(case.case_id.clone());
    if switched {
        ctx.save_board(&EvidenceBoard::for_case(case.case_id.as_str()))?;
        ctx.save_chat(&ChatTranscript::for_case(case.case_id.as_str()))?;
        tracing::info!(case_id = %case.case_id, "switched case");
    }

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "switched": switched,
            "case": case,
        }));
        return Ok(());
    }

    print_title(&case.title);
    println!("Case:       {}", case.case_id);
    println!("Scenario:   {}", case.scenario_type);
    println!("Difficulty: {}", case.difficulty);
    println!("Documents:  {}", case.document_count);
    println!("Entities:   {}", case.entity_count);
    if !switched {
        println!();
        println!("(already the active case, progress kept)");
    }
    Ok(())
}

pub async fn cmd_docs(
    ctx: &Context,
    doc_type: Option<DocType>,
    limit: usize,
    all: bool,
) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut feed = DocumentFeed::new(ctx.client.clone(), case_id, limit);
    if feed.set_filter(doc_type).await.is_none() {
        return Err(request_failed(feed.take_error()));
    }

    while all && feed.has_more() {
        let before = feed.documents().len();
        if feed.load_more().await.is_none() {
            return Err(request_failed(feed.take_error()));
        }
        if feed.documents().len() == before {
            tracing::warn!(total = feed.total(), "backend returned an empty page");
            break;
        }
    }

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "total": feed.total(),
            "has_more": feed.has_more(),
            "documents": feed.documents(),
        }));
        return Ok(());
    }

    print_title(&format!(
        "Documents ({} of {})",
        feed.documents().len(),
        feed.total()
    ));
    for doc in feed.documents() {
        let marker = if ctx.store.is_opened(&doc.doc_id) { "*" } else { " " };
        println!(
            "{} {:<12} {:<8} {}  {}",
            marker,
            doc.doc_id,
            doc.doc_type.as_str(),
            doc.ts,
            doc.title()
        );
    }
    if feed.has_more() {
        println!();
        println!("(more available, use --all)");
    }
    Ok(())
}

/// Show a document and remember it as opened.
pub async fn cmd_read(ctx: &mut Context, doc_id: &str) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut feed = DocumentFeed::new(ctx.client.clone(), case_id, 1);
    let Some(full) = feed.open(doc_id).await else {
        return Err(request_failed(feed.take_error()));
    };
    ctx.store.open_doc(full.document.doc_id.clone());

    if ctx.json_mode {
        print_json(&full);
        return Ok(());
    }

    let doc = &full.document;
    print_title(&doc.title());
    println!("Document: {}", doc.doc_id);
    println!("Type:     {}", doc.doc_type.as_str());
    println!("Date:     {}", doc.ts);
    if let Some(author) = &doc.author_entity_id {
        println!("Author:   {}", author);
    }
    println!();
    println!("{}", doc.body);
    if !full.chunks.is_empty() {
        println!();
        println!("Chunks: {}", full.chunks.len());
        for chunk in &full.chunks {
            println!("  {} #{}", chunk.chunk_id, chunk.chunk_index);
        }
    }
    Ok(())
}

pub async fn cmd_entities(ctx: &Context, entity_type: Option<EntityType>) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut index = EntityIndex::new(ctx.client.clone(), case_id, ENTITY_PAGE_LIMIT);
    if index.load(entity_type).await.is_none() {
        return Err(request_failed(index.take_error()));
    }

    if ctx.json_mode {
        print_json(index.entities());
        return Ok(());
    }

    print_title(&format!("Entities ({})", index.entities().len()));
    for entity in index.entities() {
        let suspect = if ctx.store.is_suspected(&entity.entity_id) { "!" } else { " " };
        let pinned = if ctx.store.is_pinned(&entity.entity_id) { "*" } else { " " };
        println!(
            "{}{} {:<12} {:<9} {}",
            suspect,
            pinned,
            entity.entity_id,
            entity.entity_type.as_str(),
            entity.name
        );
    }
    Ok(())
}

pub async fn cmd_search(
    ctx: &Context,
    query: String,
    k: Option<u32>,
    doc_types: Vec<DocType>,
    min_score: Option<f64>,
) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut request = SearchRequest::new(query);
    request.k = k;
    request.doc_types = Some(doc_types);
    request.min_score = min_score;

    let mut search = SearchSession::new(ctx.client.clone(), case_id);
    if search.search(request).await.is_none() {
        return Err(request_failed(search.take_error()));
    }

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "query": search.query(),
            "total": search.total(),
            "results": search.results(),
        }));
        return Ok(());
    }

    print_title(&format!("Search: {} ({} hits)", search.query(), search.total()));
    for hit in search.results() {
        println!(
            "{:.2}  {} #{} ({}) {}",
            hit.score,
            hit.doc_id,
            hit.chunk_index,
            hit.doc_type.as_str(),
            hit.subject.as_deref().unwrap_or("")
        );
        println!("      {}", snippet(&hit.text));
    }
    Ok(())
}

// =============================================================================
// EVIDENCE COMMANDS
// =============================================================================

/// Pin an item; documents and entities also land on the board.
pub async fn cmd_pin(
    ctx: &mut Context,
    kind: ItemKind,
    id: &str,
    label: Option<String>,
) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut data = JsonMap::new();

    let label = match (kind, label) {
        (_, Some(label)) => label,
        (ItemKind::Document, None) => {
            let mut feed = DocumentFeed::new(ctx.client.clone(), case_id.as_str(), 1);
            let Some(full) = feed.open(id).await else {
                return Err(request_failed(feed.take_error()));
            };
            data.insert("doc_type".into(), full.document.doc_type.as_str().into());
            data.insert("ts".into(), full.document.ts.clone().into());
            full.document.title()
        }
        (ItemKind::Entity, None) => {
            let mut index = EntityIndex::new(ctx.client.clone(), case_id.as_str(), 1);
            let Some(entity) = index.get(id).await else {
                return Err(request_failed(index.take_error()));
            };
            data.insert("entity_type".into(), entity.entity_type.as_str().into());
            entity.name
        }
        (ItemKind::Chunk, None) => {
            return Err(DetectiveError::InvalidInput(
                "chunks have no title to look up, pass --label".to_string(),
            )
            .into());
        }
    };

    let item = PinnedItem::new(id, kind, case_id, label.clone()).with_data(data);
    let pinned = ctx.store.pin_item(item);

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "pinned": pinned,
            "id": id,
            "type": kind.as_str(),
            "label": label,
        }));
    } else if pinned {
        println!("Pinned {} {} ({})", kind.as_str(), id, label);
    } else {
        println!("{} is already pinned", id);
    }
    Ok(())
}

/// Unpin an item and take its node off the board session.
pub fn cmd_unpin(ctx: &mut Context, id: &str) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let removed = ctx.store.unpin_item(id);

    if removed {
        let mut controller = ctx.board_controller(&case_id);
        for kind in [BoardKind::Document, BoardKind::Entity] {
            controller.board_mut().remove(&kind.node_id(id));
        }
        ctx.save_board(controller.board())?;
    }

    if ctx.json_mode {
        print_json(&serde_json::json!({ "unpinned": removed, "id": id }));
    } else if removed {
        println!("Unpinned {}", id);
    } else {
        println!("{} was not pinned", id);
    }
    Ok(())
}

/// Toggle a suspect. Only people can be suspected.
pub async fn cmd_suspect(ctx: &mut Context, entity_id: &str) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;

    if !ctx.store.is_suspected(entity_id) {
        let mut index = EntityIndex::new(ctx.client.clone(), case_id, 1);
        let Some(entity) = index.get(entity_id).await else {
            return Err(request_failed(index.take_error()));
        };
        if !entity.is_person() {
            return Err(DetectiveError::InvalidInput(format!(
                "{} is a {}, only people can be suspected",
                entity.name,
                entity.entity_type.as_str()
            ))
            .into());
        }
    }

    ctx.store.toggle_suspect(entity_id);
    let suspected = ctx.store.is_suspected(entity_id);

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "entity_id": entity_id,
            "suspected": suspected,
            "suspects": ctx.store.suspected_entities(),
        }));
    } else if suspected {
        println!("{} is now a suspect", entity_id);
    } else {
        println!("{} is no longer a suspect", entity_id);
    }
    Ok(())
}

// =============================================================================
// ASSISTANT COMMANDS
// =============================================================================

pub async fn cmd_hint(ctx: &mut Context, context: Option<String>) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut chat = ctx.chat_session(&case_id);

    let hint = chat.request_hint(context).await;
    let Some(hint) = hint else {
        return Err(request_failed(chat.take_error()));
    };
    ctx.store.use_hint();
    ctx.save_chat(chat.transcript())?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "hint": hint,
            "hints_remaining": chat.hints_remaining(),
            "hints_used": ctx.store.hints_used(),
        }));
        return Ok(());
    }

    println!("Hint: {}", hint);
    println!("({} hints remaining)", chat.hints_remaining());
    Ok(())
}

/// Send a message, or show the transcript when no message is given.
pub async fn cmd_chat(ctx: &mut Context, message: &str, clear: bool) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut chat = ctx.chat_session(&case_id);
    if clear {
        chat.clear();
        ctx.save_chat(chat.transcript())?;
    }

    if message.trim().is_empty() {
        if ctx.json_mode {
            print_json(chat.transcript());
            return Ok(());
        }
        print_title(&format!("Conversation ({} messages)", chat.messages().len()));
        for message in chat.messages() {
            print_message(message);
        }
        return Ok(());
    }

    let reply = chat.send_message(message).await.cloned();
    let Some(reply) = reply else {
        return Err(request_failed(chat.take_error()));
    };
    ctx.save_chat(chat.transcript())?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "conversation_id": chat.conversation_id(),
            "message": reply,
        }));
    } else {
        print_message(&reply);
    }
    Ok(())
}

// =============================================================================
// BOARD COMMAND
// =============================================================================

pub async fn cmd_board(ctx: &mut Context, action: BoardCommand) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let mut controller = ctx.board_controller(&case_id);

    let (change, note) = match action {
        BoardCommand::Show => (BoardChange::default(), None),
        BoardCommand::Hubs { limit } => {
            let change = controller
                .load_hubs(limit)
                .await
                .ok_or_else(|| request_failed(controller.take_error(GraphRequest::Hubs)))?;
            (change, Some(format!("Placed hubs, {} new nodes", change.nodes_added)))
        }
        BoardCommand::Expand { entity_id } => {
            let change = controller
                .expand(&entity_id)
                .await
                .ok_or_else(|| request_failed(controller.take_error(GraphRequest::Neighbors)))?;
            let note = if change.is_empty() {
                format!("Nothing new around {}", entity_id)
            } else {
                format!(
                    "Expanded {}: {} nodes, {} edges",
                    entity_id, change.nodes_added, change.edges_added
                )
            };
            (change, Some(note))
        }
        BoardCommand::Path {
            from,
            to,
            max_depth,
        } => {
            let nodes_before = controller.board().nodes().len();
            let edges_before = controller.board().edges().len();
            let path = controller
                .find_path(&from, &to, max_depth)
                .await
                .ok_or_else(|| request_failed(controller.take_error(GraphRequest::Path)))?;
            let change = BoardChange {
                nodes_added: controller.board().nodes().len() - nodes_before,
                edges_added: controller.board().edges().len() - edges_before,
            };
            let note = if path.found {
                format!("Path {} -> {} has length {}", from, to, path.length)
            } else {
                format!("No path between {} and {}", from, to)
            };
            (change, Some(note))
        }
        BoardCommand::Find { query } => {
            let mut index = EntityIndex::new(ctx.client.clone(), case_id.as_str(), ENTITY_PAGE_LIMIT);
            if index.load(None).await.is_none() {
                return Err(request_failed(index.take_error()));
            }
            let change = controller.board_mut().search(&query, index.entities());
            (change, Some(format!("Matches for '{}': {} new nodes", query, change.nodes_added)))
        }
        BoardCommand::Layout => {
            controller.board_mut().auto_layout();
            sync_positions_into_store(controller.board(), &mut ctx.store);
            (BoardChange::default(), Some("Arranged on a grid".to_string()))
        }
        BoardCommand::Move { id, x, y } => {
            let position = Position::new(x, y);
            if !position.is_finite() {
                return Err(DetectiveError::InvalidInput(format!(
                    "position ({}, {}) is not a finite number",
                    x, y
                ))
                .into());
            }
            if !controller.board_mut().move_node(&id, position) {
                return Err(DetectiveError::InvalidInput(format!("no board node '{}'", id)).into());
            }
            ctx.store.update_board_position(id.clone(), position);
            (BoardChange::default(), Some(format!("Moved {}", id)))
        }
        BoardCommand::Remove { id } => {
            let removed = controller.board_mut().remove(&id);
            if removed.is_empty() {
                return Err(DetectiveError::InvalidInput(format!("no board node '{}'", id)).into());
            }
            for node_id in &removed {
                ctx.store.remove_from_board(node_id.clone());
            }
            (BoardChange::default(), Some(format!("Removed {}", removed.join(", "))))
        }
        BoardCommand::Clear => {
            controller.board_mut().clear();
            ctx.store.clear_board();
            (BoardChange::default(), Some("Board cleared".to_string()))
        }
        BoardCommand::Sync => {
            let synced = controller
                .sync_graph()
                .await
                .ok_or_else(|| request_failed(controller.take_error(GraphRequest::Sync)))?;
            let stats = controller
                .stats()
                .await
                .ok_or_else(|| request_failed(controller.take_error(GraphRequest::Stats)))?;
            let note = format!(
                "Graph synced: {} nodes, {} relationships created; {} nodes, {} edges total",
                synced.nodes_created, synced.relationships_created, stats.total_nodes, stats.total_edges
            );
            (BoardChange::default(), Some(note))
        }
    };

    let mirrored = mirror_board_into_store(controller.board(), &mut ctx.store);
    ctx.save_board(controller.board())?;
    tracing::debug!(mirrored, "board saved");

    let board = controller.board();
    if ctx.json_mode {
        print_json(&serde_json::json!({
            "case_id": case_id,
            "change": change,
            "note": note,
            "nodes": board.nodes(),
            "edges": board.edges(),
            "expanded": board.expanded(),
        }));
        return Ok(());
    }

    print_title(&format!("Evidence Board ({})", case_id));
    if let Some(note) = note {
        println!("{}", note);
        println!();
    }
    println!("Nodes: {}", board.nodes().len());
    for node in board.nodes() {
        println!(
            "  {:<24} {:<28} ({:>5.0}, {:>5.0})  {}",
            node.id,
            node.label,
            node.position.x,
            node.position.y,
            node.color()
        );
    }
    println!("Edges: {}", board.edges().len());
    for edge in board.edges() {
        println!(
            "  {} -[{}]-> {}",
            edge.source, edge.relationship_type, edge.target
        );
    }
    Ok(())
}

// =============================================================================
// PROGRESS COMMANDS
// =============================================================================

pub fn cmd_status(ctx: &Context) -> Result<(), ApiError> {
    let state = ctx.store.state();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "api_url": ctx.config.api_url,
            "authenticated": ctx.auth.is_authenticated(),
            "user": ctx.auth.user().map(|u| u.email.as_str()),
            "current_case_id": state.current_case_id(),
            "pinned_items": state.pinned_items(),
            "suspected_entities": state.suspected_entities(),
            "opened_docs": state.opened_docs().len(),
            "board_items": state.board_items().len(),
            "hints_used": state.hints_used(),
        }));
        return Ok(());
    }

    print_title("Investigation Status");
    match ctx.auth.user() {
        Some(user) => println!("Player:      {} <{}>", user.name, user.email),
        None => println!("Player:      (not logged in)"),
    }
    println!("Backend:     {}", ctx.config.api_url);
    println!(
        "Case:        {}",
        state.current_case_id().unwrap_or("(none selected)")
    );
    println!("Opened docs: {}", state.opened_docs().len());
    println!("Board items: {}", state.board_items().len());
    println!("Hints used:  {}", state.hints_used());

    println!();
    println!("Pinned ({}):", state.pinned_items().len());
    for item in state.pinned_items() {
        println!("  - [{}] {} ({})", item.kind.as_str(), item.label, item.id);
    }
    println!("Suspects ({}):", state.suspected_entities().len());
    for entity_id in state.suspected_entities() {
        println!("  - {}", entity_id);
    }
    Ok(())
}

/// Assemble the accusation and report every rule it breaks.
pub async fn cmd_submit(
    ctx: &Context,
    culprits: Vec<String>,
    evidence: Vec<String>,
    all_evidence: bool,
    explanation: String,
) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;

    let mut draft = SubmissionDraft::new();
    if culprits.is_empty() {
        draft
            .culprit_ids
            .extend(ctx.store.suspected_entities().iter().cloned());
    } else {
        draft.culprit_ids.extend(culprits);
    }
    if all_evidence {
        draft.select_all_evidence(ctx.store.pinned_items());
    } else {
        draft.evidence_ids.extend(evidence);
    }
    draft.set_explanation(explanation);

    let mut index = EntityIndex::new(ctx.client.clone(), case_id.as_str(), ENTITY_PAGE_LIMIT);
    if index.load(Some(EntityType::Person)).await.is_none() {
        return Err(request_failed(index.take_error()));
    }
    let issues = draft.validate_against(ctx.store.pinned_items(), index.entities());

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "case_id": case_id,
            "valid": issues.is_empty(),
            "issues": issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "draft": draft,
        }));
    } else {
        print_title("Accusation");
        let culprits: Vec<&str> = draft.culprit_ids.iter().map(String::as_str).collect();
        let evidence: Vec<&str> = draft.evidence_ids.iter().map(String::as_str).collect();
        println!("Culprits:    {}", culprits.join(", "));
        println!("Evidence:    {}", evidence.join(", "));
        println!("Explanation: {}", draft.explanation.trim());
        println!();
        if issues.is_empty() {
            println!("Ready to submit.");
        } else {
            println!("Problems:");
            for issue in &issues {
                println!("  - {}", issue);
            }
        }
    }

    draft.check(ctx.store.pinned_items(), index.entities())?;
    Ok(())
}

/// Forget all progress on the active case, including board and chat.
pub fn cmd_reset(ctx: &mut Context) -> Result<(), ApiError> {
    let case_id = ctx.active_case()?;
    let changed = ctx.store.reset_case();
    ctx.save_board(&EvidenceBoard::for_case(case_id.as_str()))?;

    let mut chat = ctx.chat_session(&case_id);
    chat.clear();
    ctx.save_chat(chat.transcript())?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "case_id": case_id, "reset": changed }));
    } else {
        println!("Progress on {} cleared", case_id);
    }
    Ok(())
}

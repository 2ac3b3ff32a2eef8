//! Integration tests against a mock Office Detective backend.
//!
//! An axum router on an ephemeral port stands in for the REST API; the
//! client, the sessions and the CLI talk to it over real HTTP.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, patch, post},
};
use clap::Parser;
use detective::api::{ApiError, DetectiveClient, SearchRequest};
use detective::auth::{AuthSession, AuthStore};
use detective::chat::ChatSession;
use detective::cli::{Cli, execute};
use detective::controller::{BoardController, GraphRequest};
use detective::resources::{DocumentFeed, EntityIndex, SearchSession};
use detective_core::primitives::{AUTH_STATE_KEY, BOARD_STATE_KEY, PATH_ROW_Y};
use detective_core::{
    DocType, EntityType, EvidenceBoard, GameStore, GraphNode, JsonMap, MemoryStorage,
    RedbStorage, SharedStorage, restore_or_default,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "tok-123";
const DOC_COUNT: usize = 5;

// =============================================================================
// MOCK BACKEND
// =============================================================================

#[derive(Clone, Default)]
struct Mock {
    neighbor_calls: Arc<AtomicUsize>,
    hint_calls: Arc<AtomicUsize>,
    search_bodies: Arc<Mutex<Vec<Value>>>,
}

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

fn user(name: &str) -> Value {
    json!({
        "user_id": "u1",
        "email": "alice@example.com",
        "name": name,
        "preferred_language": "en",
        "created_at": "2026-01-01T00:00:00Z"
    })
}

fn case(case_id: &str) -> Value {
    json!({
        "case_id": case_id,
        "title": "The Padded Invoices",
        "scenario_type": "embezzlement",
        "difficulty": 2,
        "seed": 7,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
        "document_count": DOC_COUNT,
        "entity_count": 4
    })
}

fn document(index: usize) -> Value {
    json!({
        "doc_id": format!("d{index}"),
        "case_id": "c1",
        "doc_type": if index % 2 == 0 { "email" } else { "invoice" },
        "ts": format!("2026-03-0{index}T09:00:00Z"),
        "subject": format!("Document {index}"),
        "body": format!("Body of document {index}, approved by Mallory.")
    })
}

fn entity(entity_id: &str) -> Option<Value> {
    let (entity_type, name) = match entity_id {
        "e1" => ("person", "Mallory"),
        "e2" => ("person", "Bob"),
        "e3" => ("org", "Acme Supplies"),
        "e4" => ("account", "ACC-9"),
        _ => return None,
    };
    Some(json!({
        "entity_id": entity_id,
        "case_id": "c1",
        "entity_type": entity_type,
        "name": name,
        "attrs_json": {}
    }))
}

fn graph_node(entity_id: &str) -> Value {
    let entity = entity(entity_id).unwrap_or_else(|| json!({ "name": entity_id, "entity_type": "other" }));
    json!({
        "entity_id": entity_id,
        "name": entity["name"],
        "entity_type": entity["entity_type"],
        "properties": {}
    })
}

fn edge(source: &str, relationship: &str, target: &str) -> Value {
    json!({
        "source_id": source,
        "target_id": target,
        "relationship_type": relationship,
        "properties": {}
    })
}

fn param(query: &HashMap<String, String>, key: &str, default: usize) -> usize {
    query.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["password"] == "secret" {
        Ok(Json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "user": user("Alice")
        })))
    } else {
        Err(detail(StatusCode::UNAUTHORIZED, "Incorrect email or password"))
    }
}

async fn update_me(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let expected = format!("Bearer {TOKEN}");
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return Err(detail(StatusCode::UNAUTHORIZED, "Not authenticated"));
    }
    Ok(Json(user(body["name"].as_str().unwrap_or("Alice"))))
}

async fn list_cases() -> Json<Value> {
    Json(json!({ "cases": [case("c1")], "total": 1 }))
}

async fn get_case(Path(case_id): Path<String>) -> Reply {
    if case_id == "c1" {
        Ok(Json(case("c1")))
    } else {
        Err(detail(StatusCode::NOT_FOUND, "Case not found"))
    }
}

async fn list_documents(
    Path(_case_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let skip = param(&query, "skip", 0);
    let limit = param(&query, "limit", 20);
    let matching: Vec<Value> = (1..=DOC_COUNT)
        .map(document)
        .filter(|d| {
            query
                .get("doc_type")
                .is_none_or(|t| d["doc_type"] == t.as_str())
        })
        .collect();
    let total = matching.len();
    let page: Vec<Value> = matching.into_iter().skip(skip).take(limit).collect();
    Json(json!({ "documents": page, "total": total }))
}

async fn get_document(Path((_case_id, doc_id)): Path<(String, String)>) -> Reply {
    let index = doc_id
        .trim_start_matches('d')
        .parse::<usize>()
        .ok()
        .filter(|i| (1..=DOC_COUNT).contains(i));
    let Some(index) = index else {
        return Err(detail(StatusCode::NOT_FOUND, "Document not found"));
    };
    let mut doc = document(index);
    doc["chunks"] = json!([{
        "chunk_id": format!("{doc_id}-0"),
        "doc_id": doc_id,
        "case_id": "c1",
        "chunk_index": 0,
        "text": "approved by Mallory",
        "meta_json": {}
    }]);
    Ok(Json(doc))
}

async fn list_entities(
    Path(_case_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let entities: Vec<Value> = ["e1", "e2", "e3", "e4"]
        .into_iter()
        .filter_map(entity)
        .filter(|e| {
            query
                .get("entity_type")
                .is_none_or(|t| e["entity_type"] == t.as_str())
        })
        .collect();
    let total = entities.len();
    Json(json!({ "entities": entities, "total": total }))
}

async fn get_entity(Path((_case_id, entity_id)): Path<(String, String)>) -> Reply {
    entity(&entity_id)
        .map(Json)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Entity not found"))
}

async fn search(State(mock): State<Mock>, Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    mock.search_bodies.lock().unwrap().push(body);
    Json(json!({
        "query": query,
        "total": 1,
        "results": [{
            "chunk_id": "d1-0",
            "doc_id": "d1",
            "text": "Invoice approved by Mallory",
            "score": 0.91,
            "chunk_index": 0,
            "doc_type": "invoice",
            "subject": "Document 1",
            "ts": "2026-03-01T09:00:00Z",
            "meta_json": {}
        }]
    }))
}

async fn chat(Json(body): Json<Value>) -> Reply {
    let message = body["message"].as_str().unwrap_or_default();
    if message == "fail" {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "LLM unavailable"));
    }
    Ok(Json(json!({
        "message": format!("You asked: {message}"),
        "citations": [{
            "doc_id": "d1",
            "chunk_id": "d1-0",
            "quote": "approved by Mallory",
            "relevance": "high"
        }],
        "conversation_id": body["conversation_id"].as_str().unwrap_or("conv-1"),
        "suggested_actions": []
    })))
}

async fn hint(State(mock): State<Mock>) -> Json<Value> {
    let used = mock.hint_calls.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "hint": format!("Hint {used}: follow the money"),
        "hints_remaining": 3_usize.saturating_sub(used),
        "related_docs": ["d1"]
    }))
}

async fn sync() -> Json<Value> {
    Json(json!({
        "case_id": "c1",
        "nodes_created": 4,
        "relationships_created": 3,
        "status": "ok"
    }))
}

async fn stats() -> Json<Value> {
    Json(json!({
        "case_id": "c1",
        "total_nodes": 4,
        "total_edges": 3,
        "node_types": { "Person": 2, "Org": 1, "Account": 1 },
        "relationship_types": { "PAID": 1, "WORKS_FOR": 2 }
    }))
}

async fn hubs(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let limit = param(&query, "limit", 10);
    let hubs: Vec<Value> = [("e1", 3), ("e3", 2), ("e2", 1)]
        .into_iter()
        .take(limit)
        .map(|(id, degree)| {
            let node = graph_node(id);
            json!({
                "entity_id": id,
                "name": node["name"],
                "entity_type": node["entity_type"],
                "degree": degree
            })
        })
        .collect();
    let total = hubs.len();
    Json(json!({ "hubs": hubs, "total": total }))
}

async fn neighbors(
    State(mock): State<Mock>,
    Path((_case_id, entity_id)): Path<(String, String)>,
) -> Json<Value> {
    mock.neighbor_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "entity_id": entity_id,
        "neighbors": [graph_node("e2"), graph_node("e3")],
        "edges": [
            edge(&entity_id, "PAID", "e2"),
            edge(&entity_id, "WORKS_FOR", "e3")
        ],
        "total": 2
    }))
}

async fn path(Json(body): Json<Value>) -> Json<Value> {
    let from = body["from_entity_id"].as_str().unwrap_or_default();
    let to = body["to_entity_id"].as_str().unwrap_or_default();
    if to == "e4" {
        return Json(json!({ "nodes": [], "edges": [], "length": 0, "found": false }));
    }
    Json(json!({
        "nodes": [graph_node(from), graph_node("e3"), graph_node(to)],
        "edges": [edge(from, "WORKS_FOR", "e3"), edge("e3", "PAID", to)],
        "length": 2,
        "found": true
    }))
}

fn router(mock: Mock) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", patch(update_me))
        .route("/api/cases", get(list_cases))
        .route("/api/cases/{case_id}", get(get_case))
        .route("/api/cases/{case_id}/documents", get(list_documents))
        .route(
            "/api/cases/{case_id}/documents/{doc_id}/full",
            get(get_document),
        )
        .route("/api/cases/{case_id}/entities", get(list_entities))
        .route("/api/cases/{case_id}/entities/{entity_id}", get(get_entity))
        .route("/api/cases/{case_id}/search", post(search))
        .route("/api/cases/{case_id}/chat", post(chat))
        .route("/api/cases/{case_id}/chat/hint", post(hint))
        .route("/api/cases/{case_id}/graph/sync", post(sync))
        .route("/api/cases/{case_id}/graph/stats", get(stats))
        .route("/api/cases/{case_id}/graph/hubs", get(hubs))
        .route(
            "/api/cases/{case_id}/graph/neighbors/{entity_id}",
            get(neighbors),
        )
        .route("/api/cases/{case_id}/graph/path", post(path))
        .with_state(mock)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Start the mock backend on an ephemeral port.
async fn spawn_backend() -> (String, Mock) {
    let mock = Mock::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let app = router(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (url, mock)
}

fn client(url: &str) -> DetectiveClient {
    DetectiveClient::new(url, Duration::from_secs(5)).unwrap()
}

fn cli(url: &str, state: &std::path::Path, args: &[&str]) -> Cli {
    let mut argv = vec![
        "detective",
        "--json-mode",
        "--api-url",
        url,
        "--state",
        state.to_str().unwrap(),
    ];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

// =============================================================================
// CLIENT
// =============================================================================

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn error_detail_is_surfaced() {
        let (url, _mock) = spawn_backend().await;
        let err = client(&url).get_case("missing").await.unwrap_err();
        match err {
            ApiError::Http { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Case not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn ids_stay_inside_their_path_segment() {
        let (url, _mock) = spawn_backend().await;
        let client = client(&url);

        let found = client.get_entity("c1", "e1").await.unwrap();
        assert_eq!(found.name, "Mallory");

        for id in ["e1?limit=1", "e1#top", "x/../e2"] {
            let err = client.get_entity("c1", id).await.unwrap_err();
            assert_eq!(err.status(), Some(404), "id {id:?} reached another record");
        }
    }

    #[tokio::test]
    async fn bearer_token_is_sent_once_set() {
        let (url, _mock) = spawn_backend().await;
        let client = client(&url);
        let update = detective::api::UserUpdate {
            name: Some("Alice B".into()),
            preferred_language: None,
        };

        let err = client.update_me(&update).await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        client.set_token(Some(TOKEN.into())).await;
        let user = client.update_me(&update).await.unwrap();
        assert_eq!(user.name, "Alice B");
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let err = client("http://127.0.0.1:9").list_cases(0, 20).await.unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[tokio::test]
    async fn case_list_parses() {
        let (url, _mock) = spawn_backend().await;
        let cases = client(&url).list_cases(0, 20).await.unwrap();
        assert_eq!(cases.total, 1);
        assert_eq!(cases.cases[0].case_id, "c1");
        assert_eq!(cases.cases[0].document_count, DOC_COUNT);
    }
}

// =============================================================================
// AUTH
// =============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn login_persists_and_restores_session() {
        let (url, _mock) = spawn_backend().await;
        let storage = MemoryStorage::shared();

        let mut auth = AuthStore::with_storage(client(&url), Arc::clone(&storage)).await;
        auth.login("alice@example.com", "secret").await.unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.token(), Some(TOKEN));

        let restored_client = client(&url);
        let restored = AuthStore::with_storage(restored_client.clone(), Arc::clone(&storage)).await;
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().map(|u| u.name.as_str()), Some("Alice"));
        assert!(restored_client.has_token().await);
    }

    #[tokio::test]
    async fn failed_login_keeps_logged_out() {
        let (url, _mock) = spawn_backend().await;
        let mut auth = AuthStore::new(client(&url));

        let err = auth.login("alice@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!auth.is_authenticated());
        assert!(!auth.is_loading());
        assert!(auth.error().unwrap().contains("Incorrect email or password"));
    }

    #[tokio::test]
    async fn update_user_needs_login() {
        let (url, _mock) = spawn_backend().await;
        let mut auth = AuthStore::new(client(&url));
        let err = auth.update_user(Some("Eve".into()), None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));

        auth.login("alice@example.com", "secret").await.unwrap();
        auth.update_user(Some("Alice B".into()), None).await.unwrap();
        assert_eq!(auth.user().map(|u| u.name.as_str()), Some("Alice B"));
    }

    #[tokio::test]
    async fn logout_clears_persisted_session() {
        let (url, _mock) = spawn_backend().await;
        let storage = MemoryStorage::shared();
        let client = client(&url);

        let mut auth = AuthStore::with_storage(client.clone(), Arc::clone(&storage)).await;
        auth.login("alice@example.com", "secret").await.unwrap();
        auth.logout().await;

        assert!(!client.has_token().await);
        let session: AuthSession = restore_or_default(storage.as_ref(), AUTH_STATE_KEY);
        assert_eq!(session, AuthSession::default());
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

mod resource_tests {
    use super::*;

    #[tokio::test]
    async fn document_feed_pages_until_total() {
        let (url, _mock) = spawn_backend().await;
        let mut feed = DocumentFeed::new(client(&url), "c1", 2);

        assert_eq!(feed.refresh().await.unwrap().len(), 2);
        assert!(feed.has_more());
        feed.load_more().await.unwrap();
        feed.load_more().await.unwrap();

        assert_eq!(feed.documents().len(), DOC_COUNT);
        assert!(!feed.has_more());
        assert!(feed.load_more().await.is_none(), "nothing left to load");
        assert!(feed.error().is_none());
    }

    #[tokio::test]
    async fn document_filter_restarts_listing() {
        let (url, _mock) = spawn_backend().await;
        let mut feed = DocumentFeed::new(client(&url), "c1", 10);
        feed.refresh().await.unwrap();

        let emails = feed.set_filter(Some(DocType::Email)).await.unwrap();
        assert_eq!(emails.len(), 2);
        assert!(emails.iter().all(|d| d.doc_type == DocType::Email));
        assert_eq!(feed.total(), 2);
    }

    #[tokio::test]
    async fn missing_document_records_error() {
        let (url, _mock) = spawn_backend().await;
        let mut feed = DocumentFeed::new(client(&url), "c1", 10);
        assert!(feed.open("d99").await.is_none());
        assert_eq!(feed.error().and_then(ApiError::status), Some(404));

        let full = feed.open("d1").await.unwrap();
        assert_eq!(full.document.doc_id, "d1");
        assert_eq!(full.chunks.len(), 1);
    }

    #[tokio::test]
    async fn entity_index_filters_and_caches() {
        let (url, _mock) = spawn_backend().await;
        let mut index = EntityIndex::new(client(&url), "c1", 100);

        let people = index.load(Some(EntityType::Person)).await.unwrap();
        assert_eq!(people.len(), 2);

        let cached = index.get("e1").await.unwrap();
        assert_eq!(cached.name, "Mallory");
        let fetched = index.get("e3").await.unwrap();
        assert_eq!(fetched.entity_type, EntityType::Org);
    }

    #[tokio::test]
    async fn search_omits_empty_doc_types() {
        let (url, mock) = spawn_backend().await;
        let mut session = SearchSession::new(client(&url), "c1");

        let mut request = SearchRequest::new("invoice");
        request.doc_types = Some(Vec::new());
        let results = session.search(request).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(session.query(), "invoice");

        let bodies = mock.search_bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].get("doc_types").is_none());
        assert_eq!(bodies[0]["k"], SearchSession::DEFAULT_K);
    }
}

// =============================================================================
// CHAT
// =============================================================================

mod chat_tests {
    use super::*;

    #[tokio::test]
    async fn reply_keeps_conversation() {
        let (url, _mock) = spawn_backend().await;
        let mut chat = ChatSession::new(client(&url), "c1");

        let reply = chat.send_message("who approved d1?").await.unwrap();
        assert_eq!(reply.content, "You asked: who approved d1?");
        assert_eq!(reply.citations.len(), 1);
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.conversation_id(), Some("conv-1"));
    }

    #[tokio::test]
    async fn failed_message_is_taken_back() {
        let (url, _mock) = spawn_backend().await;
        let mut chat = ChatSession::new(client(&url), "c1");
        chat.send_message("hello").await.unwrap();

        assert!(chat.send_message("fail").await.is_none());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.error().and_then(ApiError::status), Some(500));
    }

    #[tokio::test]
    async fn hints_stop_at_zero_without_request() {
        let (url, mock) = spawn_backend().await;
        let mut chat = ChatSession::new(client(&url), "c1");

        for expected in [2, 1, 0] {
            assert!(chat.request_hint(None).await.is_some());
            assert_eq!(chat.hints_remaining(), expected);
        }
        assert!(chat.request_hint(Some("stuck".into())).await.is_none());
        assert!(matches!(chat.error(), Some(ApiError::NoHintsRemaining)));
        assert_eq!(mock.hint_calls.load(Ordering::SeqCst), 3);
        assert!(chat.messages().iter().all(|m| m.content.starts_with("Hint: ")));
    }
}

// =============================================================================
// BOARD CONTROLLER
// =============================================================================

mod controller_tests {
    use super::*;

    fn centre(id: &str) -> GraphNode {
        GraphNode {
            entity_id: id.into(),
            name: id.to_uppercase(),
            entity_type: EntityType::Person,
            properties: JsonMap::new(),
        }
    }

    #[tokio::test]
    async fn expansion_is_fetched_once() {
        let (url, mock) = spawn_backend().await;
        let mut controller = BoardController::new(client(&url), "c1", EvidenceBoard::for_case("c1"));
        controller.board_mut().add_graph_node(&centre("e1"), None);

        let first = controller.expand("e1").await.unwrap();
        assert_eq!(first.nodes_added, 2);
        assert_eq!(first.edges_added, 2);

        let second = controller.expand("e1").await.unwrap();
        assert!(second.is_empty());
        assert_eq!(mock.neighbor_calls.load(Ordering::SeqCst), 1);
        assert!(controller.board().is_expanded("e1"));
    }

    #[tokio::test]
    async fn expanding_absent_entity_fetches_again_once_placed() {
        let (url, mock) = spawn_backend().await;
        let mut controller = BoardController::new(client(&url), "c1", EvidenceBoard::for_case("c1"));

        let first = controller.expand("e1").await.unwrap();
        assert_eq!(first.nodes_added, 2);
        assert_eq!(first.edges_added, 0, "centre node is not on the board");
        assert!(controller.board().needs_expansion("e1"));

        controller.board_mut().add_graph_node(&centre("e1"), None);
        let second = controller.expand("e1").await.unwrap();
        assert_eq!(second.nodes_added, 0);
        assert_eq!(second.edges_added, 2);
        assert_eq!(mock.neighbor_calls.load(Ordering::SeqCst), 2);
        assert!(controller.board().is_expanded("e1"));
    }

    #[tokio::test]
    async fn hubs_then_expand_draws_edges() {
        let (url, _mock) = spawn_backend().await;
        let mut controller = BoardController::new(client(&url), "c1", EvidenceBoard::for_case("c1"));

        let hubs = controller.load_hubs(10).await.unwrap();
        assert_eq!(hubs.nodes_added, 3);

        let change = controller.expand("e1").await.unwrap();
        assert_eq!(change.nodes_added, 0);
        assert_eq!(change.edges_added, 2);
        assert_eq!(controller.board().nodes().len(), 3);
    }

    #[tokio::test]
    async fn path_is_laid_out_as_row() {
        let (url, _mock) = spawn_backend().await;
        let mut controller = BoardController::new(client(&url), "c1", EvidenceBoard::for_case("c1"));

        let path = controller.find_path("e1", "e2", Some(50)).await.unwrap();
        assert!(path.found);
        assert_eq!(controller.board().nodes().len(), 3);
        assert!(controller.board().nodes().iter().all(|n| n.position.y == PATH_ROW_Y));
        assert_eq!(controller.board().edges().len(), 2);

        let missing = controller.find_path("e1", "e4", None).await.unwrap();
        assert!(!missing.found);
        assert_eq!(controller.board().nodes().len(), 3);
    }

    #[tokio::test]
    async fn failed_query_leaves_board_untouched() {
        let mut controller = BoardController::new(
            client("http://127.0.0.1:9"),
            "c1",
            EvidenceBoard::for_case("c1"),
        );
        assert!(controller.load_hubs(10).await.is_none());
        assert!(controller.board().is_empty());
        assert!(controller.tracker(GraphRequest::Hubs).error().is_some());
        assert!(controller.take_error(GraphRequest::Hubs).is_some());
        assert!(controller.tracker(GraphRequest::Hubs).error().is_none());
    }

    #[tokio::test]
    async fn sync_and_stats() {
        let (url, _mock) = spawn_backend().await;
        let mut controller = BoardController::new(client(&url), "c1", EvidenceBoard::for_case("c1"));
        let synced = controller.sync_graph().await.unwrap();
        assert_eq!(synced.nodes_created, 4);
        let stats = controller.stats().await.unwrap();
        assert_eq!(stats.relationship_types.get("WORKS_FOR"), Some(&2));
    }
}

// =============================================================================
// CLI
// =============================================================================

mod cli_tests {
    use super::*;

    #[tokio::test]
    async fn investigation_survives_restart() {
        let (url, mock) = spawn_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("game.db");

        for args in [
            &["login", "alice@example.com", "-p", "secret"][..],
            &["case", "c1"],
            &["pin", "entity", "e1"],
            &["pin", "doc", "d1"],
            &["read", "d2"],
            &["board", "expand", "e1"],
            &["board", "expand", "e1"],
            &["suspect", "e1"],
        ] {
            execute(cli(&url, &state, args)).await.unwrap();
        }
        assert_eq!(mock.neighbor_calls.load(Ordering::SeqCst), 1);

        let storage: SharedStorage = Arc::new(RedbStorage::open(&state).unwrap());
        let store = GameStore::with_storage(Arc::clone(&storage));
        assert_eq!(store.current_case_id(), Some("c1"));
        assert!(store.is_pinned("e1"));
        assert!(store.is_pinned("d1"));
        assert!(store.is_opened("d2"));
        assert!(store.is_suspected("e1"));
        assert!(store.is_on_board("document-d1"));
        assert!(store.is_on_board("entity-e2"), "neighbors are mirrored into the store");

        let board: EvidenceBoard = restore_or_default(storage.as_ref(), BOARD_STATE_KEY);
        assert!(board.is_expanded("e1"));
        assert_eq!(board.edges().len(), 2);

        let session: AuthSession = restore_or_default(storage.as_ref(), AUTH_STATE_KEY);
        assert_eq!(session.token.as_deref(), Some(TOKEN));
    }

    #[tokio::test]
    async fn only_people_can_be_suspected() {
        let (url, _mock) = spawn_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("game.db");

        execute(cli(&url, &state, &["case", "c1"])).await.unwrap();
        let err = execute(cli(&url, &state, &["suspect", "e3"])).await.unwrap_err();
        assert!(err.to_string().contains("only people can be suspected"));
    }

    #[tokio::test]
    async fn commands_need_a_case() {
        let (url, _mock) = spawn_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("game.db");

        let err = execute(cli(&url, &state, &["board", "hubs"])).await.unwrap_err();
        assert!(matches!(err, ApiError::NoActiveCase));
    }

    #[tokio::test]
    async fn submit_checks_the_accusation() {
        let (url, _mock) = spawn_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("game.db");

        for args in [
            &["case", "c1"][..],
            &["pin", "doc", "d1"],
            &["suspect", "e1"],
        ] {
            execute(cli(&url, &state, args)).await.unwrap();
        }

        let short = execute(cli(&url, &state, &["submit", "--all-evidence", "-x", "Mallory"]))
            .await
            .unwrap_err();
        assert!(short.to_string().contains("explanation"));

        let org = execute(cli(
            &url,
            &state,
            &["submit", "-c", "e3", "-e", "d1", "-x", "Acme billed for goods never shipped"],
        ))
        .await
        .unwrap_err();
        assert!(org.to_string().contains("not a known person"));

        execute(cli(
            &url,
            &state,
            &["submit", "--all-evidence", "-x", "Mallory approved her own padded invoices"],
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn reset_clears_board_session() {
        let (url, _mock) = spawn_backend().await;
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("game.db");

        execute(cli(&url, &state, &["case", "c1"])).await.unwrap();
        execute(cli(&url, &state, &["board", "hubs"])).await.unwrap();
        execute(cli(&url, &state, &["reset"])).await.unwrap();

        let storage: SharedStorage = Arc::new(RedbStorage::open(&state).unwrap());
        let board: EvidenceBoard = restore_or_default(storage.as_ref(), BOARD_STATE_KEY);
        assert!(board.is_empty());
        assert_eq!(board.case_id(), Some("c1"));
        assert!(GameStore::with_storage(storage).board_items().is_empty());
    }
}

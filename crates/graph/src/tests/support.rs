//! Scripted test doubles for the pipeline.
//!
//! Each double replays a queue of canned replies and records what it was
//! asked, so scenarios can assert both the transcript and the final
//! answer. Components each get their own `ScriptedChat`, which keeps the
//! scripts independent of call interleaving across stages.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use verity_core::{AppError, AppResult};
use verity_evidence::{Document, EvidenceStore, SearchClient, SearchHit};
use verity_llm::{
    BinaryScore, ChatClient, ChatReply, ClassifyRequest, GenerateRequest, RouteReply,
    RouteRequest, TokenUsage, ToolSelection,
};

/// Chat client that replays scripted replies per operation.
#[derive(Default)]
pub struct ScriptedChat {
    generations: Mutex<VecDeque<String>>,
    verdicts: Mutex<VecDeque<BinaryScore>>,
    routes: Mutex<VecDeque<RouteReply>>,
    pub generate_requests: Mutex<Vec<GenerateRequest>>,
    pub classify_requests: Mutex<Vec<ClassifyRequest>>,
    pub route_requests: Mutex<Vec<RouteRequest>>,
}

impl ScriptedChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_generation(&self, text: &str) {
        self.generations
            .lock()
            .unwrap()
            .push_back(text.to_string());
    }

    pub fn push_verdict(&self, score: BinaryScore) {
        self.verdicts.lock().unwrap().push_back(score);
    }

    pub fn push_route(&self, reply: RouteReply) {
        self.routes.lock().unwrap().push_back(reply);
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_requests.lock().unwrap().len()
    }

    pub fn classify_calls(&self) -> usize {
        self.classify_requests.lock().unwrap().len()
    }

    pub fn route_calls(&self) -> usize {
        self.route_requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ChatClient for ScriptedChat {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<ChatReply> {
        self.generate_requests.lock().unwrap().push(request.clone());
        let text = self
            .generations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Llm("no scripted generation left".to_string()))?;
        Ok(ChatReply {
            text,
            model: request.model.clone(),
            usage: TokenUsage::default(),
        })
    }

    async fn classify(&self, request: &ClassifyRequest) -> AppResult<BinaryScore> {
        self.classify_requests.lock().unwrap().push(request.clone());
        self.verdicts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Llm("no scripted verdict left".to_string()))
    }

    async fn route(&self, request: &RouteRequest) -> AppResult<RouteReply> {
        self.route_requests.lock().unwrap().push(request.clone());
        self.routes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Llm("no scripted route left".to_string()))
    }
}

/// Route replies the scenarios script against.
pub fn route_to(name: &str, query: &str) -> RouteReply {
    RouteReply {
        selections: Some(vec![ToolSelection {
            name: name.to_string(),
            query: Some(query.to_string()),
        }]),
    }
}

pub fn route_declined() -> RouteReply {
    RouteReply { selections: None }
}

pub fn route_ambiguous() -> RouteReply {
    RouteReply {
        selections: Some(vec![]),
    }
}

/// Evidence store returning a fixed document set.
pub struct FixedStore {
    documents: Vec<Document>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl FixedStore {
    pub fn new(documents: Vec<Document>) -> Arc<Self> {
        Arc::new(Self {
            documents,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn query_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl EvidenceStore for FixedStore {
    async fn query(&self, question: &str, top_k: usize) -> AppResult<Vec<Document>> {
        self.queries
            .lock()
            .unwrap()
            .push((question.to_string(), top_k));
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

/// Search client returning fixed hits.
pub struct FixedSearch {
    hits: Vec<SearchHit>,
    pub queries: Mutex<Vec<String>>,
}

impl FixedSearch {
    pub fn new(hits: Vec<SearchHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn search_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SearchClient for FixedSearch {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, query: &str) -> AppResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.clone())
    }
}

pub fn hit(title: &str, content: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: format!("https://example.com/{}", title),
        content: content.to_string(),
        score: 0.9,
        published_date: None,
    }
}

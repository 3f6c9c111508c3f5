// Retrieval-augmented question answering over the stored chunks

pub mod prompt;


use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::config::Config;
use crate::llm::{Embedder, LanguageModel, OllamaClient};
use crate::processor::{Chunk, DocumentProcessor, InputOutcome, RawInput};
use crate::vector_store::{DEFAULT_TOP_K, VectorStore};

pub use prompt::{PromptTemplate, RAG_PROMPT};

/// Separator between retrieved chunks in the prompt context
const CONTEXT_SEPARATOR: &str = "\n\n";

/// An answer and the chunks it was generated from, best match first
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Chunk>,
}

/// What an ingestion run did with each input
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub outcomes: Vec<InputOutcome>,
    pub chunks_added: usize,
}

impl IngestReport {
    #[inline]
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    #[inline]
    pub fn ingested(&self) -> usize {
        self.outcomes.len() - self.skipped()
    }
}

/// Size and shape of the knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseStatus {
    pub collection: String,
    pub vector_size: usize,
    pub chunk_count: u64,
}

/// Document processor, vector store and language model behind one prompt
pub struct RagSystem {
    processor: DocumentProcessor,
    vector_store: VectorStore,
    llm: Arc<dyn LanguageModel>,
    prompt: PromptTemplate,
    top_k: usize,
}

impl std::fmt::Debug for RagSystem {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagSystem")
            .field("processor", &self.processor)
            .field("vector_store", &self.vector_store)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl RagSystem {
    /// Connect to Ollama and Qdrant as configured; the collection is created if missing
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let ollama = Arc::new(OllamaClient::new(&config.ollama)?);
        let embedder: Arc<dyn Embedder> = Arc::<OllamaClient>::clone(&ollama);
        let vector_store = VectorStore::from_config(&config.qdrant, embedder)?;

        info!(
            "RAG system ready (chat model: {}, collection: {})",
            ollama.chat_model(),
            vector_store.collection_name()
        );

        Ok(Self::from_parts(
            DocumentProcessor::new(config.chunking),
            vector_store,
            ollama,
            config.retrieval.top_k,
        ))
    }

    #[inline]
    pub fn from_parts(
        processor: DocumentProcessor,
        vector_store: VectorStore,
        llm: Arc<dyn LanguageModel>,
        top_k: usize,
    ) -> Self {
        Self {
            processor,
            vector_store,
            llm,
            prompt: PromptTemplate::default(),
            top_k: if top_k == 0 { DEFAULT_TOP_K } else { top_k },
        }
    }

    #[inline]
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    #[inline]
    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }

    #[inline]
    pub fn vector_store(&self) -> &VectorStore {
        &self.vector_store
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Chunk every input and store the result. Nothing is stored unless
    /// every input was processed.
    #[inline]
    pub fn add_documents(&self, inputs: &[RawInput]) -> Result<IngestReport> {
        let outcomes = self.processor.process_inputs(inputs)?;
        let chunks: Vec<Chunk> = outcomes
            .iter()
            .flat_map(|outcome| outcome.chunks().iter().cloned())
            .collect();

        let chunks_added = self.vector_store.add_documents(&chunks)?;
        info!(
            "Ingested {} inputs into {} chunks",
            outcomes.len(),
            chunks_added
        );

        Ok(IngestReport {
            outcomes,
            chunks_added,
        })
    }

    /// Ingest a file stored at `path` under the name the user knows it by
    #[inline]
    pub fn add_upload(&self, path: &Path, name: &str) -> Result<usize> {
        let chunks = self.processor.process_file_as(path, name)?;
        self.vector_store.add_documents(&chunks)
    }

    /// Answer `question` from the `top_k` most similar chunks
    #[inline]
    pub fn query(&self, question: &str) -> Result<QueryResponse> {
        let sources = self.vector_store.similarity_search(question, self.top_k)?;
        debug!("Answering with {} retrieved chunks", sources.len());

        let context = sources
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        let prompt = self.prompt.format(&context, question);

        let answer = self.llm.generate(&prompt)?;
        Ok(QueryResponse { answer, sources })
    }

    #[inline]
    pub fn clear_knowledge_base(&self) -> Result<()> {
        self.vector_store.clear_collection()
    }

    #[inline]
    pub fn status(&self) -> Result<KnowledgeBaseStatus> {
        Ok(KnowledgeBaseStatus {
            collection: self.vector_store.collection_name().to_string(),
            vector_size: self.vector_store.vector_params().size,
            chunk_count: self.vector_store.count()?,
        })
    }
}

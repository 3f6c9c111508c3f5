// Per-session bookkeeping of what the user has already fed the knowledge base


use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::processor::RawInput;
use crate::rag::{QueryResponse, RagSystem};
use crate::{RagError, Result};

/// Characters of a source chunk shown under an answer
pub const PREVIEW_CHARS: usize = 200;

/// First [`PREVIEW_CHARS`] characters of `text`, always followed by `...`
#[inline]
pub fn source_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    Ingested { chunks: usize },
    /// The name or URL was already ingested in this session
    AlreadyPresent,
}

/// Upload and URL history for one interactive session
#[derive(Debug)]
pub struct Session<'a> {
    rag: &'a RagSystem,
    uploaded_files: Vec<String>,
    urls: Vec<String>,
}

impl<'a> Session<'a> {
    #[inline]
    pub fn new(rag: &'a RagSystem) -> Self {
        Self {
            rag,
            uploaded_files: Vec::new(),
            urls: Vec::new(),
        }
    }

    #[inline]
    pub fn uploaded_files(&self) -> &[String] {
        &self.uploaded_files
    }

    #[inline]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Ingest uploaded bytes under `name`. The bytes go through a temporary
    /// file with the same extension, removed once ingestion is over.
    #[inline]
    pub fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<SessionUpdate> {
        if self.uploaded_files.iter().any(|f| f == name) {
            debug!("{} already uploaded this session", name);
            return Ok(SessionUpdate::AlreadyPresent);
        }

        let suffix = Path::new(name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut temp_file = tempfile::Builder::new()
            .prefix("simple-rag-upload-")
            .suffix(&suffix)
            .tempfile()?;
        temp_file.write_all(bytes)?;
        temp_file.flush()?;

        let chunks = self.rag.add_upload(temp_file.path(), name)?;
        temp_file.close()?;

        self.uploaded_files.push(name.to_string());
        info!("Uploaded {} ({} chunks)", name, chunks);
        Ok(SessionUpdate::Ingested { chunks })
    }

    /// Upload a local file under its file name
    #[inline]
    pub fn upload_file(&mut self, path: &Path) -> Result<SessionUpdate> {
        if !path.exists() {
            return Err(RagError::NotFound(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RagError::NotFound(path.to_path_buf()))?;
        let bytes = fs::read(path)?;

        self.upload(&name, &bytes)
    }

    #[inline]
    pub fn add_url(&mut self, url: &str) -> Result<SessionUpdate> {
        if self.urls.iter().any(|u| u == url) {
            debug!("{} already added this session", url);
            return Ok(SessionUpdate::AlreadyPresent);
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RagError::Fetch {
                url: url.to_string(),
                message: "Only http and https URLs can be added".to_string(),
            });
        }

        let report = self.rag.add_documents(&[RawInput::from(url)])?;
        self.urls.push(url.to_string());
        Ok(SessionUpdate::Ingested {
            chunks: report.chunks_added,
        })
    }

    #[inline]
    pub fn ask(&self, question: &str) -> Result<QueryResponse> {
        self.rag.query(question)
    }

    /// Empty the knowledge base and forget everything ingested this session
    #[inline]
    pub fn clear(&mut self) -> Result<()> {
        self.rag.clear_knowledge_base()?;
        self.uploaded_files.clear();
        self.urls.clear();
        Ok(())
    }
}

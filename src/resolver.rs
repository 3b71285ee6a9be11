//! # Image Resolution
//!
//! Every distinct image URL in the document, image nodes and table cells
//! alike, is fetched exactly once, before layout begins. Fetches run
//! concurrently, but there is a hard barrier: layout never starts until
//! every URL has resolved, so a render pass can always look dimensions up
//! synchronously.
//!
//! Each resolved image gets a disposable backing file inside a temporary
//! directory owned by the [`ImageStore`]. Dropping the store deletes the
//! files, so cleanup happens whether the render succeeded or not.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::task::JoinSet;

use crate::error::FolioError;
use crate::model::{Cell, CellContent, ContentKind, Document, Table};

/// Metadata for one resolved image: local backing file plus intrinsic
/// pixel dimensions.
#[derive(Debug, Clone)]
pub struct ImageProperties {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

/// The shared lookup produced by resolution, keyed by URL. Read-only once
/// layout starts. Owns the temporary directory holding every backing file;
/// the files are deleted when the store drops.
pub struct ImageStore {
    _dir: Option<TempDir>,
    by_url: HashMap<String, ImageProperties>,
}

impl ImageStore {
    /// A store with no images, for documents that reference none.
    pub fn empty() -> Self {
        ImageStore {
            _dir: None,
            by_url: HashMap::new(),
        }
    }

    pub fn get(&self, url: &str) -> Option<&ImageProperties> {
        self.by_url.get(url)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

/// Transport for image bytes. Production uses [`HttpFetcher`]; tests
/// substitute an in-memory implementation.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FolioError>;
}

/// Fetches image bytes over HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        HttpFetcher {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FolioError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(url, e))?;
        let bytes = response.bytes().await.map_err(|e| fetch_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn fetch_error(url: &str, reason: impl ToString) -> FolioError {
    FolioError::Fetch {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Prefetches every image the document references.
pub struct ImageResolver {
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageResolver {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        ImageResolver { fetcher }
    }

    /// Resolve all distinct image URLs in `doc` concurrently and wait for
    /// every one of them. Any single failure aborts the whole resolve.
    pub async fn resolve(&self, doc: &Document) -> Result<ImageStore, FolioError> {
        let urls = collect_urls(doc);
        if urls.is_empty() {
            return Ok(ImageStore::empty());
        }

        log::debug!("resolving {} distinct image url(s)", urls.len());

        let dir = tempfile::tempdir().map_err(|e| FolioError::Fetch {
            url: "<image store>".to_string(),
            reason: format!("could not create temporary directory: {e}"),
        })?;

        let mut tasks = JoinSet::new();
        for (i, url) in urls.into_iter().enumerate() {
            let extension = validate_url(&url)?;
            let path = dir.path().join(format!("image-{i}.{extension}"));
            let fetcher = Arc::clone(&self.fetcher);
            tasks.spawn(async move { resolve_one(fetcher, url, path).await });
        }

        let mut by_url = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (url, properties) = joined.map_err(|e| FolioError::Fetch {
                url: "<image store>".to_string(),
                reason: format!("resolver task failed: {e}"),
            })??;
            log::debug!(
                "resolved '{}' ({}x{} px) -> {}",
                url,
                properties.width_px,
                properties.height_px,
                properties.path.display()
            );
            by_url.insert(url, properties);
        }

        Ok(ImageStore {
            _dir: Some(dir),
            by_url,
        })
    }
}

async fn resolve_one(
    fetcher: Arc<dyn ImageFetcher>,
    url: String,
    path: PathBuf,
) -> Result<(String, ImageProperties), FolioError> {
    let bytes = fetcher.fetch(&url).await?;

    let (width_px, height_px) = image::io::Reader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| fetch_error(&url, format!("unreadable image data: {e}")))?
        .into_dimensions()
        .map_err(|e| fetch_error(&url, format!("could not read image dimensions: {e}")))?;

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| fetch_error(&url, format!("could not write backing file: {e}")))?;

    // The file must be verifiable on disk before layout may rely on it.
    tokio::fs::metadata(&path)
        .await
        .map_err(|e| fetch_error(&url, format!("backing file not found after write: {e}")))?;

    Ok((
        url,
        ImageProperties {
            path,
            width_px,
            height_px,
        },
    ))
}

/// Reject empty URLs and URLs whose final path segment carries no
/// extension, returning the extension.
fn validate_url(url: &str) -> Result<&str, FolioError> {
    if url.is_empty() {
        return Err(FolioError::InvalidReference {
            url: url.to_string(),
            reason: "url must not be empty".to_string(),
        });
    }
    // A dot in the host must not read as an extension.
    let segment = url.rsplit('/').next().unwrap_or(url);
    match segment.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => Ok(extension),
        _ => Err(FolioError::InvalidReference {
            url: url.to_string(),
            reason: "no file extension found in url".to_string(),
        }),
    }
}

/// Walk the document and gather every distinct image URL, in first-seen
/// order: image nodes, then table cells across header, body, and footer.
fn collect_urls(doc: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |url: &str| {
        if seen.insert(url.to_string()) {
            urls.push(url.to_string());
        }
    };

    for node in &doc.content {
        match &node.kind {
            ContentKind::Image { image } => push(&image.url),
            ContentKind::Table { table } => collect_table_urls(table, &mut push),
            ContentKind::Text { .. } | ContentKind::List { .. } => {}
        }
    }

    urls
}

fn collect_table_urls(table: &Table, push: &mut impl FnMut(&str)) {
    for row in table
        .header
        .iter()
        .chain(table.body.iter())
        .chain(table.footer.iter())
    {
        for cell in row {
            if let Cell::Styled(options) = cell {
                if let CellContent::Image { image } = &options.content {
                    push(&image.url);
                }
            }
        }
    }
}

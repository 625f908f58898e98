//! Asynchronous loading of the file index into the registry.
//!
//! Loading is fan-out/fan-in: every file in the index becomes an
//! independent read-then-parse-then-classify task, all tasks run
//! concurrently, and the registry is populated only at the fan-in point on
//! the caller's task — a wait-all barrier with single-threaded mutation, so
//! the hierarchical map never sees concurrent inserts.
//!
//! Failure domains are per file: a file that fails to read, parse or
//! classify is recorded in the [`LoadReport`] and never cancels or poisons
//! its siblings.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{classify, Category};
use crate::geodata::FeatureCollection;
use crate::registry::{ingest, Registry};
use crate::render::LayerRenderer;

/// Errors that fail the load of one file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The read primitive failed (missing file, transport error, ...).
    #[error("failed to read {path}: {message}")]
    Source { path: String, message: String },

    /// The file is not a valid feature collection (bad JSON, or no
    /// `features` array).
    #[error("invalid feature collection {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Future type returned by [`CollectionSource::read`].
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

/// The provided asynchronous "read JSON at path" primitive.
///
/// Implementations resolve a relative path (`<domain>/<facility>/<file>`)
/// to the document text. Errors are plain messages; the loader wraps them
/// into [`LoadError::Source`] with the path attached.
pub trait CollectionSource: Send + Sync {
    fn read<'a>(&'a self, path: &'a str) -> SourceFuture<'a>;
}

/// Filesystem-backed source rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CollectionSource for FsSource {
    fn read<'a>(&'a self, path: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            tokio::fs::read_to_string(self.root.join(path))
                .await
                .map_err(|e| e.to_string())
        })
    }
}

/// The load-time mapping of domain → facility → relative file paths.
///
/// Each path's leading segment conventionally names a category and serves
/// as the classification hint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIndex(pub BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Register one file under a domain and facility.
    pub fn insert(&mut self, domain: &str, facility: &str, path: impl Into<String>) {
        self.0
            .entry(domain.to_string())
            .or_default()
            .entry(facility.to_string())
            .or_default()
            .push(path.into());
    }

    /// All `(domain, facility, relative path)` entries, in index order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(domain, facilities)| {
            facilities.iter().flat_map(move |(facility, paths)| {
                paths
                    .iter()
                    .map(move |path| (domain.as_str(), facility.as_str(), path.as_str()))
            })
        })
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }
}

/// One successfully loaded layer.
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    pub domain: String,
    pub facility: String,
    pub category: Category,
    pub item: String,
    pub path: String,
}

/// One file that failed to load.
///
/// UI collaborators mark the corresponding toggle as unavailable.
#[derive(Debug)]
pub struct FailedLoad {
    pub path: String,
    pub error: LoadError,
}

/// Outcome of a full load pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LoadedLayer>,
    pub failed: Vec<FailedLoad>,
    /// Files that no classification rule matched; dropped with a diagnostic.
    pub unclassified: Vec<String>,
}

impl LoadReport {
    /// Whether every indexed file made it into the registry.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unclassified.is_empty()
    }
}

enum FileOutcome {
    Loaded {
        collection: Box<FeatureCollection>,
        category: Category,
        item: String,
    },
    Unclassified,
    Failed(LoadError),
}

/// Load every file of the index into the registry.
///
/// All reads are issued concurrently; the function returns only after every
/// file has settled. The registry and renderer are touched exclusively from
/// this function's own task as results arrive.
pub async fn load_index(
    index: &FileIndex,
    source: &dyn CollectionSource,
    registry: &mut Registry,
    renderer: &mut dyn LayerRenderer,
) -> LoadReport {
    let mut tasks = FuturesUnordered::new();
    for (domain, facility, rel_path) in index.files() {
        let full_path = format!("{}/{}/{}", domain, facility, rel_path);
        tasks.push(async move {
            let outcome = load_one(source, &full_path, rel_path).await;
            (domain, facility, full_path, outcome)
        });
    }

    let mut report = LoadReport::default();
    while let Some((domain, facility, path, outcome)) = tasks.next().await {
        match outcome {
            FileOutcome::Loaded {
                collection,
                category,
                item,
            } => {
                ingest(
                    registry, renderer, domain, facility, category, &item, &collection,
                );
                report.loaded.push(LoadedLayer {
                    domain: domain.to_string(),
                    facility: facility.to_string(),
                    category,
                    item,
                    path,
                });
            }
            FileOutcome::Unclassified => {
                tracing::warn!(path = %path, "dropping unclassifiable collection");
                report.unclassified.push(path);
            }
            FileOutcome::Failed(error) => {
                tracing::warn!(path = %path, %error, "failed to load collection");
                report.failed.push(FailedLoad { path, error });
            }
        }
    }

    tracing::info!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        unclassified = report.unclassified.len(),
        "load pass settled"
    );
    report
}

async fn load_one(source: &dyn CollectionSource, full_path: &str, rel_path: &str) -> FileOutcome {
    let text = match source.read(full_path).await {
        Ok(text) => text,
        Err(message) => {
            return FileOutcome::Failed(LoadError::Source {
                path: full_path.to_string(),
                message,
            })
        }
    };
    let collection: FeatureCollection = match serde_json::from_str(&text) {
        Ok(collection) => collection,
        Err(source) => {
            return FileOutcome::Failed(LoadError::Parse {
                path: full_path.to_string(),
                source,
            })
        }
    };
    match classify(&collection, rel_path) {
        Some(category) => {
            let item = collection.item_name(rel_path);
            FileOutcome::Loaded {
                collection: Box::new(collection),
                category,
                item,
            }
        }
        None => FileOutcome::Unclassified,
    }
}

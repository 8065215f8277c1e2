use axum::async_trait;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// The four media slots an incident can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Subdirectory a blob of this kind is stored under.
    pub fn subdir(&self) -> &'static str {
        match self {
            MediaKind::Image => "incident_images",
            MediaKind::Video => "incident_videos",
            MediaKind::Audio => "incident_audio",
            MediaKind::Document => "incident_docs",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        };
        f.write_str(s)
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "document" => Ok(MediaKind::Document),
            other => Err(format!("unknown media kind '{other}'")),
        }
    }
}

/// Blob storage for attached evidence. Accepts an opaque byte payload and
/// returns a stable reference string; the incident record stores only the
/// reference.
#[async_trait]
pub trait MediaStore: Send + Sync + fmt::Debug {
    async fn put(&self, kind: MediaKind, content_type: &str, bytes: &[u8]) -> io::Result<String>;
    /// Removes a stored blob. A missing blob is not an error.
    async fn delete(&self, reference: &str) -> io::Result<()>;
}

/// Filesystem-backed media store rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> io::Result<PathBuf> {
        let relative = Path::new(reference);
        // References are "<subdir>/<name>"; anything else is rejected.
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid media reference",
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, kind: MediaKind, content_type: &str, bytes: &[u8]) -> io::Result<String> {
        let name = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let reference = format!("{}/{}", kind.subdir(), name);

        let dir = self.root.join(kind.subdir());
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&name), bytes).await?;

        debug!("Stored {} blob ({} bytes) as {}", kind, bytes.len(), reference);
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> io::Result<()> {
        let path = self.resolve(reference)?;
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn extension_for(content_type: &str) -> String {
    let subtype = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .split('/')
        .nth(1)
        .unwrap_or("");
    let cleaned: String = subtype
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if cleaned.is_empty() {
        "bin".to_string()
    } else {
        cleaned
    }
}

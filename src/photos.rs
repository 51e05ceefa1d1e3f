//! Photo attachments and their preview handles.

use anyhow::{Result, anyhow};
use std::{
    collections::HashSet,
    fs,
    io::Read,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use uuid::Uuid;

/// File extensions accepted as images.
const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "gif", "heic", "bmp"];

/// Tracks which previews are currently held.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<Uuid>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hand out a handle that is revoked when dropped.
    pub fn acquire(self: &Arc<Self>) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        PreviewHandle {
            id,
            registry: Arc::clone(self),
        }
    }

    /// Number of previews not yet released.
    pub fn live(&self) -> usize {
        self.live.lock().map(|l| l.len()).unwrap_or(0)
    }

    fn release(&self, id: Uuid) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&id);
        }
    }
}

/// A held preview. Dropping it releases the preview.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: Arc<PreviewRegistry>,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
        tracing::debug!("preview released: {}", self.id);
    }
}

/// Image format detected from the file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    Unknown,
}

impl ImageKind {
    fn sniff(header: &[u8]) -> Self {
        match header {
            [0xFF, 0xD8, 0xFF, ..] => ImageKind::Jpeg,
            [0x89, b'P', b'N', b'G', ..] => ImageKind::Png,
            [b'G', b'I', b'F', b'8', ..] => ImageKind::Gif,
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => ImageKind::Webp,
            [b'B', b'M', ..] => ImageKind::Bmp,
            _ => ImageKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
            ImageKind::Bmp => "bmp",
            ImageKind::Unknown => "image",
        }
    }
}

/// One attached photo with its preview.
#[derive(Debug)]
pub struct Photo {
    pub path: PathBuf,
    /// File name for display.
    pub name: String,
    pub size_bytes: u64,
    pub kind: ImageKind,
    preview: PreviewHandle,
}

impl Photo {
    pub fn preview_id(&self) -> Uuid {
        self.preview.id()
    }
}

/// What happened to a batch of picked files.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub accepted: usize,
    /// Files dropped because the tray was full.
    pub over_limit: usize,
    /// Files that are not readable images, with the reason.
    pub rejected: Vec<(PathBuf, String)>,
}

/// Photos attached to the current lead, capped at `max` entries.
#[derive(Debug)]
pub struct PhotoTray {
    photos: Vec<Photo>,
    max: usize,
    registry: Arc<PreviewRegistry>,
}

impl PhotoTray {
    pub fn new(max: usize, registry: Arc<PreviewRegistry>) -> Self {
        Self {
            photos: Vec::new(),
            max,
            registry,
        }
    }

    /// Attach picked files. Files past the free slots are silently dropped.
    pub fn add_files<I>(&mut self, paths: I) -> AddOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut outcome = AddOutcome::default();
        for path in paths {
            if self.photos.len() >= self.max {
                outcome.over_limit += 1;
                continue;
            }
            match self.load(&path) {
                Ok(photo) => {
                    tracing::info!("photo attached: {}", path.display());
                    self.photos.push(photo);
                    outcome.accepted += 1;
                }
                Err(e) => {
                    tracing::warn!("photo rejected: {}: {e}", path.display());
                    outcome.rejected.push((path, e.to_string()));
                }
            }
        }
        if outcome.over_limit > 0 {
            tracing::info!("photo limit reached, {} dropped", outcome.over_limit);
        }
        outcome
    }

    /// Drop every photo and attach a new set.
    pub fn replace_all<I>(&mut self, paths: I) -> AddOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.clear();
        self.add_files(paths)
    }

    /// Detach one photo; its preview is released.
    pub fn remove(&mut self, idx: usize) -> Option<PathBuf> {
        if idx < self.photos.len() {
            Some(self.photos.remove(idx).path)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.photos.iter().map(|p| p.path.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Photo> {
        self.photos.iter()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    fn load(&self, path: &Path) -> Result<Photo> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(anyhow!("not an image file"));
        }

        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(anyhow!("not a regular file"));
        }
        let mut header = [0u8; 12];
        let n = fs::File::open(path)?.read(&mut header)?;

        Ok(Photo {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size_bytes: meta.len(),
            kind: ImageKind::sniff(&header[..n]),
            preview: self.registry.acquire(),
        })
    }
}

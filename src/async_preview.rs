// Async preview module for background preview decoding with caching and cancellation

use crate::domain::FileDescriptor;
use crate::preview::{generate_preview, PreviewContent};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

/// Maximum number of cached previews
const CACHE_SIZE: usize = 16;

/// Cache key: a rewritten file with a new size gets a fresh preview
type CacheKey = (PathBuf, u64);

/// Represents a preview loading state
#[derive(Debug, Clone)]
pub enum PreviewState {
    /// Preview is loading
    Loading,
    /// Preview is ready with content
    Ready(PreviewContent),
    /// Preview failed with error
    Error(String),
}

/// Message types for the preview loader
enum PreviewRequest {
    Load {
        descriptor: FileDescriptor,
        generation: u64,
        response_tx: oneshot::Sender<PreviewState>,
    },
    Shutdown,
}

/// LRU-like cache for previews
#[derive(Debug)]
struct PreviewCache {
    cache: HashMap<CacheKey, PreviewContent>,
    /// Most recent at end
    access_order: Vec<CacheKey>,
    max_size: usize,
}

impl PreviewCache {
    fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            access_order: Vec::new(),
            max_size,
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<PreviewContent> {
        let preview = self.cache.get(key)?.clone();
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
        Some(preview)
    }

    fn insert(&mut self, key: CacheKey, preview: PreviewContent) {
        if self.cache.contains_key(&key) {
            self.access_order.retain(|k| k != &key);
        } else if self.cache.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.cache.remove(&oldest);
        }

        self.cache.insert(key.clone(), preview);
        self.access_order.push(key);
    }

    #[cfg(test)]
    fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains_key(key)
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[cfg(test)]
    fn clear(&mut self) {
        self.cache.clear();
        self.access_order.clear();
    }
}

fn cache_key(descriptor: &FileDescriptor) -> CacheKey {
    (descriptor.path.clone(), descriptor.size)
}

/// Handle for sending requests to the background preview worker.
///
/// Every request is tagged with the generation current at submission time.
/// `cancel_pending` bumps the generation, and the worker drops any result
/// whose generation is older, so a slow decode can never replace a newer one.
#[derive(Clone)]
pub struct PreviewLoader {
    request_tx: mpsc::Sender<PreviewRequest>,
    cache: Arc<Mutex<PreviewCache>>,
    generation: Arc<AtomicU64>,
}

impl PreviewLoader {
    /// Create a new preview loader. Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel(32);
        let cache = Arc::new(Mutex::new(PreviewCache::new(CACHE_SIZE)));
        let generation = Arc::new(AtomicU64::new(0));

        tokio::spawn(Self::worker(
            request_rx,
            Arc::clone(&cache),
            Arc::clone(&generation),
        ));

        Self {
            request_tx,
            cache,
            generation,
        }
    }

    async fn worker(
        mut request_rx: mpsc::Receiver<PreviewRequest>,
        cache: Arc<Mutex<PreviewCache>>,
        current_generation: Arc<AtomicU64>,
    ) {
        while let Some(request) = request_rx.recv().await {
            match request {
                PreviewRequest::Load {
                    descriptor,
                    generation,
                    response_tx,
                } => {
                    if generation < current_generation.load(Ordering::SeqCst) {
                        // Cancelled before we got to it
                        continue;
                    }

                    let key = cache_key(&descriptor);
                    if let Some(cached) = cache.lock().await.get(&key) {
                        let _ = response_tx.send(PreviewState::Ready(cached));
                        continue;
                    }

                    let result =
                        tokio::task::spawn_blocking(move || generate_preview(&descriptor)).await;

                    let state = match result {
                        Ok(Ok(preview)) => {
                            cache.lock().await.insert(key.clone(), preview.clone());
                            PreviewState::Ready(preview)
                        }
                        Ok(Err(e)) => PreviewState::Error(e.to_string()),
                        Err(e) => PreviewState::Error(format!("Preview task panicked: {}", e)),
                    };

                    if generation < current_generation.load(Ordering::SeqCst) {
                        log::debug!("discarding stale preview for {}", key.0.display());
                        continue;
                    }

                    let _ = response_tx.send(state);
                }
                PreviewRequest::Shutdown => break,
            }
        }
    }

    /// Queues a decode for `descriptor` and returns the receiver for its result
    async fn submit(&self, descriptor: &FileDescriptor) -> Option<oneshot::Receiver<PreviewState>> {
        let (response_tx, response_rx) = oneshot::channel();
        let request = PreviewRequest::Load {
            descriptor: descriptor.clone(),
            generation: self.generation.load(Ordering::SeqCst),
            response_tx,
        };

        self.request_tx.send(request).await.ok()?;
        Some(response_rx)
    }

    /// Request a preview and wait for it (cached results return immediately)
    pub async fn request_preview(&self, descriptor: &FileDescriptor) -> PreviewState {
        if let Some(cached) = self.get_cached(descriptor).await {
            return PreviewState::Ready(cached);
        }

        let Some(response_rx) = self.submit(descriptor).await else {
            return PreviewState::Error("Preview loader shut down".to_string());
        };

        match tokio::time::timeout(std::time::Duration::from_secs(5), response_rx).await {
            Ok(Ok(state)) => state,
            Ok(Err(_)) => PreviewState::Error("Preview cancelled".to_string()),
            Err(_) => PreviewState::Error("Preview timed out".to_string()),
        }
    }

    pub async fn get_cached(&self, descriptor: &FileDescriptor) -> Option<PreviewContent> {
        self.cache.lock().await.get(&cache_key(descriptor))
    }

    #[cfg(test)]
    pub async fn is_cached(&self, descriptor: &FileDescriptor) -> bool {
        self.cache.lock().await.contains(&cache_key(descriptor))
    }

    /// Invalidates every request submitted so far
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn shutdown(&self) {
        self.cancel_pending();
        let _ = self.request_tx.send(PreviewRequest::Shutdown).await;
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.lock().await.len()
    }

    #[cfg(test)]
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }
}

impl Default for PreviewLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Synchronous wrapper for the preview loader, polled from the TUI loop
pub struct SyncPreviewManager {
    loader: PreviewLoader,
    runtime: tokio::runtime::Runtime,
    /// Current preview state for the selected image
    current_state: PreviewState,
    /// Path and size of the image we're currently showing/loading
    current_key: Option<CacheKey>,
    receiver: Option<oneshot::Receiver<PreviewState>>,
}

impl SyncPreviewManager {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let loader = runtime.block_on(async { PreviewLoader::new() });

        Ok(Self {
            loader,
            runtime,
            current_state: PreviewState::Loading,
            current_key: None,
            receiver: None,
        })
    }

    /// Request a preview for an image, returns current state (non-blocking)
    pub fn request_preview(&mut self, descriptor: &FileDescriptor) -> &PreviewState {
        // A frame rewritten in place keeps its path but not its size
        let key = cache_key(descriptor);
        if self.current_key.as_ref() != Some(&key) {
            self.reset();
            self.current_key = Some(key);

            if let Some(cached) = self.runtime.block_on(self.loader.get_cached(descriptor)) {
                self.current_state = PreviewState::Ready(cached);
                return &self.current_state;
            }

            self.receiver = self.runtime.block_on(self.loader.submit(descriptor));
            if self.receiver.is_none() {
                self.current_state = PreviewState::Error("Preview loader shut down".to_string());
            }
        }

        if matches!(self.current_state, PreviewState::Loading) {
            if let Some(ref mut rx) = self.receiver {
                match rx.try_recv() {
                    Ok(state) => {
                        self.current_state = state;
                        self.receiver = None;
                    }
                    Err(oneshot::error::TryRecvError::Empty) => {}
                    Err(oneshot::error::TryRecvError::Closed) => {
                        self.current_state = PreviewState::Error("Preview cancelled".to_string());
                        self.receiver = None;
                    }
                }
            }
        }

        &self.current_state
    }

    pub fn current_state(&self) -> &PreviewState {
        &self.current_state
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_key.as_ref().map(|(path, _)| path.as_path())
    }

    /// Drops the current preview and cancels any in-flight decode.
    ///
    /// Call when the selection, the directory or the panel changes.
    pub fn reset(&mut self) {
        self.loader.cancel_pending();
        self.current_key = None;
        self.current_state = PreviewState::Loading;
        self.receiver = None;
    }

    pub fn cache_size(&self) -> usize {
        self.runtime.block_on(self.loader.cache_size())
    }
}

impl Drop for SyncPreviewManager {
    fn drop(&mut self) {
        self.runtime.block_on(self.loader.shutdown());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str) -> FileDescriptor {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(8, 8, |_, _| image::Rgb([40, 80, 120]));
        img.save(&path).unwrap();
        FileDescriptor::from_path(&path).unwrap()
    }

    fn text_preview(label: &str) -> PreviewContent {
        PreviewContent::Text(vec![label.to_string()])
    }

    mod cache_tests {
        use super::*;

        fn key(i: usize) -> CacheKey {
            (PathBuf::from(format!("/frames/light_{}.png", i)), 100)
        }

        #[test]
        fn test_cache_new() {
            let cache = PreviewCache::new(5);
            assert!(cache.is_empty());
            assert_eq!(cache.len(), 0);
        }

        #[test]
        fn test_cache_insert_and_get() {
            let mut cache = PreviewCache::new(5);
            cache.insert(key(0), text_preview("zero"));

            assert!(cache.contains(&key(0)));
            match cache.get(&key(0)) {
                Some(PreviewContent::Text(lines)) => assert_eq!(lines, vec!["zero".to_string()]),
                other => panic!("Expected Text content, got {:?}", other),
            }
        }

        #[test]
        fn test_cache_size_is_part_of_key() {
            let mut cache = PreviewCache::new(5);
            cache.insert(key(0), text_preview("zero"));

            let resized = (key(0).0, 200);
            assert!(!cache.contains(&resized));
        }

        #[test]
        fn test_cache_lru_eviction() {
            let mut cache = PreviewCache::new(3);
            for i in 0..3 {
                cache.insert(key(i), text_preview("p"));
            }

            // Touch the oldest so the second one is evicted instead
            let _ = cache.get(&key(0));
            cache.insert(key(3), text_preview("p"));

            assert_eq!(cache.len(), 3);
            assert!(cache.contains(&key(0)));
            assert!(!cache.contains(&key(1)));
            assert!(cache.contains(&key(2)));
            assert!(cache.contains(&key(3)));
        }

        #[test]
        fn test_cache_update_existing() {
            let mut cache = PreviewCache::new(2);
            cache.insert(key(0), text_preview("old"));
            cache.insert(key(0), text_preview("new"));

            assert_eq!(cache.len(), 1);
            match cache.get(&key(0)) {
                Some(PreviewContent::Text(lines)) => assert_eq!(lines, vec!["new".to_string()]),
                other => panic!("Expected Text content, got {:?}", other),
            }
        }

        #[test]
        fn test_cache_clear() {
            let mut cache = PreviewCache::new(5);
            cache.insert(key(0), text_preview("p"));
            cache.insert(key(1), text_preview("p"));
            cache.clear();
            assert!(cache.is_empty());
        }
    }

    mod async_loader_tests {
        use super::*;

        #[tokio::test]
        async fn test_loader_caches_result() {
            let temp_dir = TempDir::new().unwrap();
            let descriptor = write_png(temp_dir.path(), "flat_01.png");

            let loader = PreviewLoader::new();
            let state = loader.request_preview(&descriptor).await;
            assert!(matches!(state, PreviewState::Ready(_)));
            assert!(loader.is_cached(&descriptor).await);

            let state = loader.request_preview(&descriptor).await;
            assert!(matches!(state, PreviewState::Ready(_)));
            assert_eq!(loader.cache_size().await, 1);
        }

        #[tokio::test]
        async fn test_loader_reports_unsupported_format() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("dark.fits");
            fs::write(&path, b"SIMPLE").unwrap();
            let descriptor = FileDescriptor::from_path(&path).unwrap();

            let loader = PreviewLoader::new();
            match loader.request_preview(&descriptor).await {
                PreviewState::Error(msg) => assert!(msg.contains("FITS")),
                other => panic!("Expected error, got {:?}", other),
            }
            assert_eq!(loader.cache_size().await, 0);
        }

        #[tokio::test]
        async fn test_cancelled_request_gets_no_result() {
            let temp_dir = TempDir::new().unwrap();
            let descriptor = write_png(temp_dir.path(), "light.png");

            let loader = PreviewLoader::new();
            let before = loader.generation();
            let rx = loader.submit(&descriptor).await.unwrap();
            loader.cancel_pending();
            assert_eq!(loader.generation(), before + 1);

            // The worker drops the sender without answering
            assert!(rx.await.is_err());
        }

        #[tokio::test]
        async fn test_loader_clear_cache() {
            let temp_dir = TempDir::new().unwrap();
            let descriptor = write_png(temp_dir.path(), "bias.png");

            let loader = PreviewLoader::new();
            let _ = loader.request_preview(&descriptor).await;
            assert_eq!(loader.cache_size().await, 1);

            loader.clear_cache().await;
            assert_eq!(loader.cache_size().await, 0);
        }

        #[tokio::test]
        async fn test_loader_shutdown() {
            let temp_dir = TempDir::new().unwrap();
            let descriptor = write_png(temp_dir.path(), "light.png");

            let loader = PreviewLoader::new();
            loader.shutdown().await;
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;

            let state = loader.request_preview(&descriptor).await;
            assert!(matches!(state, PreviewState::Error(_)));
        }
    }

    mod sync_manager_tests {
        use super::*;

        fn wait_ready(manager: &mut SyncPreviewManager, descriptor: &FileDescriptor) -> bool {
            for _ in 0..40 {
                if matches!(manager.request_preview(descriptor), PreviewState::Ready(_)) {
                    return true;
                }
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            false
        }

        #[test]
        fn test_sync_manager_creation() {
            let manager = SyncPreviewManager::new().unwrap();
            assert_eq!(manager.cache_size(), 0);
            assert!(matches!(manager.current_state(), PreviewState::Loading));
            assert!(manager.current_path().is_none());
        }

        #[test]
        fn test_sync_manager_request_preview() {
            let temp_dir = TempDir::new().unwrap();
            let descriptor = write_png(temp_dir.path(), "light.png");

            let mut manager = SyncPreviewManager::new().unwrap();
            assert!(wait_ready(&mut manager, &descriptor));
            assert_eq!(manager.current_path(), Some(descriptor.path.as_path()));
        }

        #[test]
        fn test_sync_manager_reset() {
            let temp_dir = TempDir::new().unwrap();
            let descriptor = write_png(temp_dir.path(), "light.png");

            let mut manager = SyncPreviewManager::new().unwrap();
            let _ = manager.request_preview(&descriptor);
            manager.reset();

            assert!(matches!(manager.current_state(), PreviewState::Loading));
            assert!(manager.current_path().is_none());
        }

        #[test]
        fn test_sync_manager_switching_images() {
            let temp_dir = TempDir::new().unwrap();
            let first = write_png(temp_dir.path(), "a.png");
            let second = write_png(temp_dir.path(), "b.png");

            let mut manager = SyncPreviewManager::new().unwrap();
            assert!(wait_ready(&mut manager, &first));
            assert!(wait_ready(&mut manager, &second));
            assert_eq!(manager.current_path(), Some(second.path.as_path()));
            assert_eq!(manager.cache_size(), 2);

            // Going back hits the cache immediately
            assert!(matches!(
                manager.request_preview(&first),
                PreviewState::Ready(_)
            ));
        }

        fn preview_text(state: &PreviewState) -> String {
            match state {
                PreviewState::Ready(PreviewContent::Styled(lines)) => lines
                    .iter()
                    .take(2)
                    .flat_map(|line| line.spans.iter().map(|s| s.content.to_string()))
                    .collect(),
                other => panic!("Expected styled preview, got {:?}", other),
            }
        }

        #[test]
        fn test_sync_manager_reloads_rewritten_frame() {
            let temp_dir = TempDir::new().unwrap();
            let first = write_png(temp_dir.path(), "light.png");

            let mut manager = SyncPreviewManager::new().unwrap();
            assert!(wait_ready(&mut manager, &first));
            assert!(preview_text(manager.current_state()).contains("8×8 px"));

            // Same path, new content: the next listing pass sees a new size
            let img = image::RgbImage::from_fn(64, 32, |x, y| {
                image::Rgb([(x * 4) as u8, (y * 8) as u8, 200])
            });
            img.save(&first.path).unwrap();
            let rewritten = FileDescriptor::from_path(&first.path).unwrap();
            assert_ne!(rewritten.size, first.size);

            assert!(wait_ready(&mut manager, &rewritten));
            let text = preview_text(manager.current_state());
            assert!(text.contains("64×32 px"), "stale preview: {}", text);
            assert_eq!(manager.current_path(), Some(first.path.as_path()));
        }
    }
}

//! Application state and the operations that mutate it.
//!
//! [`Studio`] owns everything the user interface renders: the credential,
//! the generation settings, the gallery as last read from the store, the
//! current view and the busy flag. Every user action goes through one of its
//! methods; the [`GalleryStore`] stays the durable source of truth.

use crate::image::{
    generate_image, GeneratedImageRecord, GenerationRequest, GenerationSettings, ImageDownloader,
    ImageProvider, ImageQuality, ImageSize, ImageStyle,
};
use crate::notify::Notifier;
use crate::store::{GalleryStore, KeyValueStore};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Region of the interface the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Prompt form and most recent image.
    #[default]
    Generate,
    /// All generated images.
    Gallery,
    /// API key and generation settings.
    Settings,
}

/// Advisory flag raised while a generation request is in flight.
///
/// Cloning shares the flag, so another task can watch it.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    /// Returns true while a generation is pending.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raises the flag unless it is already raised.
    ///
    /// The flag drops back when the returned guard is dropped.
    fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The application state controller.
pub struct Studio<P, S, N> {
    provider: P,
    gallery: GalleryStore<S>,
    notifier: N,
    downloader: ImageDownloader,
    credential: String,
    settings: GenerationSettings,
    images: Vec<GeneratedImageRecord>,
    view: View,
    busy: BusyFlag,
}

impl<P, S, N> Studio<P, S, N>
where
    P: ImageProvider,
    S: KeyValueStore,
    N: Notifier,
{
    /// Creates the controller and loads the credential and gallery from `store`.
    pub fn new(provider: P, store: S, notifier: N) -> Self {
        let gallery = GalleryStore::new(store);
        let credential = gallery.get_credential();
        let images = gallery.list_images();
        tracing::debug!(
            images = images.len(),
            has_credential = !credential.is_empty(),
            "loaded studio state"
        );

        Self {
            provider,
            gallery,
            notifier,
            downloader: ImageDownloader::new(),
            credential,
            settings: GenerationSettings::default(),
            images,
            view: View::default(),
            busy: BusyFlag::default(),
        }
    }

    /// Generates an image for `text` with the current settings.
    ///
    /// Without a credential the user is sent to the settings view and no
    /// request is made. A successful result is persisted and becomes the most
    /// recent image. The busy flag is lowered on every exit path.
    pub async fn submit_prompt(&mut self, text: &str) -> Option<GeneratedImageRecord> {
        if self.credential.is_empty() {
            self.notifier.error("Please provide an OpenAI API key first");
            self.view = View::Settings;
            return None;
        }

        let Some(_guard) = self.busy.try_acquire() else {
            self.notifier.error("An image is already being generated");
            return None;
        };

        let request = GenerationRequest::new(text.trim(), self.credential.clone())
            .with_settings(self.settings);
        let mut record = generate_image(&self.provider, &request, &self.notifier).await?;

        record.timestamp = self.unique_timestamp(record.timestamp);
        self.gallery.add_image(record.clone());
        self.images.insert(0, record.clone());
        self.notifier.success("Image generated successfully");
        Some(record)
    }

    /// Deletes every image with `timestamp`, then re-reads the gallery.
    ///
    /// Returns false, leaving the gallery untouched, when no image matched.
    pub fn delete_image(&mut self, timestamp: i64) -> bool {
        let removed = self.gallery.remove_image(timestamp);
        self.images = self.gallery.list_images();
        if removed {
            self.notifier.success("Image deleted");
        } else {
            self.notifier.error("Image not found");
        }
        removed
    }

    /// Clears the gallery if `confirm` agrees. Returns whether it did.
    pub fn clear_all(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.gallery.clear_images();
        self.images.clear();
        self.notifier.success("All images cleared");
        true
    }

    /// Downloads the image with `timestamp` into `dir`.
    pub async fn download_image(&self, timestamp: i64, dir: &Path) -> Option<PathBuf> {
        let Some(record) = self.images.iter().find(|r| r.timestamp == timestamp) else {
            self.notifier.error("Image not found");
            return None;
        };

        match self.downloader.download(record, dir).await {
            Ok(path) => {
                self.notifier.success("Image downloaded successfully");
                Some(path)
            }
            Err(e) => {
                tracing::error!(url = %record.url, "download failed: {e}");
                self.notifier.error("Failed to download image");
                None
            }
        }
    }

    /// Saves a new API key. Blank keys are refused.
    pub fn set_credential(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            self.notifier.error("Please enter a valid API key");
            return false;
        }
        self.gallery.set_credential(value);
        self.credential = value.to_string();
        self.notifier.success("API key saved successfully");
        true
    }

    /// Forgets the stored API key.
    pub fn clear_credential(&mut self) {
        self.gallery.clear_credential();
        self.credential.clear();
    }

    /// Uses `value` for this session only, without persisting it.
    ///
    /// Ignored when a credential is already loaded.
    pub fn use_session_credential(&mut self, value: &str) {
        if self.credential.is_empty() && !value.trim().is_empty() {
            self.credential = value.trim().to_string();
        }
    }

    /// Re-reads the gallery from the store.
    pub fn reload(&mut self) {
        self.images = self.gallery.list_images();
    }

    /// Sets the output size.
    pub fn set_size(&mut self, size: ImageSize) {
        self.settings.size = size;
    }

    /// Sets the rendering quality.
    pub fn set_quality(&mut self, quality: ImageQuality) {
        self.settings.quality = quality;
    }

    /// Sets the visual style.
    pub fn set_style(&mut self, style: ImageStyle) {
        self.settings.style = style;
    }

    /// Replaces all generation settings.
    pub fn set_settings(&mut self, settings: GenerationSettings) {
        self.settings = settings;
    }

    /// Current generation settings.
    pub fn settings(&self) -> GenerationSettings {
        self.settings
    }

    /// Gallery, newest first.
    pub fn images(&self) -> &[GeneratedImageRecord] {
        &self.images
    }

    /// The image shown on the generate view.
    pub fn most_recent(&self) -> Option<&GeneratedImageRecord> {
        self.images.first()
    }

    /// True while a generation is pending.
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Shared handle on the busy flag.
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// True if an API key is loaded.
    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }

    /// The API key in use, for display. Empty when none is loaded.
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Current view.
    pub fn current_view(&self) -> View {
        self.view
    }

    /// Switches view.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// The durable store behind this controller.
    pub fn gallery(&self) -> &GalleryStore<S> {
        &self.gallery
    }

    // Two generations finishing in the same millisecond would share an
    // identity; move the newcomer past the newest known timestamp.
    fn unique_timestamp(&self, timestamp: i64) -> i64 {
        if !self.images.iter().any(|r| r.timestamp == timestamp) {
            return timestamp;
        }
        let newest = self.images.iter().map(|r| r.timestamp).max().unwrap_or(timestamp);
        tracing::debug!(timestamp, newest, "timestamp collision, bumping");
        newest.saturating_add(1)
    }
}

/// Masks an API key for display, keeping a short prefix and suffix.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenStudioError, Result};
    use crate::image::{now_millis, ImageProviderKind};
    use crate::notify::RecordingNotifier;
    use crate::store::{MemoryStore, CREDENTIAL_KEY};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider returning queued outcomes and remembering every request.
    #[derive(Default)]
    struct ScriptedProvider {
        outcomes: Mutex<Vec<Result<GeneratedImageRecord>>>,
        requests: Mutex<Vec<GenerationRequest>>,
        busy_seen: Mutex<Option<BusyFlag>>,
    }

    impl ScriptedProvider {
        fn push(&self, outcome: Result<GeneratedImageRecord>) {
            self.outcomes.lock().unwrap().push(outcome);
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageProvider for ScriptedProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImageRecord> {
            if let Some(flag) = self.busy_seen.lock().unwrap().as_ref() {
                assert!(flag.is_set(), "busy flag must be raised during generation");
            }
            self.requests.lock().unwrap().push(request.clone());
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                return Ok(GeneratedImageRecord::new("https://x/default.png", &request.prompt));
            }
            outcomes.remove(0)
        }

        fn kind(&self) -> ImageProviderKind {
            ImageProviderKind::OpenAI
        }
    }

    type TestStudio = Studio<Arc<ScriptedProvider>, Arc<MemoryStore>, Arc<RecordingNotifier>>;

    struct Harness {
        provider: Arc<ScriptedProvider>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        studio: TestStudio,
    }

    fn harness_with(store: MemoryStore) -> Harness {
        let provider = Arc::new(ScriptedProvider::default());
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::new());
        let studio = Studio::new(provider.clone(), store.clone(), notifier.clone());
        Harness {
            provider,
            store,
            notifier,
            studio,
        }
    }

    fn harness_with_key() -> Harness {
        let store = MemoryStore::new();
        store.set(CREDENTIAL_KEY, "sk-test").unwrap();
        harness_with(store)
    }

    fn record(url: &str, timestamp: i64) -> GeneratedImageRecord {
        GeneratedImageRecord {
            url: url.into(),
            prompt: "p".into(),
            timestamp,
        }
    }

    #[test]
    fn test_startup_loads_store() {
        let store = Arc::new(MemoryStore::new());
        let gallery = GalleryStore::new(store.clone());
        gallery.set_credential("sk-test");
        gallery.add_image(record("a", 1));
        gallery.add_image(record("b", 2));

        let studio = Studio::new(
            Arc::new(ScriptedProvider::default()),
            store,
            RecordingNotifier::new(),
        );
        assert!(studio.has_credential());
        assert_eq!(studio.images().len(), 2);
        assert_eq!(studio.most_recent(), Some(&record("b", 2)));
        assert_eq!(studio.current_view(), View::Generate);
        assert!(!studio.is_busy());
    }

    #[tokio::test]
    async fn test_submit_without_key_redirects_to_settings() {
        let mut h = harness_with(MemoryStore::new());

        let result = h.studio.submit_prompt("a red fox in snow").await;

        assert!(result.is_none());
        assert!(h.provider.requests().is_empty());
        assert_eq!(h.studio.current_view(), View::Settings);
        assert_eq!(h.notifier.errors(), vec!["Please provide an OpenAI API key first"]);
        assert!(!h.studio.is_busy());
    }

    #[tokio::test]
    async fn test_submit_success_persists_and_prepends() {
        let mut h = harness_with_key();
        h.studio.set_size(ImageSize::Large);
        h.studio.set_quality(ImageQuality::Hd);
        h.studio.set_style(ImageStyle::Vivid);
        h.provider
            .push(Ok(GeneratedImageRecord::new("https://x/y.png", "a red fox in snow")));

        let record = h.studio.submit_prompt("a red fox in snow").await.unwrap();

        assert_eq!(record.url, "https://x/y.png");
        assert_eq!(h.studio.most_recent(), Some(&record));
        assert_eq!(GalleryStore::new(h.store.clone()).list_images(), vec![record]);
        assert_eq!(h.notifier.successes(), vec!["Image generated successfully"]);
        assert!(!h.studio.is_busy());

        let sent = &h.provider.requests()[0];
        assert_eq!(sent.prompt, "a red fox in snow");
        assert_eq!(sent.api_key, "sk-test");
        assert_eq!(sent.size, ImageSize::Large);
        assert_eq!(sent.quality, ImageQuality::Hd);
        assert_eq!(sent.style, ImageStyle::Vivid);
    }

    #[tokio::test]
    async fn test_submit_trims_prompt() {
        let mut h = harness_with_key();
        h.studio.submit_prompt("  a lighthouse \n").await.unwrap();
        assert_eq!(h.provider.requests()[0].prompt, "a lighthouse");
    }

    #[tokio::test]
    async fn test_submit_failure_leaves_state_intact() {
        let mut h = harness_with_key();
        h.studio.gallery().add_image(record("old", 1));
        h.studio.reload();
        h.provider.push(Err(GenStudioError::Auth("Invalid API key".into())));

        let result = h.studio.submit_prompt("fox").await;

        assert!(result.is_none());
        assert_eq!(h.notifier.errors(), vec!["Invalid API key"]);
        assert_eq!(h.studio.images(), &[record("old", 1)]);
        assert_eq!(GalleryStore::new(h.store.clone()).list_images().len(), 1);
        assert!(!h.studio.is_busy());
    }

    #[tokio::test]
    async fn test_busy_flag_raised_during_generation() {
        let mut h = harness_with_key();
        *h.provider.busy_seen.lock().unwrap() = Some(h.studio.busy_flag());

        h.studio.submit_prompt("fox").await.unwrap();
        assert!(!h.studio.busy_flag().is_set());
    }

    #[tokio::test]
    async fn test_submit_refused_while_busy() {
        let mut h = harness_with_key();
        let flag = h.studio.busy_flag();
        let held = flag.try_acquire().unwrap();

        assert!(h.studio.submit_prompt("fox").await.is_none());
        assert!(h.provider.requests().is_empty());
        assert_eq!(h.notifier.errors(), vec!["An image is already being generated"]);

        drop(held);
        assert!(h.studio.submit_prompt("fox").await.is_some());
    }

    #[tokio::test]
    async fn test_colliding_timestamp_is_bumped() {
        let mut h = harness_with_key();
        let now = now_millis();
        h.studio.gallery().add_image(record("a", now + 10));
        h.studio.gallery().add_image(record("b", now + 5));
        h.studio.reload();
        h.provider.push(Ok(GeneratedImageRecord {
            url: "https://x/c.png".into(),
            prompt: "fox".into(),
            timestamp: now + 5,
        }));

        let record = h.studio.submit_prompt("fox").await.unwrap();
        assert_eq!(record.timestamp, now + 11);
        assert_eq!(h.studio.images()[0].timestamp, now + 11);
    }

    #[tokio::test]
    async fn test_colliding_max_timestamp_does_not_overflow() {
        let mut h = harness_with_key();
        h.studio.gallery().add_image(record("a", i64::MAX));
        h.studio.reload();
        h.provider.push(Ok(GeneratedImageRecord {
            url: "https://x/c.png".into(),
            prompt: "fox".into(),
            timestamp: i64::MAX,
        }));

        let record = h.studio.submit_prompt("fox").await.unwrap();
        assert_eq!(record.timestamp, i64::MAX);
        assert!(!h.studio.is_busy());
    }

    #[test]
    fn test_delete_image_resyncs() {
        let mut h = harness_with_key();
        h.studio.gallery().add_image(record("a", 100));
        h.studio.gallery().add_image(record("b", 200));
        h.studio.reload();

        assert!(h.studio.delete_image(100));

        assert_eq!(h.studio.images(), &[record("b", 200)]);
        assert_eq!(
            GalleryStore::new(h.store.clone()).list_images(),
            vec![record("b", 200)]
        );
        assert_eq!(h.notifier.successes(), vec!["Image deleted"]);
    }

    #[test]
    fn test_delete_unknown_timestamp_is_noop() {
        let mut h = harness_with_key();
        h.studio.gallery().add_image(record("a", 100));
        h.studio.reload();

        assert!(!h.studio.delete_image(999));
        assert_eq!(h.studio.images(), &[record("a", 100)]);
        assert_eq!(
            GalleryStore::new(h.store.clone()).list_images(),
            vec![record("a", 100)]
        );
        assert!(h.notifier.successes().is_empty());
        assert_eq!(h.notifier.errors(), vec!["Image not found"]);
    }

    #[test]
    fn test_delete_from_empty_gallery_reports_not_found() {
        let mut h = harness_with(MemoryStore::new());

        assert!(!h.studio.delete_image(999));
        assert!(h.notifier.successes().is_empty());
        assert_eq!(h.notifier.errors(), vec!["Image not found"]);
    }

    #[test]
    fn test_clear_all_requires_confirmation() {
        let mut h = harness_with_key();
        h.studio.gallery().add_image(record("a", 1));
        h.studio.reload();

        assert!(!h.studio.clear_all(|| false));
        assert_eq!(h.studio.images().len(), 1);
        assert!(h.notifier.notifications().is_empty());

        assert!(h.studio.clear_all(|| true));
        assert!(h.studio.images().is_empty());
        assert!(GalleryStore::new(h.store.clone()).list_images().is_empty());
        assert_eq!(h.notifier.successes(), vec!["All images cleared"]);
    }

    #[test]
    fn test_set_credential() {
        let mut h = harness_with(MemoryStore::new());

        assert!(!h.studio.set_credential("   "));
        assert!(!h.studio.has_credential());
        assert_eq!(h.notifier.errors(), vec!["Please enter a valid API key"]);

        assert!(h.studio.set_credential(" sk-new "));
        assert_eq!(h.studio.credential(), "sk-new");
        assert_eq!(GalleryStore::new(h.store.clone()).get_credential(), "sk-new");

        h.studio.clear_credential();
        assert!(!h.studio.has_credential());
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_session_credential_is_not_persisted() {
        let mut h = harness_with(MemoryStore::new());
        h.studio.use_session_credential("sk-env");
        assert_eq!(h.studio.credential(), "sk-env");
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_session_credential_does_not_override_saved_key() {
        let mut h = harness_with_key();
        h.studio.use_session_credential("sk-env");
        assert_eq!(h.studio.credential(), "sk-test");
    }

    #[tokio::test]
    async fn test_download_unknown_image() {
        let h = harness_with_key();
        let tmp = tempfile::tempdir().unwrap();
        assert!(h.studio.download_image(42, tmp.path()).await.is_none());
        assert_eq!(h.notifier.errors(), vec!["Image not found"]);
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut h = harness_with_key();
        let settings = GenerationSettings {
            size: ImageSize::Tall,
            quality: ImageQuality::Hd,
            style: ImageStyle::Natural,
        };
        h.studio.set_settings(settings);
        assert_eq!(h.studio.settings(), settings);
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("sk-abcdefghijkl"), "sk-...ijkl");
        assert_eq!(mask_credential("short"), "*****");
        assert_eq!(mask_credential(""), "");
    }
}

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use image::RgbImage;

use crate::{
    capability::{FaceEmbedder, LabelProvider},
    face::BoundingBox,
    model::Embedding,
    store::{IdentityStore, KnownIdentity},
    sync::{self, EnrollmentLock},
    Result,
};

/// Matches query embeddings against the identity store and enrolls unknown
/// faces through a detached background session. All collaborators are
/// injected; the engine owns no global state.
pub struct RecognitionEngine {
    store: Arc<IdentityStore>,
    embedder: Box<dyn FaceEmbedder>,
    prompt: Arc<dyn LabelProvider>,
    lock: EnrollmentLock,
    shutdown: Arc<AtomicBool>,
    match_threshold: f32,
}

impl RecognitionEngine {
    pub fn new(
        store: Arc<IdentityStore>,
        embedder: Box<dyn FaceEmbedder>,
        prompt: Arc<dyn LabelProvider>,
        match_threshold: f32,
    ) -> Self {
        Self {
            store,
            embedder,
            prompt,
            lock: EnrollmentLock::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            match_threshold,
        }
    }

    /// Resolves a face region to a registered name. An empty string means
    /// unknown or pending: callers get it while a session holds the
    /// enrollment lock, and again right after this call starts a session of
    /// its own.
    pub fn recognize(&self, frame: &RgbImage, face: &BoundingBox) -> Result<String> {
        let embedding = self.embedder.embed(frame, face)?;

        // Non-blocking degrade: never stall a frame while a human is being
        // prompted.
        if self.lock.is_held() {
            return Ok(String::new());
        }

        let known = self.store.snapshot()?;
        let best = known
            .iter()
            .map(|entry| (entry, embedding.distance(&entry.embedding)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b));
        if let Some((entry, distance)) = best {
            if distance <= self.match_threshold {
                return Ok(entry.name.clone());
            }
        }

        self.start_enrollment(embedding)?;
        Ok(String::new())
    }

    fn start_enrollment(&self, embedding: Embedding) -> Result<()> {
        // Losing the swap means another call already started a session.
        let Some(guard) = self.lock.try_acquire() else {
            return Ok(());
        };

        let store = Arc::clone(&self.store);
        let prompt = Arc::clone(&self.prompt);
        let shutdown = Arc::clone(&self.shutdown);
        sync::spawn_detached("enrollment", move || {
            let _guard = guard;
            let name = match prompt.prompt_label() {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!(error = %err, "enrollment prompt failed");
                    return;
                }
            };
            if shutdown.load(Ordering::Acquire) {
                tracing::info!("engine shut down, discarding enrollment");
                return;
            }
            match store.append(KnownIdentity {
                name: name.clone(),
                embedding,
            }) {
                Ok(()) => tracing::info!(name = %name, "registered new identity"),
                // the in-memory entry stays; only the file mirror is behind
                Err(err) => tracing::error!(error = %err, "failed to persist identity store"),
            }
        })
    }
}

impl Drop for RecognitionEngine {
    fn drop(&mut self) {
        // Best effort: a session blocked in its prompt finishes on its own
        // and abandons the append.
        self.shutdown.store(true, Ordering::Release);
    }
}

//! Structure load orchestration.
//!
//! [`StructureLoader::request`] hands the blocking fetch to a short-lived
//! `structure-fetch` thread and returns immediately. The render loop
//! calls [`StructureLoader::poll`], which picks up the fetched text and
//! runs parse, synthesis and assembly on the caller's thread. Every
//! request carries a sequence number; responses for anything but the
//! latest request are dropped without touching the scene.

mod pipeline;

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use serde::Serialize;
use web_time::{Duration, Instant};

pub use self::pipeline::LoadSummary;
use crate::error::BindviewError;
use crate::options::Options;
use crate::scene::{ReleaseSummary, Scene};
use crate::store::{Store, SubscriptionId};
use crate::structure::{
    default_source, BindingSite, FetchError, StructureId, StructureSource,
};
use crate::util::timing::StageTimings;

/// Where the current load is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested, or torn down.
    #[default]
    Idle,
    /// Waiting on the structure source.
    Fetching,
    /// Turning text into atoms.
    Parsing,
    /// Building meshes.
    Synthesizing,
    /// Replacing scene objects.
    Assembling,
    /// Scene shows the requested structure.
    Ready,
    /// Fetch or parse failed; the scene holds no structure.
    Failed,
}

impl LoadState {
    /// Whether a loading indicator should be shown.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Self::Fetching | Self::Parsing | Self::Synthesizing | Self::Assembling
        )
    }
}

/// Result sent back by a fetch thread.
struct FetchOutcome {
    sequence: u64,
    id: StructureId,
    result: Result<String, FetchError>,
    elapsed: Duration,
}

/// Drives structure loads into a [`Scene`].
pub struct StructureLoader {
    source: Arc<dyn StructureSource>,
    options: Options,
    sites: Vec<BindingSite>,
    /// Sequence number of the latest request.
    sequence: u64,
    current: Option<StructureId>,
    worker: Option<JoinHandle<()>>,
    tx: mpsc::Sender<FetchOutcome>,
    rx: mpsc::Receiver<FetchOutcome>,
    state: Store<LoadState>,
    last_error: Option<String>,
    last_summary: Option<LoadSummary>,
}

impl std::fmt::Debug for StructureLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructureLoader")
            .field("source", &self.source.name())
            .field("sequence", &self.sequence)
            .field("current", &self.current)
            .field("state", self.state.get())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl StructureLoader {
    /// Loader fetching from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn StructureSource>, options: Options) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            options,
            sites: Vec::new(),
            sequence: 0,
            current: None,
            worker: None,
            tx,
            rx,
            state: Store::new(LoadState::Idle),
            last_error: None,
            last_summary: None,
        }
    }

    /// Loader using the source chain configured in `options.source`.
    #[must_use]
    pub fn from_options(options: Options) -> Self {
        let source: Arc<dyn StructureSource> =
            Arc::from(default_source(&options.source));
        Self::new(source, options)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        *self.state.get()
    }

    /// Shorthand for `state().is_busy()`.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Message of the most recent failure, cleared by the next request.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Summary of the most recent successful load.
    #[must_use]
    pub fn last_summary(&self) -> Option<&LoadSummary> {
        self.last_summary.as_ref()
    }

    /// Identifier of the latest request.
    #[must_use]
    pub fn current(&self) -> Option<&StructureId> {
        self.current.as_ref()
    }

    /// Options used for parsing and synthesis.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Be told about every state change.
    pub fn subscribe_state(
        &mut self,
        f: impl FnMut(&LoadState) + Send + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(f)
    }

    /// Stop a [`subscribe_state`](Self::subscribe_state) callback.
    pub fn unsubscribe_state(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Start loading `id` in the background, superseding any load in
    /// flight. Returns the request's sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`BindviewError::ThreadSpawn`] if the fetch thread could not
    /// be started; the loader is then `Failed` and the previous structure
    /// is released from `scene`.
    pub fn request(
        &mut self,
        id: StructureId,
        sites: Vec<BindingSite>,
        scene: &mut Scene,
    ) -> Result<u64, BindviewError> {
        let sequence = self.begin(&id, sites);
        log::info!("loading {id} from {} (request {sequence})", self.source.name());

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name("structure-fetch".into())
            .spawn(move || {
                let start = Instant::now();
                let result = source.fetch(&id);
                // Receiver gone means the loader was dropped.
                let _ = tx.send(FetchOutcome {
                    sequence,
                    id,
                    result,
                    elapsed: start.elapsed(),
                });
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(sequence)
            }
            Err(e) => Err(self.spawn_failed(scene, e)),
        }
    }

    fn spawn_failed(
        &mut self,
        scene: &mut Scene,
        e: std::io::Error,
    ) -> BindviewError {
        let error = BindviewError::ThreadSpawn(e);
        self.fail(scene, &error);
        error
    }

    /// Apply a finished fetch, if one arrived. Call once per frame.
    pub fn poll(&mut self, scene: &mut Scene) -> LoadState {
        // Checked before draining: a finished thread has already sent.
        let worker_done = self
            .worker
            .as_ref()
            .is_some_and(JoinHandle::is_finished);

        while let Ok(outcome) = self.rx.try_recv() {
            if outcome.sequence != self.sequence {
                log::debug!(
                    "discarding response for {} (request {}, latest {})",
                    outcome.id,
                    outcome.sequence,
                    self.sequence
                );
                continue;
            }
            self.worker = None;
            let _ = self.finish(scene, &outcome.id, outcome.result, outcome.elapsed);
        }

        if worker_done && self.state() == LoadState::Fetching {
            self.worker = None;
            self.fail(scene, &BindviewError::WorkerStopped);
        }
        self.state()
    }

    /// Fetch and build `id` on the calling thread.
    ///
    /// # Errors
    ///
    /// [`BindviewError::StructureUnavailable`] when every source failed,
    /// [`BindviewError::Parse`] when the text holds no atoms.
    pub fn load_blocking(
        &mut self,
        id: StructureId,
        sites: Vec<BindingSite>,
        scene: &mut Scene,
    ) -> Result<LoadSummary, BindviewError> {
        let _ = self.begin(&id, sites);
        let start = Instant::now();
        let result = self.source.fetch(&id);
        self.finish(scene, &id, result, start.elapsed())
    }

    /// Build already-fetched `text` as structure `id`.
    ///
    /// # Errors
    ///
    /// [`BindviewError::Parse`] when the text holds no atoms.
    pub fn load_text(
        &mut self,
        id: StructureId,
        text: &str,
        sites: Vec<BindingSite>,
        scene: &mut Scene,
    ) -> Result<LoadSummary, BindviewError> {
        let _ = self.begin(&id, sites);
        self.finish(scene, &id, Ok(text.to_owned()), Duration::ZERO)
    }

    /// Cancel any load in flight and remove the structure from `scene`.
    pub fn teardown(&mut self, scene: &mut Scene) -> ReleaseSummary {
        self.sequence += 1;
        self.worker = None;
        self.current = None;
        let _ = self.state.set(LoadState::Idle);
        scene.release_structure()
    }

    fn begin(&mut self, id: &StructureId, sites: Vec<BindingSite>) -> u64 {
        self.sequence += 1;
        self.current = Some(id.clone());
        self.sites = sites;
        self.last_error = None;
        self.worker = None;
        let _ = self.state.set(LoadState::Fetching);
        self.sequence
    }

    fn finish(
        &mut self,
        scene: &mut Scene,
        id: &StructureId,
        fetched: Result<String, FetchError>,
        fetch_elapsed: Duration,
    ) -> Result<LoadSummary, BindviewError> {
        let text = match fetched {
            Ok(text) => text,
            Err(reason) => {
                let error = BindviewError::StructureUnavailable {
                    id: id.to_string(),
                    reason,
                };
                self.fail(scene, &error);
                return Err(error);
            }
        };

        let mut timings = StageTimings::default();
        timings.record("fetch", fetch_elapsed);
        let state = &mut self.state;
        let built = pipeline::build_scene(
            id,
            &text,
            &self.sites,
            &self.options,
            scene,
            timings,
            |stage| {
                let _ = state.set(stage);
            },
        );

        match built {
            Ok(summary) => {
                self.last_summary = Some(summary.clone());
                let _ = self.state.set(LoadState::Ready);
                Ok(summary)
            }
            Err(error) => {
                self.fail(scene, &error);
                Err(error)
            }
        }
    }

    fn fail(&mut self, scene: &mut Scene, error: &BindviewError) {
        log::error!("load failed: {error}");
        let released = scene.release_structure();
        if released.objects > 0 {
            log::debug!("released {} objects of the previous structure", released.objects);
        }
        self.last_error = Some(error.to_string());
        let _ = self.state.set(LoadState::Failed);
    }
}

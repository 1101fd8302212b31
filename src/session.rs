//! Per-user session context.
//!
//! A [`Session`] is created at login and consumed by logout. It owns
//! everything scoped to one user: the identity, the cached library, the
//! album being edited and the draft track list of an album being added.
//! Nothing in it is shared with other sessions.
//!
//! The cached library is reloaded from the store once it is older than the
//! configured TTL. Every mutation goes through [`Session::commit`]: apply to
//! a copy, overwrite the whole worksheet, and only then replace the cache.
//! If the mutation is rejected or the write fails, the cache and the store
//! keep their previous contents.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Error, Result, ResultExt};
use crate::library::{AlbumEdit, Library, NewAlbum, NewTrack, TrackDraft};
use crate::model::{AlbumIdentity, User};
use crate::sheet::SheetStore;
use crate::stats::{self, AlbumStats};

/// Default worksheet holding the ledger.
pub const DEFAULT_WORKSHEET: &str = "tracks";

/// Default age after which the cached library is reloaded.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5);

/// Where a session reads from and how long it trusts its cache.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub worksheet: String,
    pub cache_ttl: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            worksheet: DEFAULT_WORKSHEET.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl From<&StoreConfig> for SessionOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            worksheet: config.worksheet.clone(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        }
    }
}

struct Cached {
    library: Library,
    loaded_at: Instant,
}

impl Cached {
    fn new(library: Library) -> Self {
        Self {
            library,
            loaded_at: Instant::now(),
        }
    }
}

/// One user's interaction context.
pub struct Session<S: SheetStore> {
    user: User,
    store: S,
    options: SessionOptions,
    cache: Cached,
    editing: Option<AlbumIdentity>,
    draft: Vec<TrackDraft>,
}

impl<S: SheetStore> Session<S> {
    /// Start a session for `user`, loading the worksheet.
    ///
    /// A store failure here is fatal for the session.
    pub async fn login(user: User, store: S, options: SessionOptions) -> Result<Self> {
        let library = load(&store, &options.worksheet).await?;
        info!(%user, worksheet = %options.worksheet, tracks = library.len(), "Session started");
        Ok(Self {
            user,
            store,
            options,
            cache: Cached::new(library),
            editing: None,
            draft: Vec::new(),
        })
    }

    /// End the session, handing back the store.
    pub fn logout(self) -> S {
        info!(user = %self.user, "Session ended");
        self.store
    }

    pub fn user(&self) -> User {
        self.user
    }

    pub fn worksheet(&self) -> &str {
        &self.options.worksheet
    }

    /// The library, reloaded first if the cache has expired.
    pub async fn library(&mut self) -> Result<&Library> {
        if self.cache.loaded_at.elapsed() >= self.options.cache_ttl {
            self.refresh().await?;
        }
        Ok(&self.cache.library)
    }

    /// Reload the library from the store regardless of cache age.
    pub async fn refresh(&mut self) -> Result<&Library> {
        let library = load(&self.store, &self.options.worksheet).await?;
        debug!(tracks = library.len(), "Reloaded library");
        self.cache = Cached::new(library);
        Ok(&self.cache.library)
    }

    /// Apply a mutation and write the whole table back.
    pub async fn commit<R>(
        &mut self,
        mutate: impl FnOnce(&mut Library, User) -> Result<R>,
    ) -> Result<R> {
        let mut next = self.library().await?.clone();
        let outcome = mutate(&mut next, self.user)?;

        self.store
            .overwrite(&self.options.worksheet, &next.to_raw())
            .await
            .with_context(format!("writing worksheet '{}'", self.options.worksheet))?;

        self.cache = Cached::new(next);
        Ok(outcome)
    }

    /// Add a whole album.
    pub async fn add_album(&mut self, album: NewAlbum) -> Result<usize> {
        self.commit(|library, _| library.insert_album(album)).await
    }

    /// Add a single track.
    pub async fn add_track(&mut self, track: NewTrack) -> Result<i32> {
        self.commit(|library, _| library.insert_track(track)).await
    }

    /// Tracks queued for the album being added.
    pub fn draft(&self) -> &[TrackDraft] {
        &self.draft
    }

    pub fn add_draft_track(&mut self, track: TrackDraft) {
        self.draft.push(track);
    }

    pub fn remove_draft_track(&mut self, index: usize) -> Option<TrackDraft> {
        (index < self.draft.len()).then(|| self.draft.remove(index))
    }

    /// Add an album whose tracks are the current draft. Clears the draft
    /// on success.
    pub async fn submit_draft(&mut self, mut album: NewAlbum) -> Result<usize> {
        album.tracks = self.draft.clone();
        let added = self.add_album(album).await?;
        self.draft.clear();
        Ok(added)
    }

    /// Start editing an album, returning its current state as the edit form.
    pub async fn begin_edit(&mut self, identity: AlbumIdentity) -> Result<AlbumEdit> {
        let user = self.user;
        let template = self.library().await?.edit_template(&identity, user)?;
        self.editing = Some(identity);
        Ok(template)
    }

    /// The album currently being edited.
    pub fn editing(&self) -> Option<&AlbumIdentity> {
        self.editing.as_ref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Replace the album being edited with `edit`. Ends the edit on success.
    pub async fn save_edit(&mut self, edit: AlbumEdit) -> Result<usize> {
        let identity = self.editing.clone().ok_or(Error::NoActiveEdit)?;
        let inserted = self
            .commit(|library, user| library.replace_album(&identity, edit, user))
            .await?;
        self.editing = None;
        Ok(inserted)
    }

    /// Albums this user has not finished rating.
    pub async fn in_progress(&mut self) -> Result<Vec<AlbumStats>> {
        let user = self.user;
        Ok(stats::in_progress(self.library().await?.tracks(), user))
    }

    /// Albums this user has rated in full.
    pub async fn completed(&mut self) -> Result<Vec<AlbumStats>> {
        let user = self.user;
        Ok(stats::completed(self.library().await?.tracks(), user))
    }
}

async fn load<S: SheetStore>(store: &S, worksheet: &str) -> Result<Library> {
    let raw = store
        .read(worksheet)
        .await
        .with_context(format!("loading worksheet '{worksheet}'"))?;
    Ok(Library::from_raw(&raw))
}

//! Cached, single-flight resolution of type identifiers.
//!
//! A [`Resolver`] turns a bare identifier such as `"post"` into a
//! [`TypeValue`], asking a pluggable [`TypeLookup`] for the description. Each
//! identifier owns one cache entry that moves from resolving to resolved or
//! failed. The first caller to miss the cache claims the entry and starts the
//! lookup on a background thread; everyone else who asks for the same
//! identifier while it is running attaches to the same entry.
//!
//! Callers choose how to wait:
//! * [`Resolver::resolve`] blocks the current thread until the entry settles.
//! * [`Resolver::resolve_no_wait`] returns a [`ResolveHandle`] right away. The
//!   handle can be polled, waited on, or awaited as a `Future`. Dropping it
//!   does not affect the lookup or other handles.
//!
//! In silent mode a failed lookup settles as `TypeValue::Simple { id }` and is
//! cached like any other result. Otherwise the failure is handed to every
//! attached caller and the entry stays failed. Decoding treats a failed entry
//! as known and never retries it; an explicit [`Resolver::resolve`] or
//! [`Resolver::resolve_no_wait`] replaces it with a fresh lookup.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};
use std::thread;

use tracing::{debug, info, warn};

use crate::adapter::untyped_node;
use crate::construct::Node;
use crate::datatype::TypeValue;
use crate::error::{ActivityError, Result};
use crate::schema::OtherHasher;

// ------------- Lookup collaborators -------------
/// Turns an identifier into a type value. May block and may perform I/O.
pub trait TypeLookup: Send + Sync {
    fn lookup(&self, id: &str) -> Result<TypeValue>;
}

impl<F> TypeLookup for F
where
    F: Fn(&str) -> Result<TypeValue> + Send + Sync,
{
    fn lookup(&self, id: &str) -> Result<TypeValue> {
        self(id)
    }
}

/// An in-memory registry of type descriptions.
#[derive(Debug, Default, Clone)]
pub struct StaticLookup {
    descriptions: HashMap<String, Node, OtherHasher>,
}
impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, id: impl Into<String>, description: Node) -> Self {
        self.descriptions.insert(id.into(), description);
        self
    }
    pub fn len(&self) -> usize {
        self.descriptions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
impl TypeLookup for StaticLookup {
    fn lookup(&self, id: &str) -> Result<TypeValue> {
        match self.descriptions.get(id) {
            Some(description) => Ok(TypeValue::described(id, description.clone())),
            None => Err(ActivityError::Resolution {
                id: id.to_owned(),
                message: String::from("unknown type identifier"),
            }),
        }
    }
}

/// Reads descriptions from `<directory>/<id>.json`.
///
/// Characters that cannot appear in a file name are replaced by `_`, so
/// `http://example.org/verbs/post` is looked up as
/// `http___example.org_verbs_post.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLookup {
    directory: PathBuf,
}
impl DirectoryLookup {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self { directory: directory.as_ref().to_path_buf() }
    }
    pub fn file_for(&self, id: &str) -> PathBuf {
        let name: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.directory.join(format!("{name}.json"))
    }
}
impl TypeLookup for DirectoryLookup {
    fn lookup(&self, id: &str) -> Result<TypeValue> {
        let text = fs::read_to_string(self.file_for(id))?;
        let json: serde_json::Value = serde_json::from_str(&text)?;
        let mut description = untyped_node(&json)?;
        if description.contains("id") {
            description = description.to_builder().unset("id").get();
        }
        Ok(TypeValue::described(id, description))
    }
}

// ------------- Cache entries -------------
#[derive(Debug, Clone)]
enum Outcome {
    Resolving,
    Resolved(TypeValue),
    Failed(String),
}

#[derive(Debug)]
struct EntryState {
    outcome: Outcome,
    wakers: Vec<Waker>,
}

#[derive(Debug)]
struct Entry {
    state: Mutex<EntryState>,
    settled: Condvar,
}
impl Entry {
    fn resolving() -> Self {
        Self {
            state: Mutex::new(EntryState { outcome: Outcome::Resolving, wakers: Vec::new() }),
            settled: Condvar::new(),
        }
    }
    fn settle(&self, outcome: Outcome) {
        let wakers = {
            let mut state = lock(&self.state);
            state.outcome = outcome;
            std::mem::take(&mut state.wakers)
        };
        self.settled.notify_all();
        for waker in wakers {
            waker.wake();
        }
    }
    fn is_settled(&self) -> bool {
        !matches!(lock(&self.state).outcome, Outcome::Resolving)
    }
}

// the entries only hold plain data, so a poisoned lock is still consistent
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn deliver(id: &str, outcome: &Outcome) -> Option<Result<TypeValue>> {
    match outcome {
        Outcome::Resolving => None,
        Outcome::Resolved(value) => Some(Ok(value.clone())),
        Outcome::Failed(message) => Some(Err(ActivityError::Resolution {
            id: id.to_owned(),
            message: message.clone(),
        })),
    }
}

// ------------- ResolveHandle -------------
/// A shared view on one resolution. Cloning is cheap; every clone sees the same result.
#[derive(Clone)]
pub struct ResolveHandle {
    id: Arc<str>,
    entry: Arc<Entry>,
}

impl ResolveHandle {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn is_complete(&self) -> bool {
        self.entry.is_settled()
    }
    /// The result if the entry has settled, without blocking.
    pub fn try_get(&self) -> Option<Result<TypeValue>> {
        deliver(&self.id, &lock(&self.entry.state).outcome)
    }
    /// Blocks the current thread until the entry settles.
    pub fn wait(&self) -> Result<TypeValue> {
        let mut state = lock(&self.entry.state);
        loop {
            if let Some(result) = deliver(&self.id, &state.outcome) {
                return result;
            }
            state = self
                .entry
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
impl Future for ResolveHandle {
    type Output = Result<TypeValue>;
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = lock(&self.entry.state);
        match deliver(&self.id, &state.outcome) {
            Some(result) => Poll::Ready(result),
            None => {
                if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    state.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
impl fmt::Debug for ResolveHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResolveHandle")
            .field("id", &self.id)
            .field("complete", &self.is_complete())
            .finish()
    }
}

// ------------- Resolver -------------
type Entries = Arc<Mutex<HashMap<String, Arc<Entry>, OtherHasher>>>;

pub struct Resolver {
    lookup: Arc<dyn TypeLookup>,
    silent: bool,
    entries: Entries,
    lookups: Arc<AtomicUsize>,
}

impl Resolver {
    pub fn new(lookup: impl TypeLookup + 'static, silent: bool) -> Self {
        Self::with_shared_lookup(Arc::new(lookup), silent)
    }
    pub fn with_shared_lookup(lookup: Arc<dyn TypeLookup>, silent: bool) -> Self {
        Self {
            lookup,
            silent,
            entries: Arc::new(Mutex::new(HashMap::default())),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }
    pub fn is_silent(&self) -> bool {
        self.silent
    }
    /// Blocks until the identifier is resolved or has failed.
    pub fn resolve(&self, id: &str) -> Result<TypeValue> {
        self.resolve_no_wait(id).wait()
    }
    /// Returns at once with a handle to the (possibly already settled) resolution.
    /// A previously failed entry is replaced by a new lookup.
    pub fn resolve_no_wait(&self, id: &str) -> ResolveHandle {
        let entry = self.claim(id, true);
        ResolveHandle { id: Arc::from(id), entry }
    }
    /// The cached value, if the identifier has been resolved.
    pub fn peek(&self, id: &str) -> Option<TypeValue> {
        let entry = lock(&self.entries).get(id).map(Arc::clone)?;
        let state = lock(&entry.state);
        match &state.outcome {
            Outcome::Resolved(value) => Some(value.clone()),
            _ => None,
        }
    }
    /// The cached value, or a simple value. A background resolution is started
    /// only for identifiers the resolver has never seen; failed entries are left alone.
    pub fn peek_or_prefetch(&self, id: &str) -> TypeValue {
        let entry = self.claim(id, false);
        let state = lock(&entry.state);
        match &state.outcome {
            Outcome::Resolved(value) => value.clone(),
            _ => TypeValue::simple(id),
        }
    }
    /// Forgets a settled entry, resolved or failed. Entries that are still resolving are kept.
    pub fn invalidate(&self, id: &str) -> bool {
        let mut entries = lock(&self.entries);
        let settled = entries.get(id).map(|e| e.is_settled()).unwrap_or(false);
        if settled {
            entries.remove(id);
        }
        settled
    }
    /// Number of identifiers currently cached, failed or resolving.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// How many underlying lookups have been started over the resolver's lifetime.
    pub fn lookups_started(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    // Finds or creates the entry for `id` under the map lock and starts the
    // lookup when this call created it.
    fn claim(&self, id: &str, retry_failed: bool) -> Arc<Entry> {
        let (entry, owner) = {
            let mut entries = lock(&self.entries);
            let reusable = entries.get(id).filter(|existing| {
                !(retry_failed && matches!(lock(&existing.state).outcome, Outcome::Failed(_)))
            });
            match reusable {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let claimed = Arc::new(Entry::resolving());
                    entries.insert(id.to_owned(), Arc::clone(&claimed));
                    (claimed, true)
                }
            }
        };
        if owner {
            self.start(id, Arc::clone(&entry));
        } else {
            debug!(id, settled = entry.is_settled(), "attached to existing entry");
        }
        entry
    }

    fn start(&self, id: &str, entry: Arc<Entry>) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        debug!(id, "starting lookup");
        let lookup = Arc::clone(&self.lookup);
        let silent = self.silent;
        let owned_id = id.to_owned();
        let thread_entry = Arc::clone(&entry);
        let spawned = thread::Builder::new()
            .name(format!("type-resolver:{id}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| lookup.lookup(&owned_id)))
                    .unwrap_or_else(|_| {
                        Err(ActivityError::Resolution {
                            id: owned_id.clone(),
                            message: String::from("lookup panicked"),
                        })
                    });
                settle(&thread_entry, &owned_id, result, silent);
            });
        if let Err(e) = spawned {
            let result = Err(ActivityError::Io(e.to_string()));
            settle(&entry, id, result, silent);
        }
    }
}

fn settle(entry: &Entry, id: &str, result: Result<TypeValue>, silent: bool) {
    match result {
        Ok(value) => {
            info!(id, described = value.is_described(), "type resolved");
            entry.settle(Outcome::Resolved(value));
        }
        Err(e) if silent => {
            warn!(id, error = %e, "lookup failed, falling back to a simple type");
            entry.settle(Outcome::Resolved(TypeValue::simple(id)));
        }
        Err(e) => {
            warn!(id, error = %e, "lookup failed");
            let message = match e {
                ActivityError::Resolution { message, .. } => message,
                other => other.to_string(),
            };
            entry.settle(Outcome::Failed(message));
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("silent", &self.silent)
            .field("entries", &self.len())
            .field("lookups_started", &self.lookups_started())
            .finish()
    }
}

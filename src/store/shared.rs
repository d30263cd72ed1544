//! Process-wide shared store.
//!
//! Most hosts should construct a [`ConfigStore`] and pass it around; this
//! holder exists for the dashboard's screens, which all read the same tree
//! and want one shared cache.

use super::ConfigStore;
use crate::error::DeckError;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

static SHARED: Mutex<Option<Arc<ConfigStore>>> = Mutex::new(None);

/// Obtain the process-wide store, initializing it on the first call.
///
/// The first caller's root wins (`None` means [`ConfigStore::default_root`]).
/// A later call passing the same root, or no root, returns the same
/// instance. A later call passing a *different* root fails with
/// [`DeckError::RootConflict`]: silently rebinding global state would hide a
/// configuration defect.
pub fn shared_store(root: Option<PathBuf>) -> Result<Arc<ConfigStore>, DeckError> {
    let mut slot = SHARED.lock();

    if let Some(store) = slot.as_ref() {
        if let Some(requested) = root {
            let requested = dunce::canonicalize(&requested).unwrap_or(requested);
            if requested != store.root() {
                return Err(DeckError::RootConflict {
                    existing: store.root().to_path_buf(),
                    requested,
                });
            }
        }
        return Ok(Arc::clone(store));
    }

    let root = match root {
        Some(root) => root,
        None => ConfigStore::default_root()?,
    };
    let store = Arc::new(ConfigStore::new(root));
    *slot = Some(Arc::clone(&store));
    Ok(store)
}

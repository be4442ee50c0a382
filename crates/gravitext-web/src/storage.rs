use gravitext::Storage;

/// Browser `localStorage`. When the page runs without it (private mode, sandboxed
/// iframe) reads come back empty and writes are dropped, so progress simply does
/// not persist.
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let inner = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if inner.is_none() {
            log::warn!("localStorage unavailable; progress will not be saved");
        }
        Self { inner }
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(store) = &self.inner {
            if let Err(err) = store.set_item(key, value) {
                log::warn!("Could not save {key}: {err:?}");
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(store) = &self.inner {
            if let Err(err) = store.remove_item(key) {
                log::warn!("Could not remove {key}: {err:?}");
            }
        }
    }
}

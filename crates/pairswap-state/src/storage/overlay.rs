use std::collections::BTreeMap;

/// Committed key-value data plus a layer of pending writes.
///
/// A pending `None` marks a deletion. Shared by every storage backend.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overlay {
    pub(crate) committed: BTreeMap<Vec<u8>, Vec<u8>>,
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl Overlay {
    pub(crate) fn with_committed(committed: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Overlay {
            committed,
            pending: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(pending) => pending.clone(),
            None => self.committed.get(key).cloned(),
        }
    }

    pub(crate) fn stage(&mut self, key: &[u8], value: Option<&[u8]>) {
        self.pending.insert(key.to_vec(), value.map(<[u8]>::to_vec));
    }

    pub(crate) fn apply_pending(&mut self) {
        for (key, value) in std::mem::take(&mut self.pending) {
            match value {
                Some(v) => {
                    self.committed.insert(key, v);
                }
                None => {
                    self.committed.remove(&key);
                }
            }
        }
    }

    pub(crate) fn discard_pending(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        let mut keys: Vec<Vec<u8>> = self
            .committed
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| !matches!(self.pending.get(*key), Some(None)))
            .cloned()
            .collect();

        keys.extend(
            self.pending
                .iter()
                .filter(|(key, value)| {
                    key.starts_with(prefix) && value.is_some() && !self.committed.contains_key(*key)
                })
                .map(|(key, _)| key.clone()),
        );
        keys.sort();
        keys
    }
}

use std::sync::Arc;

use tokio::sync::watch;

/// Session-lifetime list shared by every view. Clones are handles onto the same
/// value; the only mutation is a wholesale [`Store::replace`].
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<Arc<Vec<T>>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Store<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self { tx: Arc::new(tx) }
    }

    pub fn value(&self) -> Arc<Vec<T>> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Swap in a new list and wake every subscriber.
    pub fn replace(&self, values: Vec<T>) {
        self.tx.send_replace(Arc::new(values));
    }

    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    /// Receiver that resolves `changed()` after every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.tx.subscribe()
    }
}

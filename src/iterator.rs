//! Ordered key iterator
//!
//! Walks the original keys in ascending byte order by asking the preimage
//! index, one step at a time, for the smallest key after the cursor.
//!
//! ## Protocol (advance, then read)
//! ```text
//!            next() == true
//!          ┌───────────────┐
//!          ▼               │
//!   ┌─────────────┐        │        ┌─────────────┐
//!   │ Positioned  │────────┘───────►│  Exhausted  │  next() == false
//!   └─────────────┘  no more keys   └─────────────┘  key()/value() == None
//!                    or query error
//! ```
//! `key()`/`value()` are `None` until the first successful `next()`.

use std::ops::Bound;

use crate::error::CidKvError;
use crate::index::IndexConnection;

/// Iterator over the (key, value) pairs under a prefix, in key order
pub struct KeyIterator<C: IndexConnection> {
    conn: Option<C>,
    prefix: Vec<u8>,
    /// Lower bound for the next lookup
    cursor: Vec<u8>,
    /// Whether `cursor` itself may be returned (first lookup with no start)
    inclusive: bool,
    current: Option<(Vec<u8>, Vec<u8>)>,
    exhausted: bool,
    err: Option<CidKvError>,
}

impl<C: IndexConnection> KeyIterator<C> {
    /// Iterator over keys starting with `prefix`, after `prefix ++ start`
    ///
    /// With an empty `start` every key under `prefix` is included, the
    /// prefix itself too.
    pub fn new(conn: C, prefix: &[u8], start: &[u8]) -> Self {
        let mut cursor = Vec::with_capacity(prefix.len() + start.len());
        cursor.extend_from_slice(prefix);
        cursor.extend_from_slice(start);

        Self {
            conn: Some(conn),
            prefix: prefix.to_vec(),
            cursor,
            inclusive: start.is_empty(),
            current: None,
            exhausted: false,
            err: None,
        }
    }

    /// Iterator that failed to obtain a connection
    ///
    /// `next()` returns false immediately and `error()` reports `err`.
    pub fn failed(err: CidKvError) -> Self {
        Self {
            conn: None,
            prefix: Vec::new(),
            cursor: Vec::new(),
            inclusive: false,
            current: None,
            exhausted: true,
            err: Some(err),
        }
    }

    /// Advance to the next pair; false once exhausted or on error
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        let Some(conn) = self.conn.as_mut() else {
            self.exhaust();
            return false;
        };

        let lower = if self.inclusive {
            Bound::Included(self.cursor.as_slice())
        } else {
            Bound::Excluded(self.cursor.as_slice())
        };

        match conn.next_entry(&self.prefix, lower) {
            Ok(Some(entry)) => {
                self.cursor.clone_from(&entry.key);
                self.inclusive = false;
                self.current = Some((entry.key, entry.value));
                true
            }
            Ok(None) => {
                self.exhaust();
                false
            }
            Err(e) => {
                tracing::error!("iterator next() error: {}", e);
                self.err = Some(e);
                self.exhaust();
                false
            }
        }
    }

    /// Current key, valid until the next call to `next()`
    pub fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(key, _)| key.as_slice())
    }

    /// Current value, valid until the next call to `next()`
    pub fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, value)| value.as_slice())
    }

    /// Last error encountered; running out of keys is not an error
    pub fn error(&self) -> Option<&CidKvError> {
        self.err.as_ref()
    }

    /// Close the index connection. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close() {
                tracing::warn!("iterator release error: {}", e);
            }
        }
        self.exhaust();
    }

    fn exhaust(&mut self) {
        self.current = None;
        self.exhausted = true;
    }
}

impl<C: IndexConnection> Drop for KeyIterator<C> {
    fn drop(&mut self) {
        self.release();
    }
}

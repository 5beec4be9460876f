// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Single-flight rendering per target.
//!
//! A caller that may fire new requests while an old one is still
//! running (a preview pane being dragged, say) keeps one `SingleFlight`
//! per target.  Every request takes a `Ticket`; taking a ticket makes
//! all earlier ones stale.  A render holding a stale ticket stops at
//! its next row boundary with `Superseded`, and whatever it produces is
//! discarded by `Ticket::deliver`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{RenderError, Result};

/// The request slot of one render target.
#[derive(Clone, Debug, Default)]
pub struct SingleFlight {
    latest: Arc<AtomicU64>,
}

impl SingleFlight {
    /// An empty slot.
    pub fn new() -> Self {
        SingleFlight::default()
    }

    /// Starts a new request, superseding every ticket issued before.
    pub fn begin(&self) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            latest: Arc::clone(&self.latest),
            generation,
        }
    }
}

/// Proof of one request's place in line.
#[derive(Clone, Debug)]
pub struct Ticket {
    latest: Arc<AtomicU64>,
    generation: u64,
}

impl Ticket {
    /// This ticket's sequence number; later tickets have larger ones.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True until a newer ticket is issued for the same slot.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// Hands a finished result back only if nothing newer was requested
    /// meanwhile.  Stale results and `Superseded` errors yield `None`.
    pub fn deliver<T>(&self, result: Result<T>) -> Option<Result<T>> {
        match result {
            Err(RenderError::Superseded) => None,
            _ if !self.is_current() => None,
            other => Some(other),
        }
    }
}

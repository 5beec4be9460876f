// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Row-parallel work distribution.  The buffer is cut into rows, the
//! rows are put behind a single shared iterator, and each worker pulls
//! the next row until the iterator runs dry.  Rows are independent, so
//! nothing else is shared between workers.

use std::sync::Mutex;

use crate::error::{RenderError, Result};

/// Default worker count: one per logical CPU.
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Calls `render_row(row_index, row)` once for every `row_len`-sized row
/// of `buffer`, spread over `threads` scoped workers.  The first error
/// returned by any row is the result of the whole call.
pub(crate) fn for_each_row<T, F>(
    buffer: &mut [T],
    row_len: usize,
    threads: usize,
    render_row: F,
) -> Result<()>
where
    T: Send,
    F: Fn(usize, &mut [T]) -> Result<()> + Sync,
{
    if row_len == 0 || buffer.is_empty() {
        return Ok(());
    }

    let rows_total = buffer.len() / row_len;
    let threads = threads.max(1).min(rows_total.max(1));
    if threads == 1 {
        for (y, row) in buffer.chunks_mut(row_len).enumerate() {
            render_row(y, row)?;
        }
        return Ok(());
    }

    let queue = Mutex::new(buffer.chunks_mut(row_len).enumerate());
    let queue = &queue;
    let render_row = &render_row;

    let outcome = crossbeam::scope(|spawner| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                spawner.spawn(move |_| -> Result<()> {
                    loop {
                        let next = match queue.lock() {
                            Ok(mut rows) => rows.next(),
                            Err(_) => return Err(RenderError::WorkerPanicked),
                        };
                        match next {
                            Some((y, row)) => render_row(y, row)?,
                            None => return Ok(()),
                        }
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| RenderError::WorkerPanicked)
                    .and_then(|finished| finished)
            })
            .collect::<Result<Vec<()>>>()
    });

    match outcome {
        Ok(finished) => finished.map(|_| ()),
        Err(_) => Err(RenderError::WorkerPanicked),
    }
}

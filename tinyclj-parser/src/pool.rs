// tinyclj-parser - Autorelease pool
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Deferred release of heap values.
//!
//! [`Heap::autorelease`] files a value in the innermost pool frame; the owner
//! it carries is dropped when that frame is drained. Frames nest: pushing a
//! frame makes it the target of new tickets, popping it drains everything
//! registered since the push. A base frame always exists and is only drained
//! by [`Heap::pool_cleanup_all`].
//!
//! [`Heap::pool_scope`] returns a guard that pops its frame when dropped,
//! which is the usual way to bracket an evaluation.

use std::ops::{Deref, DerefMut};

use crate::value::{Heap, Value};

/// Identifies a pushed pool frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "a pushed pool must be popped"]
pub struct PoolId(usize);

/// Stack of frames holding pending release tickets.
#[derive(Debug)]
pub(crate) struct AutoreleasePool {
    frames: Vec<Vec<Value>>,
}

impl AutoreleasePool {
    pub(crate) fn new() -> Self {
        AutoreleasePool {
            frames: vec![Vec::new()],
        }
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn pending(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    fn register(&mut self, v: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(v);
        }
    }

    /// Remove frames `index..` and return their tickets, newest first.
    fn take_from(&mut self, index: usize) -> Vec<Value> {
        let mut tickets = Vec::new();
        for mut frame in self.frames.drain(index..).rev() {
            frame.reverse();
            tickets.append(&mut frame);
        }
        tickets
    }
}

impl Heap {
    /// Register `v` for release when the innermost pool frame drains.
    ///
    /// Returns `v` so calls can be chained. Immediates are returned without
    /// creating a ticket.
    ///
    /// # Panics
    ///
    /// Panics if `v` refers to a released object.
    #[track_caller]
    pub fn autorelease(&mut self, v: Value) -> Value {
        if let Value::Obj(r) = v {
            assert!(self.is_live(v), "autorelease of released object {:?}", r);
            self.pool.register(v);
        }
        v
    }

    /// Open a new pool frame.
    pub fn push_pool(&mut self) -> PoolId {
        self.pool.frames.push(Vec::new());
        let id = PoolId(self.pool.depth() - 1);
        log::debug!("pushed pool frame {}", id.0);
        id
    }

    /// Drain frame `id` and every frame opened after it.
    ///
    /// Popping a frame that is already gone is a no-op.
    pub fn pop_pool(&mut self, id: PoolId) {
        let depth = self.pool.depth();
        if id.0 == 0 || id.0 >= depth {
            log::warn!("pop of inactive pool frame {} (depth {})", id.0, depth);
            return;
        }
        if id.0 + 1 < depth {
            log::warn!(
                "popping pool frame {} with {} inner frame(s) still open",
                id.0,
                depth - id.0 - 1
            );
        }
        let tickets = self.pool.take_from(id.0);
        self.drain(tickets);
    }

    /// Drain every frame, including the base frame.
    pub fn pool_cleanup_all(&mut self) {
        let tickets = self.pool.take_from(0);
        self.pool.frames.push(Vec::new());
        self.drain(tickets);
    }

    /// Open a frame that is popped when the returned guard is dropped.
    pub fn pool_scope(&mut self) -> PoolScope<'_> {
        let id = self.push_pool();
        PoolScope { heap: self, id }
    }

    /// Number of values waiting for release in all frames.
    pub fn pending_tickets(&self) -> usize {
        self.pool.pending()
    }

    /// Number of frames, including the base frame.
    pub fn pool_depth(&self) -> usize {
        self.pool.depth()
    }

    /// Whether a frame other than the base frame is open.
    pub fn is_pool_active(&self) -> bool {
        self.pool.depth() > 1
    }

    fn drain(&mut self, tickets: Vec<Value>) {
        if tickets.is_empty() {
            return;
        }
        log::debug!("draining {} autoreleased value(s)", tickets.len());
        for v in tickets {
            self.release(v);
        }
    }
}

/// Guard for a pool frame; drains the frame on drop.
///
/// Dereferences to the [`Heap`], so work inside the scope goes through the
/// guard.
pub struct PoolScope<'h> {
    heap: &'h mut Heap,
    id: PoolId,
}

impl Deref for PoolScope<'_> {
    type Target = Heap;

    fn deref(&self) -> &Heap {
        self.heap
    }
}

impl DerefMut for PoolScope<'_> {
    fn deref_mut(&mut self) -> &mut Heap {
        self.heap
    }
}

impl Drop for PoolScope<'_> {
    fn drop(&mut self) {
        self.heap.pop_pool(self.id);
    }
}

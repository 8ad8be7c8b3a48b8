//! Path-indexed hook storage.
//!
//! Each component path owns a bucket of three ordered sequences: state
//! cells, ref cells, and effect records. The Nth hook call during a render
//! of a path reads the Nth entry of the matching sequence; cursors reset
//! every time the reconciler begins that path. Buckets whose path was not
//! visited by a pass are swept afterwards, releasing their cells and
//! handing the evicted effects' cleanups back to the caller.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::cell::{MutCell, StateCell, UpdateFn};
use crate::effect::{Cleanup, EffectRecord};
use crate::error::CofferError;

#[derive(Default)]
struct Bucket {
    states: SmallVec<[Box<dyn Any>; 4]>,
    refs: SmallVec<[Box<dyn Any>; 4]>,
    effects: SmallVec<[EffectRecord; 2]>,
    state_cursor: usize,
    ref_cursor: usize,
    effect_cursor: usize,
}

/// Whether `use_effect` must queue its body this pass.
pub(crate) struct EffectDecision {
    pub(crate) index: usize,
    pub(crate) run: bool,
}

#[derive(Default)]
pub(crate) struct Store {
    buckets: HashMap<String, Bucket>,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Opens `path` for a render: creates its bucket on first sight and
    /// rewinds all three cursors.
    pub(crate) fn begin(&mut self, path: &str) {
        let bucket = self.buckets.entry(path.to_string()).or_default();
        bucket.state_cursor = 0;
        bucket.ref_cursor = 0;
        bucket.effect_cursor = 0;
    }

    pub(crate) fn next_state<T: 'static>(
        &mut self,
        path: &str,
        init: impl FnOnce() -> T,
        on_change: UpdateFn,
    ) -> Result<(StateCell<T>, bool), CofferError> {
        let bucket = self.buckets.entry(path.to_string()).or_default();
        let index = bucket.state_cursor;
        bucket.state_cursor += 1;
        if index < bucket.states.len() {
            match bucket.states[index].downcast_ref::<StateCell<T>>() {
                Some(cell) => Ok((cell.clone(), false)),
                None => Err(CofferError::HookMismatch {
                    path: path.to_string(),
                    index,
                    expected: std::any::type_name::<StateCell<T>>(),
                }),
            }
        } else {
            let cell = StateCell::new(init(), on_change);
            bucket.states.push(Box::new(cell.clone()));
            Ok((cell, true))
        }
    }

    pub(crate) fn next_ref<T: 'static>(
        &mut self,
        path: &str,
        init: impl FnOnce() -> T,
    ) -> Result<(MutCell<T>, bool), CofferError> {
        let bucket = self.buckets.entry(path.to_string()).or_default();
        let index = bucket.ref_cursor;
        bucket.ref_cursor += 1;
        if index < bucket.refs.len() {
            match bucket.refs[index].downcast_ref::<MutCell<T>>() {
                Some(cell) => Ok((cell.clone(), false)),
                None => Err(CofferError::HookMismatch {
                    path: path.to_string(),
                    index,
                    expected: std::any::type_name::<MutCell<T>>(),
                }),
            }
        } else {
            let cell = MutCell::new(init());
            bucket.refs.push(Box::new(cell.clone()));
            Ok((cell, true))
        }
    }

    /// Advances the effect cursor and decides whether the body must run,
    /// comparing `deps` against the value stored by the last committed body.
    pub(crate) fn next_effect<D: PartialEq + 'static>(
        &mut self,
        path: &str,
        deps: &D,
    ) -> Result<EffectDecision, CofferError> {
        let bucket = self.buckets.entry(path.to_string()).or_default();
        let index = bucket.effect_cursor;
        bucket.effect_cursor += 1;
        if index < bucket.effects.len() {
            let run = match &bucket.effects[index].deps {
                // A body was queued but never committed (earlier pass failed
                // before its flush); run it again.
                None => true,
                Some(stored) => match stored.downcast_ref::<D>() {
                    Some(old) => old != deps,
                    None => {
                        return Err(CofferError::HookMismatch {
                            path: path.to_string(),
                            index,
                            expected: std::any::type_name::<D>(),
                        });
                    }
                },
            };
            Ok(EffectDecision { index, run })
        } else {
            bucket.effects.push(EffectRecord::default());
            Ok(EffectDecision { index, run: true })
        }
    }

    pub(crate) fn take_cleanup(&mut self, path: &str, index: usize) -> Option<Cleanup> {
        self.buckets
            .get_mut(path)
            .and_then(|b| b.effects.get_mut(index))
            .and_then(|record| record.cleanup.take())
    }

    pub(crate) fn commit_effect(
        &mut self,
        path: &str,
        index: usize,
        deps: Box<dyn Any>,
        cleanup: Option<Cleanup>,
    ) {
        if let Some(record) = self
            .buckets
            .get_mut(path)
            .and_then(|b| b.effects.get_mut(index))
        {
            record.deps = Some(deps);
            record.cleanup = cleanup;
        }
    }

    /// Drops every bucket whose path was not visited this pass. Returns the
    /// evicted effects' cleanups, path-sorted, for the caller to run.
    pub(crate) fn sweep(&mut self, visited: &HashSet<String>) -> Vec<Cleanup> {
        let mut evicted: Vec<String> = self
            .buckets
            .keys()
            .filter(|path| !visited.contains(*path))
            .cloned()
            .collect();
        evicted.sort();

        let mut cleanups = Vec::new();
        for path in evicted {
            log::debug!("evicting state bucket {path}");
            if let Some(mut bucket) = self.buckets.remove(&path) {
                for record in bucket.effects.iter_mut() {
                    if let Some(cleanup) = record.cleanup.take() {
                        cleanups.push(cleanup);
                    }
                }
            }
        }
        cleanups
    }

    /// Removes every bucket, collecting all remaining cleanups. Used on
    /// unmount.
    pub(crate) fn drain_cleanups(&mut self) -> Vec<Cleanup> {
        let mut paths: Vec<String> = self.buckets.keys().cloned().collect();
        paths.sort();

        let mut cleanups = Vec::new();
        for path in paths {
            if let Some(mut bucket) = self.buckets.remove(&path) {
                for record in bucket.effects.iter_mut() {
                    if let Some(cleanup) = record.cleanup.take() {
                        cleanups.push(cleanup);
                    }
                }
            }
        }
        cleanups
    }

    #[cfg(test)]
    pub(crate) fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.buckets.keys().cloned().collect();
        paths.sort();
        paths
    }

    #[cfg(test)]
    pub(crate) fn bucket_sizes(&self, path: &str) -> Option<(usize, usize, usize)> {
        self.buckets
            .get(path)
            .map(|b| (b.states.len(), b.refs.len(), b.effects.len()))
    }
}

//! Single-resolution completion signal
//!
//! A [`Request`] collects continuations and runs all of them, in
//! registration order, the one time it is resolved. Resolution happens
//! synchronously in the caller's stack frame.

use anyhow::Result;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Continuation<V> = Box<dyn FnOnce(&Request<V>, &V)>;

struct RequestState<V> {
    continuations: Vec<Continuation<V>>,
    value: Option<Rc<V>>,
}

/// Handle to a pending (or finished) piece of simulated work
///
/// Clones share the same state.
pub struct Request<V> {
    state: Rc<RefCell<RequestState<V>>>,
}

impl<V> Clone for Request<V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<V: 'static> Default for Request<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: 'static> Request<V> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RequestState {
                continuations: Vec::new(),
                value: None,
            })),
        }
    }

    /// Register a continuation
    ///
    /// If the request is already resolved the continuation runs right away
    /// with the stored value.
    pub fn done<F>(&self, continuation: F) -> &Self
    where
        F: FnOnce(&Request<V>, &V) + 'static,
    {
        let resolved = self.state.borrow().value.clone();
        match resolved {
            Some(value) => continuation(self, &*value),
            None => self
                .state
                .borrow_mut()
                .continuations
                .push(Box::new(continuation)),
        }
        self
    }

    /// Resolve with `value`, running every registered continuation
    ///
    /// A request resolves at most once: a second call fails and runs nothing.
    pub fn resolve(&self, value: V) -> Result<()> {
        let (value, continuations) = {
            let mut state = self.state.borrow_mut();
            if state.value.is_some() {
                anyhow::bail!("Request has already been resolved");
            }
            let value = Rc::new(value);
            state.value = Some(Rc::clone(&value));
            (value, std::mem::take(&mut state.continuations))
        };
        for continuation in continuations {
            continuation(self, &*value);
        }
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.state.borrow().value.is_some()
    }

    /// Number of continuations still waiting for resolution
    pub fn pending_continuations(&self) -> usize {
        self.state.borrow().continuations.len()
    }

    /// Whether two handles refer to the same request
    pub fn same_as(&self, other: &Request<V>) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<V: fmt::Debug> fmt::Debug for Request<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Request")
            .field("value", &state.value)
            .field("continuations", &state.continuations.len())
            .finish()
    }
}

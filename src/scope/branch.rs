use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::scope::ScopeStack;

/// The bindings of one stack level, optionally layered on a read-only
/// trunk.
///
/// Positions below the trunk length are read from the trunk, which is the
/// stack (or another branch) the branch was created from. The trunk may keep
/// growing after the branch was created but only the bindings below the
/// recorded length are visible through the branch.
pub struct StackBranch<T> {
    trunk: Option<Trunk<T>>,
    bindings: Vec<Entry<T>>,
    /// Position of the most recent binding of each name on this level.
    latest: HashMap<String, usize>,
}

struct Trunk<T> {
    lower: Rc<RefCell<StackBranch<T>>>,
    len: usize,
}

#[derive(Clone)]
struct Entry<T> {
    name: String,
    value: T,
    /// The binding of the same name this one shadows, if it is on this
    /// level.
    prev: Option<usize>,
}

impl<T> StackBranch<T> {
    /// The number of positions visible through this branch.
    pub fn len(&self) -> usize {
        self.trunk_len() + self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of read-only positions.
    pub fn trunk_len(&self) -> usize {
        self.trunk.as_ref().map_or(0, |t| t.len)
    }

    /// Drops every binding on this level.
    pub(crate) fn release(&mut self) {
        self.latest.clear();
        self.bindings.clear();
    }

    /// The names bound on this level, most recent last.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|entry| entry.name.as_str())
    }
}

impl<T: Clone> StackBranch<T> {
    pub(crate) fn root() -> Self {
        Self {
            trunk: None,
            bindings: Vec::new(),
            latest: HashMap::new(),
        }
    }

    /// Creates an empty branch over everything currently on `stack`.
    pub fn new(stack: &ScopeStack<T>) -> Self {
        let lower = stack.frames.clone();
        let len = lower.borrow().len();
        Self {
            trunk: Some(Trunk { lower, len }),
            bindings: Vec::new(),
            latest: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, name: String, value: T) {
        let index = self.len();
        let prev = self.latest.insert(name.clone(), index);
        self.bindings.push(Entry { name, value, prev });
    }

    pub(crate) fn pop(&mut self) -> Option<(String, T)> {
        let Entry { name, value, prev } = self.bindings.pop()?;
        match prev {
            Some(prev) => {
                self.latest.insert(name.clone(), prev);
            }
            None => {
                self.latest.remove(&name);
            }
        }
        Some((name, value))
    }

    pub(crate) fn get(&self, index: usize) -> Option<T> {
        let trunk_len = self.trunk_len();
        match &self.trunk {
            Some(trunk) if index < trunk_len => {
                let value = trunk.lower.borrow().get(index);
                value
            }
            _ => self
                .bindings
                .get(index - trunk_len)
                .map(|entry| entry.value.clone()),
        }
    }

    /// Replaces the value at `index`, which must be above the trunk.
    pub(crate) fn set(&mut self, index: usize, value: T) -> Result<(), SetError> {
        let trunk_len = self.trunk_len();
        if index < trunk_len {
            return Err(SetError::Trunk);
        }
        match self.bindings.get_mut(index - trunk_len) {
            Some(entry) => {
                entry.value = value;
                Ok(())
            }
            None => Err(SetError::OutOfRange),
        }
    }

    /// Finds the most recent binding of `name`.
    pub(crate) fn lookup(&self, name: &str) -> Option<(usize, T)> {
        self.lookup_below(name, usize::MAX)
    }

    /// Finds the most recent binding of `name` at a position below `limit`.
    fn lookup_below(&self, name: &str, limit: usize) -> Option<(usize, T)> {
        let trunk_len = self.trunk_len();
        let mut index = self.latest.get(name).copied();
        while let Some(i) = index {
            if i < limit {
                let entry = &self.bindings[i - trunk_len];
                return Some((i, entry.value.clone()));
            }
            index = self.bindings[i - trunk_len].prev;
        }
        let trunk = self.trunk.as_ref()?;
        let found = trunk
            .lower
            .borrow()
            .lookup_below(name, limit.min(trunk.len));
        found
    }
}

pub(crate) enum SetError {
    Trunk,
    OutOfRange,
}

impl<T: Clone> Clone for StackBranch<T> {
    fn clone(&self) -> Self {
        Self {
            trunk: self.trunk.as_ref().map(|t| Trunk {
                lower: t.lower.clone(),
                len: t.len,
            }),
            bindings: self.bindings.clone(),
            latest: self.latest.clone(),
        }
    }
}

impl<T> fmt::Debug for StackBranch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackBranch")
            .field("trunk_len", &self.trunk_len())
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

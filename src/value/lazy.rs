use std::fmt;

use once_cell::unsync::OnceCell;

use crate::{Result, Value};

/// A memoized zero-argument computation.
///
/// The computation runs the first time the value is requested and its
/// result is reused afterwards. A failed computation is not memoized so the
/// next request tries again.
pub struct LazyValue {
    cell: OnceCell<Value>,
    init: Box<dyn Fn() -> Result<Value>>,
}

impl LazyValue {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<Value> + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Box::new(init),
        }
    }

    /// Returns the value, computing it if this is the first request.
    pub fn get(&self) -> Result<Value> {
        self.cell.get_or_try_init(|| (self.init)()).cloned()
    }

    /// Whether the value has been computed already.
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazyValue").field(value).finish(),
            None => f.write_str("LazyValue(<pending>)"),
        }
    }
}

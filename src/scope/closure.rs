use std::fmt;
use std::rc::Rc;

use crate::scope::StackBranch;
use crate::types::ast::HypertagDef;
use crate::value::LazyValue;
use crate::Value;

/// A hypertag captured as a value.
///
/// Holds the definition together with a branch over the scope it was
/// defined in. Invoking the closure translates the body on top of that
/// branch, so it sees the bindings of its definition site and nothing the
/// caller bound since.
#[derive(Clone)]
pub struct Closure {
    def: Rc<HypertagDef>,
    branch: StackBranch<Value>,
    depth: usize,
    /// One entry per parameter, `None` for parameters without a default.
    defaults: Rc<[Option<LazyValue>]>,
}

impl Closure {
    pub(crate) fn new(
        def: Rc<HypertagDef>,
        branch: StackBranch<Value>,
        depth: usize,
        defaults: Vec<Option<LazyValue>>,
    ) -> Self {
        Self {
            def,
            branch,
            depth,
            defaults: defaults.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name.name
    }

    pub fn def(&self) -> &HypertagDef {
        &self.def
    }

    /// The frozen view of the definition site's scope.
    pub fn branch(&self) -> &StackBranch<Value> {
        &self.branch
    }

    /// The nesting depth of the definition site.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// See [`HypertagDef::ref_depth`].
    pub fn ref_depth(&self) -> Option<usize> {
        self.def.ref_depth()
    }

    pub(crate) fn default(&self, param: usize) -> Option<&LazyValue> {
        self.defaults.get(param).and_then(Option::as_ref)
    }

    pub(crate) fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.def, &other.def) && Rc::ptr_eq(&self.defaults, &other.defaults)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name())
            .field("depth", &self.depth)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

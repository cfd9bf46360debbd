//! Lexical scoping of names during analysis and translation.
//!
//! A [`ScopeStack`] is a single growable stack of `(name, value)` bindings
//! with constant time shadowing and rollback. Alongside the bindings it
//! tracks the absolute indentation of the block being processed.
//!
//! A [`StackBranch`] freezes a stack at its current length so that a
//! hypertag captured as a value (a [`Closure`]) can later be invoked with
//! the scope of its definition, while the enclosing stack carries on
//! independently.

mod branch;
mod closure;

use std::cell::RefCell;
use std::rc::Rc;

use crate::scope::branch::SetError;
use crate::{Error, Result};

pub use crate::scope::branch::StackBranch;
pub use crate::scope::closure::Closure;

/// A stack of name bindings plus an indentation tracker.
///
/// # Examples
///
/// ```
/// use hypertag::ScopeStack;
///
/// let mut stack = ScopeStack::new();
/// stack.push("$x", 1);
/// let checkpoint = stack.checkpoint();
/// stack.push("$x", 2);
/// assert_eq!(stack.lookup("$x"), Some((1, 2)));
/// stack.reset(checkpoint).unwrap();
/// assert_eq!(stack.lookup("$x"), Some((0, 1)));
/// ```
#[derive(Debug)]
pub struct ScopeStack<T> {
    frames: Rc<RefCell<StackBranch<T>>>,
    /// Always starts with `\n`.
    indent: String,
}

/// A saved stack position, see [`ScopeStack::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    len: usize,
    indent_len: usize,
}

impl<T: Clone> ScopeStack<T> {
    pub fn new() -> Self {
        Self::with_frames(StackBranch::root(), "\n".to_owned())
    }

    /// Builds a stack that grows on top of `branch`.
    ///
    /// Positions below the branch's trunk length are read-only.
    pub fn on_branch(branch: StackBranch<T>, indent: impl Into<String>) -> Self {
        let mut indent = indent.into();
        if !indent.starts_with('\n') {
            indent.insert(0, '\n');
        }
        Self::with_frames(branch, indent)
    }

    fn with_frames(branch: StackBranch<T>, indent: String) -> Self {
        Self {
            frames: Rc::new(RefCell::new(branch)),
            indent,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a read-only view of the stack as it is now.
    pub fn branch(&self) -> StackBranch<T> {
        StackBranch::new(self)
    }

    /// Binds `name` to `value`, shadowing any earlier binding of the name.
    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.frames.borrow_mut().push(name.into(), value);
    }

    /// Removes the most recent binding, making the binding it shadowed
    /// visible again.
    pub fn pop(&mut self) -> Result<(String, T)> {
        let mut frames = self.frames.borrow_mut();
        if frames.len() == frames.trunk_len() {
            return Err(Error::underflow("cannot pop below the bottom of the stack"));
        }
        frames
            .pop()
            .ok_or_else(|| Error::underflow("cannot pop below the bottom of the stack"))
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        self.frames.borrow().get(index)
    }

    /// Replaces the value at `index` in place.
    ///
    /// Fails when `index` is past the top of the stack or inside the
    /// read-only trunk of a branch.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        match self.frames.borrow_mut().set(index, value) {
            Ok(()) => Ok(()),
            Err(SetError::Trunk) => Err(Error::underflow(format!(
                "cannot write position {index} in the read-only trunk"
            ))),
            Err(SetError::OutOfRange) => Err(Error::underflow(format!(
                "position {index} is past the top of the stack"
            ))),
        }
    }

    /// Returns the position and value of the visible binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<(usize, T)> {
        self.frames.borrow().lookup(name)
    }

    /// Records the current stack length and indentation.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.len(),
            indent_len: self.indent.len(),
        }
    }

    /// Undoes every binding made since `checkpoint`, most recent first, and
    /// restores the indentation.
    pub fn reset(&mut self, checkpoint: Checkpoint) -> Result<()> {
        let mut frames = self.frames.borrow_mut();
        if checkpoint.len > frames.len() || checkpoint.indent_len > self.indent.len() {
            return Err(Error::underflow(
                "cannot reset to a checkpoint above the top of the stack",
            ));
        }
        if checkpoint.len < frames.trunk_len() || checkpoint.indent_len == 0 {
            return Err(Error::underflow(
                "cannot reset below the bottom of the stack",
            ));
        }
        while frames.len() > checkpoint.len {
            frames.pop();
        }
        self.indent.truncate(checkpoint.indent_len);
        Ok(())
    }

    /// Extends the tracked indentation by one whitespace character.
    pub fn indent(&mut self, ch: char) {
        self.indent.push(ch);
    }

    /// Removes the last indentation character.
    pub fn dedent(&mut self) -> Result<()> {
        if self.indent.len() <= 1 {
            return Err(Error::underflow("cannot dedent below the left margin"));
        }
        self.indent.pop();
        Ok(())
    }

    /// The absolute indentation so far, starting with `\n`.
    pub fn indentation(&self) -> &str {
        &self.indent
    }
}

/// Dropping a stack releases its bindings. Branches taken from it find an
/// empty trunk afterwards.
impl<T> Drop for ScopeStack<T> {
    fn drop(&mut self) {
        // bindings may hold closures whose branches point back at these frames
        if let Ok(mut frames) = self.frames.try_borrow_mut() {
            frames.release();
        }
    }
}

impl<T: Clone> Default for ScopeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn scope_push_shadows_and_pop_restores() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        stack.push("b", 2);
        stack.push("a", 3);
        assert_eq!(stack.lookup("a"), Some((2, 3)));
        assert_eq!(stack.pop().unwrap(), ("a".to_owned(), 3));
        assert_eq!(stack.lookup("a"), Some((0, 1)));
        stack.pop().unwrap();
        stack.pop().unwrap();
        assert_eq!(stack.lookup("a"), None);
        assert_eq!(stack.pop().unwrap_err().kind(), ErrorKind::StackUnderflow);
    }

    #[test]
    fn scope_checkpoint_reset_is_idempotent() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        stack.indent(' ');
        let cp = stack.checkpoint();
        stack.push("a", 2);
        stack.push("c", 3);
        stack.indent('\t');
        stack.reset(cp).unwrap();
        assert_eq!(stack.lookup("a"), Some((0, 1)));
        assert_eq!(stack.lookup("c"), None);
        assert_eq!(stack.indentation(), "\n ");
        stack.reset(cp).unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.indentation(), "\n ");
    }

    #[test]
    fn scope_reset_above_top_fails() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        let cp = stack.checkpoint();
        stack.pop().unwrap();
        let err = stack.reset(cp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StackUnderflow);
    }

    #[test]
    fn scope_set_in_place() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        stack.set(0, 5).unwrap();
        assert_eq!(stack.lookup("a"), Some((0, 5)));
        assert_eq!(stack.set(1, 0).unwrap_err().kind(), ErrorKind::StackUnderflow);
    }

    #[test]
    fn scope_dedent_stops_at_margin() {
        let mut stack: ScopeStack<()> = ScopeStack::new();
        stack.indent(' ');
        stack.dedent().unwrap();
        assert_eq!(stack.indentation(), "\n");
        assert!(stack.dedent().is_err());
    }

    #[test]
    fn branch_reads_trunk_and_grows_privately() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        stack.push("b", 2);
        let mut branched = ScopeStack::on_branch(stack.branch(), "\n  ");
        branched.push("a", 10);
        assert_eq!(branched.lookup("a"), Some((2, 10)));
        assert_eq!(branched.lookup("b"), Some((1, 2)));
        assert_eq!(branched.get(0), Some(1));
        assert_eq!(branched.indentation(), "\n  ");
        assert_eq!(stack.lookup("a"), Some((0, 1)));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn branch_trunk_is_read_only() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        let mut branched = ScopeStack::on_branch(stack.branch(), "\n");
        let err = branched.set(0, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StackUnderflow);
        assert!(branched.pop().is_err());
        let cp = Checkpoint {
            len: 0,
            ..stack.checkpoint()
        };
        let mut branched = ScopeStack::on_branch(stack.branch(), "\n");
        assert!(branched.reset(cp).is_err());
    }

    #[test]
    fn branch_isolated_from_later_pushes() {
        let mut stack = ScopeStack::new();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            stack.push(*name, i as i32);
        }
        let branch = stack.branch();

        // five more, one of them shadowing a name the branch can see
        stack.push("b", 100);
        stack.push("d", 101);
        stack.push("e", 102);
        stack.push("f", 103);
        stack.push("g", 104);

        let mut call = ScopeStack::on_branch(branch.clone(), "\n");
        call.push("x", 7);
        assert_eq!(call.lookup("b"), Some((1, 1)));
        assert_eq!(call.lookup("d"), None);
        assert_eq!(call.lookup("g"), None);
        assert_eq!(call.lookup("x"), Some((3, 7)));
        assert_eq!(call.len(), 4);

        // a second invocation does not see the first one's bindings
        let other = ScopeStack::on_branch(branch, "\n");
        assert_eq!(other.lookup("x"), None);
        assert_eq!(stack.lookup("b"), Some((3, 100)));
    }

    #[test]
    fn branch_of_branch() {
        let mut stack = ScopeStack::new();
        stack.push("a", 1);
        let mut first = ScopeStack::on_branch(stack.branch(), "\n");
        first.push("b", 2);
        let mut second = ScopeStack::on_branch(first.branch(), "\n");
        first.push("a", 3);
        second.push("c", 4);
        assert_eq!(second.lookup("a"), Some((0, 1)));
        assert_eq!(second.lookup("b"), Some((1, 2)));
        assert_eq!(second.lookup("c"), Some((2, 4)));
        assert_eq!(first.lookup("a"), Some((2, 3)));
    }
}

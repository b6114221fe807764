//! Producing-operation record consumed by variable construction.
//!
//! The bookkeeping core never invokes a node's backward computation
//! (that is the backward-pass driver's job); it only reads the tracking
//! flags and claims output slots when internal variables are built.

use std::cell::Cell;
use std::rc::Rc;

/// Shared handle to the operation that produced a set of variables.
///
/// Many output variables point at one node; lifetime of the node
/// belongs to whoever owns the forward graph as a whole.
pub type FunctionRef = Rc<Function>;

/// Minimal graph-node record: output-slot counter plus the flags
/// internal variables inherit at construction.
#[derive(Debug, Default)]
pub struct Function {
    num_outputs: Cell<usize>,
    requires_grad: bool,
    is_volatile: bool,
}

impl Function {
    /// Create a shared node with the given tracking flags.
    pub fn new(requires_grad: bool, is_volatile: bool) -> FunctionRef {
        Rc::new(Self {
            num_outputs: Cell::new(0),
            requires_grad,
            is_volatile,
        })
    }

    /// Claim the next output slot.
    ///
    /// Indices are assigned monotonically in construction order, so
    /// callers must construct the outputs of one operation in a fixed,
    /// reproducible order.
    pub(crate) fn next_output_nr(&self) -> usize {
        let nr = self.num_outputs.get();
        self.num_outputs.set(nr + 1);
        nr
    }

    /// Number of output slots claimed so far.
    pub fn num_outputs(&self) -> usize {
        self.num_outputs.get()
    }

    /// Whether outputs of this node require gradient.
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Whether outputs of this node are exempt from graph tracking.
    pub fn is_volatile(&self) -> bool {
        self.is_volatile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_slots_are_monotonic() {
        let f = Function::new(true, false);
        assert_eq!(f.num_outputs(), 0);
        assert_eq!(f.next_output_nr(), 0);
        assert_eq!(f.next_output_nr(), 1);
        assert_eq!(f.next_output_nr(), 2);
        assert_eq!(f.num_outputs(), 3);
    }

    #[test]
    fn test_flags() {
        let f = Function::new(true, false);
        assert!(f.requires_grad());
        assert!(!f.is_volatile());

        let g = Function::new(false, true);
        assert!(!g.requires_grad());
        assert!(g.is_volatile());
    }

    #[test]
    fn test_shared_handle_sees_claims() {
        let f = Function::new(true, false);
        let alias = Rc::clone(&f);
        f.next_output_nr();
        assert_eq!(alias.num_outputs(), 1);
    }
}

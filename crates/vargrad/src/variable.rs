//! Differentiable value wrapper and the gradient-accumulation protocol.
//!
//! A [`Variable`] is either a *leaf* (user created, no producing
//! operation) or an *internal* value wired to the
//! [`Function`](crate::function::Function) that produced it. It owns the version counter guarding its data and,
//! once gradients flow, the running gradient sum. The backward-pass
//! driver deposits gradients through [`Variable::backward`] and
//! [`Variable::apply`]; the forward pass captures data for later use
//! through [`Variable::save`].

use crate::device::DeviceGuard;
use crate::error::AutogradError;
use crate::function::FunctionRef;
use crate::saved::SavedVariable;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use crate::version::VersionCounter;
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::rc::Rc;

/// Gradient transformation installed on a variable, run once per
/// incoming gradient before accumulation (gradient clipping, masking).
///
/// Hooks receive a reference and return a fresh value; they must not
/// retain and later mutate the incoming gradient behind the caller's
/// back.
pub type BackwardHook<T> = Box<dyn Fn(&Variable<T>) -> Variable<T>>;

/// Ordered gradient list exchanged with the backward-pass driver.
pub type VariableList<T> = Vec<Variable<T>>;

/// A tensor-carrying node in the computation graph.
pub struct Variable<T: Scalar> {
    data: DenseTensor<T>,
    requires_grad: bool,
    is_volatile: bool,
    version: VersionCounter,
    creator: Option<FunctionRef>,
    output_nr: usize,
    previous_functions: SmallVec<[(FunctionRef, usize); 1]>,
    grad: Option<Box<Variable<T>>>,
    backward_hook: Option<BackwardHook<T>>,
}

impl<T: Scalar> Variable<T> {
    /// Create a leaf variable from user data.
    ///
    /// No creator, output index fixed at 0, fresh version counter.
    ///
    /// # Errors
    ///
    /// [`AutogradError::MissingData`] if `data` is `None`.
    pub fn leaf(
        data: Option<DenseTensor<T>>,
        requires_grad: bool,
        is_volatile: bool,
    ) -> Result<Self, AutogradError> {
        let data = data.ok_or(AutogradError::MissingData)?;
        Ok(Self {
            data,
            requires_grad,
            is_volatile,
            version: VersionCounter::new(),
            creator: None,
            output_nr: 0,
            previous_functions: SmallVec::new(),
            grad: None,
            backward_hook: None,
        })
    }

    /// Create an internal variable produced by `creator`.
    ///
    /// Claims the creator's next output slot, inherits its
    /// `requires_grad`/`is_volatile` flags, and records the single
    /// predecessor edge `(creator, output_nr)`.
    ///
    /// # Errors
    ///
    /// [`AutogradError::MissingData`] if `data` is `None`; the
    /// creator's output counter is not advanced in that case.
    pub fn from_creator(
        data: Option<DenseTensor<T>>,
        creator: FunctionRef,
    ) -> Result<Self, AutogradError> {
        let data = data.ok_or(AutogradError::MissingData)?;
        let output_nr = creator.next_output_nr();
        let requires_grad = creator.requires_grad();
        let is_volatile = creator.is_volatile();
        let previous_functions = smallvec![(Rc::clone(&creator), output_nr)];
        Ok(Self {
            data,
            requires_grad,
            is_volatile,
            version: VersionCounter::new(),
            creator: Some(creator),
            output_nr,
            previous_functions,
            grad: None,
            backward_hook: None,
        })
    }

    /// The wrapped tensor data.
    pub fn data(&self) -> &DenseTensor<T> {
        &self.data
    }

    /// Mutable access to the wrapped tensor data.
    ///
    /// In-place mutation through this handle must be recorded with
    /// `self.version().increment()`; the save/unpack protocol relies
    /// on it.
    pub fn data_mut(&mut self) -> &mut DenseTensor<T> {
        &mut self.data
    }

    /// Whether this variable participates in gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Whether this variable is exempt from graph tracking.
    pub fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    /// Whether the underlying data lives on a CUDA device.
    pub fn is_cuda(&self) -> bool {
        self.data.is_cuda()
    }

    /// The mutation counter guarding this variable's data.
    pub fn version(&self) -> &VersionCounter {
        &self.version
    }

    /// The operation that produced this variable, if any.
    pub fn creator(&self) -> Option<&FunctionRef> {
        self.creator.as_ref()
    }

    /// Output slot this variable occupies on its creator.
    pub fn output_nr(&self) -> usize {
        self.output_nr
    }

    /// Predecessor edges feeding this variable.
    pub fn previous_functions(&self) -> &[(FunctionRef, usize)] {
        &self.previous_functions
    }

    /// Whether this variable is a leaf (has no producing operation).
    pub fn is_leaf(&self) -> bool {
        self.creator.is_none()
    }

    /// The accumulated gradient, if any has flowed yet.
    pub fn grad(&self) -> Option<&Variable<T>> {
        self.grad.as_deref()
    }

    /// Mutable access to the accumulated gradient.
    pub fn grad_mut(&mut self) -> Option<&mut Variable<T>> {
        self.grad.as_deref_mut()
    }

    /// Remove and return the accumulated gradient.
    pub fn take_grad(&mut self) -> Option<Variable<T>> {
        self.grad.take().map(|g| *g)
    }

    /// Install a backward hook, replacing any previous one.
    pub fn set_backward_hook(&mut self, hook: BackwardHook<T>) {
        self.backward_hook = Some(hook);
    }

    /// Remove and return the backward hook, if any.
    pub fn take_backward_hook(&mut self) -> Option<BackwardHook<T>> {
        self.backward_hook.take()
    }

    /// Deposit one incoming gradient into this variable.
    ///
    /// If a hook is installed the gradient is transformed first. The
    /// first gradient is adopted as an independent copy (the driver
    /// may reuse `grad_output`'s buffer afterwards), wrapped in a
    /// `requires_grad = false, is_volatile = true` leaf; subsequent
    /// gradients are summed in place into that buffer, consistent with
    /// the multivariate chain rule for values that fan out.
    ///
    /// # Errors
    ///
    /// [`TensorError::ShapeMismatch`] (through
    /// [`AutogradError::Tensor`]) if an incoming gradient's shape does
    /// not match the accumulated buffer.
    ///
    /// [`TensorError::ShapeMismatch`]: crate::error::TensorError::ShapeMismatch
    pub fn backward(&mut self, grad_output: &Variable<T>) -> Result<(), AutogradError> {
        let transformed = self.backward_hook.as_ref().map(|hook| hook(grad_output));
        let grad_output = transformed.as_ref().unwrap_or(grad_output);

        let _device = DeviceGuard::new(grad_output.data.device());

        match &mut self.grad {
            Some(grad) => grad.data.add_assign(&grad_output.data)?,
            None => {
                let adopted = Variable::leaf(Some(grad_output.data.clone()), false, true)?;
                self.grad = Some(Box::new(adopted));
            }
        }
        Ok(())
    }

    /// Leaf gradient-accumulator entry point.
    ///
    /// The backward-pass driver calls this as if the leaf were a
    /// zero-output graph node: exactly one gradient comes in, nothing
    /// flows further downstream.
    ///
    /// # Errors
    ///
    /// [`AutogradError::LeafUsedInplace`] if this variable has a
    /// creator or its data has been mutated in place since creation;
    /// a leaf whose storage was overwritten cannot safely receive a
    /// gradient. [`AutogradError::GradientArity`] unless exactly one
    /// gradient is given; fan-in normalization is the driver's job.
    pub fn apply(
        &mut self,
        grad_outputs: &[Variable<T>],
    ) -> Result<VariableList<T>, AutogradError> {
        if self.creator.is_some() || self.version.read() != 0 {
            return Err(AutogradError::LeafUsedInplace);
        }
        if grad_outputs.len() != 1 {
            return Err(AutogradError::GradientArity {
                actual: grad_outputs.len(),
            });
        }
        self.backward(&grad_outputs[0])?;
        Ok(VariableList::new())
    }

    /// Capture a snapshot of this variable's data for the backward
    /// pass.
    ///
    /// The snapshot holds a shallow clone of the data, the version
    /// observed now, and a read-only alias of the version counter;
    /// [`SavedVariable::unpack`] re-validates freshness at the point
    /// of use.
    pub fn save(&self) -> SavedVariable<T> {
        SavedVariable::new(
            self.data.clone_shallow(),
            self.version.read(),
            self.version.saved_ref(),
        )
    }

    /// Save an optional input uniformly: absent variables produce the
    /// empty snapshot, which unpacks to `None` without validation.
    pub fn save_opt(var: Option<&Variable<T>>) -> SavedVariable<T> {
        var.map_or_else(SavedVariable::empty, Self::save)
    }

    /// Copy of this value outside the graph: no creator, no edges, no
    /// gradient tracking.
    ///
    /// Shares storage with the original, but carries a fresh version
    /// counter; snapshots taken from the detached value are validated
    /// against mutations of the detached value only.
    pub fn detach(&self) -> Self {
        Self {
            data: self.data.clone_shallow(),
            requires_grad: false,
            is_volatile: self.is_volatile,
            version: VersionCounter::new(),
            creator: None,
            output_nr: 0,
            previous_functions: SmallVec::new(),
            grad: None,
            backward_hook: None,
        }
    }
}

impl<T: Scalar> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("data", &self.data)
            .field("requires_grad", &self.requires_grad)
            .field("is_volatile", &self.is_volatile)
            .field("version", &self.version.read())
            .field("output_nr", &self.output_nr)
            .field("is_leaf", &self.is_leaf())
            .field("has_grad", &self.grad.is_some())
            .field("has_backward_hook", &self.backward_hook.is_some())
            .finish()
    }
}

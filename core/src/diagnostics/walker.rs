use tracing::trace;

use crate::errors::RuntimeError;
use crate::vm::machine::CallInfoStack;

/// First frame worth reporting: the nearest scripted frame below the capture
/// point. The capture point is the innermost scripted frame; native frames
/// above it (including the capturing method itself) are transparent.
///
/// Returns `None` when nothing lies between the capture point and the base.
pub fn start(stack: &CallInfoStack) -> Option<usize> {
    let top = stack.top()?;
    let capture_point = (stack.base()..=top)
        .rev()
        .find(|&idx| stack.get(idx).is_some_and(|frame| !frame.is_native()))?;
    // A valid cursor by construction; advance cannot fail here.
    advance(stack, capture_point).ok().flatten()
}

/// Step from `current` toward the base, skipping native frames.
///
/// The base frame ends the walk and is never yielded. Fails with
/// [`RuntimeError::InvalidCursor`] when `current` is outside `[base, top]`.
pub fn advance(stack: &CallInfoStack, current: usize) -> Result<Option<usize>, RuntimeError> {
    stack.check_cursor(current)?;
    let base = stack.base();
    let mut idx = current;
    loop {
        if idx <= base {
            return Ok(None);
        }
        idx -= 1;
        if idx == base {
            return Ok(None);
        }
        match stack.get(idx) {
            Some(frame) if frame.is_native() => {
                trace!(index = idx, "skipping native frame");
            }
            Some(_) => return Ok(Some(idx)),
            None => return Ok(None),
        }
    }
}

/// Lazy, most-recent-first walk over the scripted frames below the capture point.
pub struct CallChain<'a> {
    stack: &'a CallInfoStack,
    next: Option<usize>,
}

impl<'a> CallChain<'a> {
    pub fn new(stack: &'a CallInfoStack) -> Self {
        Self {
            stack,
            next: start(stack),
        }
    }
}

impl Iterator for CallChain<'_> {
    type Item = Result<usize, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        match advance(self.stack, current) {
            Ok(next) => self.next = next,
            Err(err) => return Some(Err(err)),
        }
        Some(Ok(current))
    }
}

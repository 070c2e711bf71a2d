use crate::context::Context;
use crate::diagnostics::unwind::{self, UnavailableUnwinder};
use crate::runtime::output::Output;
use crate::vm::machine::DEFAULT_MAX_CALL_DEPTH;

/// Builder for interpreter contexts.
#[derive(Debug, Clone)]
pub struct Engine {
    max_call_depth: usize,
    debug_info: bool,
    native_unwind: bool,
    captured_output: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            debug_info: true,
            native_unwind: true,
            captured_output: false,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Emit line tables when compiling. Without them every frame reports line -1.
    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.debug_info = enabled;
        self
    }

    pub fn with_native_unwind(mut self, enabled: bool) -> Self {
        self.native_unwind = enabled;
        self
    }

    /// Keep script output in memory instead of writing to stdout.
    pub fn with_captured_output(mut self, captured: bool) -> Self {
        self.captured_output = captured;
        self
    }

    pub fn new_context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.set_debug_info(self.debug_info);

        let vm = ctx.vm_mut();
        vm.set_max_call_depth(self.max_call_depth);
        if self.native_unwind {
            vm.set_unwinder(unwind::default_unwinder());
        } else {
            vm.set_unwinder(Box::new(UnavailableUnwinder));
        }
        if self.captured_output {
            vm.set_output(Output::captured());
        }
        ctx
    }
}

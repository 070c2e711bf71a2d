use super::{ProcInfo, ProcName, Register, UnwindCursor, UnwindError, Unwinder};

/// Frames kept per snapshot. Deeper stacks are cut off.
const MAX_SNAPSHOT_FRAMES: usize = 128;

/// Unwinder backed by the platform unwinder through the `backtrace` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUnwinder;

impl SystemUnwinder {
    pub fn new() -> Self {
        Self
    }
}

impl Unwinder for SystemUnwinder {
    fn cursor(&self) -> Result<Box<dyn UnwindCursor + '_>, UnwindError> {
        let mut frames = Vec::new();
        backtrace::trace(|frame| {
            frames.push(frame.clone());
            frames.len() < MAX_SNAPSHOT_FRAMES
        });
        if frames.is_empty() {
            return Err(UnwindError::Unavailable);
        }
        Ok(Box::new(SystemCursor { frames, pos: 0 }))
    }
}

/// Cursor over an eagerly captured frame list; symbols resolve on demand.
struct SystemCursor {
    frames: Vec<backtrace::Frame>,
    pos: usize,
}

impl SystemCursor {
    fn frame(&self) -> &backtrace::Frame {
        &self.frames[self.pos]
    }

    fn symbol(&self) -> Option<(String, usize)> {
        let frame = self.frame();
        let mut found = None;
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let Some(name) = symbol.name() else {
                return;
            };
            let start = symbol
                .addr()
                .map_or(frame.symbol_address() as usize, |addr| addr as usize);
            let ip = frame.ip() as usize;
            found = Some((name.to_string(), ip.saturating_sub(start)));
        });
        found
    }
}

impl UnwindCursor for SystemCursor {
    fn register(&self, register: Register) -> Result<usize, UnwindError> {
        let value = match register {
            Register::Ip => self.frame().ip() as usize,
            Register::Sp => self.frame().sp() as usize,
        };
        if value == 0 && register == Register::Ip {
            return Err(UnwindError::NoRegister(register));
        }
        Ok(value)
    }

    fn proc_name(&self) -> Result<ProcName, UnwindError> {
        self.symbol()
            .map(|(name, offset)| ProcName { name, offset })
            .ok_or(UnwindError::NoProcName)
    }

    fn proc_info(&self) -> Result<ProcInfo, UnwindError> {
        let start_ip = self.frame().symbol_address() as usize;
        if start_ip == 0 {
            return Err(UnwindError::NoProcInfo);
        }
        Ok(ProcInfo { start_ip })
    }

    fn step(&mut self) -> Result<bool, UnwindError> {
        if self.pos + 1 >= self.frames.len() {
            return Ok(false);
        }
        self.pos += 1;
        Ok(true)
    }
}

use rbtrace::diagnostics::capture::{self, MAX_NATIVE_FRAMES, NATIVE_BANNER_CLOSE, NATIVE_BANNER_OPEN};
use rbtrace::diagnostics::unwind::{
    ProcInfo, ProcName, Register, UnavailableUnwinder, UnwindCursor, UnwindError, Unwinder,
};

/// Where a scripted cursor starts failing.
#[derive(Clone, Copy, Default)]
struct Faults {
    register_at: Option<usize>,
    proc_name_at: Option<usize>,
    proc_info_at: Option<usize>,
    step_at: Option<usize>,
}

struct ScriptedUnwinder {
    depth: usize,
    init_fails: bool,
    faults: Faults,
}

impl ScriptedUnwinder {
    fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            init_fails: false,
            faults: Faults::default(),
        }
    }
}

struct ScriptedCursor {
    pos: usize,
    depth: usize,
    faults: Faults,
}

impl Unwinder for ScriptedUnwinder {
    fn cursor(&self) -> Result<Box<dyn UnwindCursor + '_>, UnwindError> {
        if self.init_fails {
            return Err(UnwindError::Unavailable);
        }
        Ok(Box::new(ScriptedCursor {
            pos: 0,
            depth: self.depth,
            faults: self.faults,
        }))
    }
}

impl UnwindCursor for ScriptedCursor {
    fn register(&self, register: Register) -> Result<usize, UnwindError> {
        if self.faults.register_at == Some(self.pos) {
            return Err(UnwindError::NoRegister(register));
        }
        Ok(match register {
            Register::Ip => 0x1000 + self.pos * 0x10,
            Register::Sp => 0x7fff_0000 - self.pos * 0x40,
        })
    }

    fn proc_name(&self) -> Result<ProcName, UnwindError> {
        if self.faults.proc_name_at == Some(self.pos) {
            return Err(UnwindError::NoProcName);
        }
        Ok(ProcName {
            name: format!("frame_{}", self.pos),
            offset: self.pos,
        })
    }

    fn proc_info(&self) -> Result<ProcInfo, UnwindError> {
        if self.faults.proc_info_at == Some(self.pos) {
            return Err(UnwindError::NoProcInfo);
        }
        Ok(ProcInfo {
            start_ip: 0x1000 + self.pos * 0x10 - self.pos,
        })
    }

    fn step(&mut self) -> Result<bool, UnwindError> {
        if self.faults.step_at == Some(self.pos) {
            return Err(UnwindError::Step("corrupt frame".into()));
        }
        if self.pos + 1 >= self.depth {
            return Ok(false);
        }
        self.pos += 1;
        Ok(true)
    }
}

fn dump(unwinder: &dyn Unwinder) -> Vec<String> {
    let mut out = Vec::new();
    capture::print_native_trace(unwinder, &mut out).expect("write to Vec");
    String::from_utf8(out)
        .expect("utf8")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn shallow_stack_prints_every_frame_between_banners() {
    let lines = dump(&ScriptedUnwinder::with_depth(3));
    assert_eq!(
        lines,
        vec![
            NATIVE_BANNER_OPEN,
            "0x1000 <frame_0 + 0x0>",
            "0x1010 <frame_1 + 0x1>",
            "0x1020 <frame_2 + 0x2>",
            NATIVE_BANNER_CLOSE,
        ]
    );
}

#[test]
fn banners_have_the_expected_shape() {
    assert_eq!(NATIVE_BANNER_OPEN, "---- [backtrace] ---------------");
    assert_eq!(NATIVE_BANNER_CLOSE, "-".repeat(32));
}

#[test]
fn deep_stack_is_truncated() {
    let lines = dump(&ScriptedUnwinder::with_depth(200));
    assert_eq!(lines.len(), MAX_NATIVE_FRAMES + 2);
    assert_eq!(lines.first().map(String::as_str), Some(NATIVE_BANNER_OPEN));
    assert_eq!(lines.last().map(String::as_str), Some(NATIVE_BANNER_CLOSE));
    assert_eq!(lines[MAX_NATIVE_FRAMES], "0x13f0 <frame_63 + 0x3f>");
}

#[test]
fn stack_of_exactly_the_limit_is_printed_whole() {
    let lines = dump(&ScriptedUnwinder::with_depth(MAX_NATIVE_FRAMES));
    assert_eq!(lines.len(), MAX_NATIVE_FRAMES + 2);
}

#[test]
fn failed_initialisation_prints_nothing() {
    let unwinder = ScriptedUnwinder {
        init_fails: true,
        ..ScriptedUnwinder::with_depth(5)
    };
    assert!(dump(&unwinder).is_empty());
    assert!(dump(&UnavailableUnwinder).is_empty());
}

#[test]
fn unnamed_first_frame_prints_banners_only() {
    let unwinder = ScriptedUnwinder {
        faults: Faults {
            proc_name_at: Some(0),
            ..Faults::default()
        },
        ..ScriptedUnwinder::with_depth(5)
    };
    assert_eq!(dump(&unwinder), vec![NATIVE_BANNER_OPEN, NATIVE_BANNER_CLOSE]);
}

#[test]
fn register_failure_stops_the_dump() {
    let unwinder = ScriptedUnwinder {
        faults: Faults {
            register_at: Some(2),
            ..Faults::default()
        },
        ..ScriptedUnwinder::with_depth(5)
    };
    assert_eq!(dump(&unwinder).len(), 2 + 2);
}

#[test]
fn proc_info_failure_stops_the_dump() {
    let unwinder = ScriptedUnwinder {
        faults: Faults {
            proc_info_at: Some(1),
            ..Faults::default()
        },
        ..ScriptedUnwinder::with_depth(5)
    };
    assert_eq!(dump(&unwinder).len(), 1 + 2);
}

#[test]
fn step_failure_keeps_the_current_frame() {
    let unwinder = ScriptedUnwinder {
        faults: Faults {
            step_at: Some(0),
            ..Faults::default()
        },
        ..ScriptedUnwinder::with_depth(5)
    };
    assert_eq!(
        dump(&unwinder),
        vec![NATIVE_BANNER_OPEN, "0x1000 <frame_0 + 0x0>", NATIVE_BANNER_CLOSE]
    );
}

#[cfg(feature = "native-unwind")]
#[test]
fn system_unwinder_output_is_well_formed() {
    use rbtrace::diagnostics::unwind::SystemUnwinder;

    let lines = dump(&SystemUnwinder::new());
    if lines.is_empty() {
        return;
    }
    assert_eq!(lines.first().map(String::as_str), Some(NATIVE_BANNER_OPEN));
    assert_eq!(lines.last().map(String::as_str), Some(NATIVE_BANNER_CLOSE));
    assert!(lines.len() <= MAX_NATIVE_FRAMES + 2);
    for line in &lines[1..lines.len() - 1] {
        assert!(line.starts_with("0x"), "unexpected frame line {line}");
        assert!(line.contains(" <") && line.ends_with('>'), "unexpected frame line {line}");
    }
}

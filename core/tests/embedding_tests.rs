use std::fs;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use rbtrace::diagnostics::capture;
use rbtrace::{Context, Engine, RuntimeError, Value, Vm};

fn answer(_vm: &mut Vm, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    match args {
        [] => Ok(Value::Integer(42)),
        [Value::Integer(n)] => Ok(Value::Integer(n + 42)),
        _ => Err(RuntimeError::ArityMismatch {
            expected: 1,
            given: args.len(),
        }),
    }
}

fn trace_to_output(vm: &mut Vm, _recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    let entries = capture::capture_interpreter_trace(vm)?.unwrap_or_default();
    for entry in entries {
        writeln!(vm.output_mut(), "{entry}")?;
    }
    Ok(Value::Nil)
}

#[test]
fn engine_context_eval() {
    let mut ctx = Engine::new().with_captured_output(true).new_context();
    ctx.eval("puts \"hello\"").expect("eval should succeed");
    assert_eq!(ctx.output().lines(), vec!["hello"]);
}

#[test]
fn global_functions_are_callable_from_scripts() {
    let mut ctx = Engine::new().with_captured_output(true).new_context();
    ctx.define_global_function("answer", answer);
    assert_eq!(ctx.eval("answer").expect("run"), Value::Integer(42));
    assert_eq!(ctx.eval("answer(1)").expect("run"), Value::Integer(43));
}

#[test]
fn host_functions_can_capture_the_script_stack() {
    let mut ctx = Engine::new().with_captured_output(true).new_context();
    ctx.define_global_function("where_am_i", trace_to_output);
    let source = "class A\n  def a\n    b\n  end\n  def b\n    where_am_i\n  end\nend\nA.new.a";
    ctx.eval(source).expect("run");
    assert_eq!(ctx.output().lines(), vec!["\t-:3:in A#a"]);
}

#[test]
fn eval_file_uses_the_path_as_filename() {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be valid")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("rbtrace-embed-{unique}.rb"));
    fs::write(
        &path,
        "class A\n  def a\n    b\n  end\n  def b\n    Backtrace.backtrace\n  end\nend\ndef go\n  A.new.a\nend\ngo\n",
    )
    .expect("write script");

    let mut ctx = Context::new();
    let value = ctx.eval_file(&path).expect("run");
    let _ = fs::remove_file(&path);

    let file = path.display().to_string();
    assert_eq!(
        value,
        Value::Array(vec![
            Value::String(format!("\t{file}:3:in A#a")),
            Value::String(format!("\t{file}:10:in Object#go")),
        ])
    );
}

#[test]
fn eval_file_reports_missing_files() {
    let mut ctx = Context::new();
    let err = ctx
        .eval_file("/nonexistent/rbtrace/script.rb")
        .expect_err("file does not exist");
    assert!(matches!(
        err,
        rbtrace::RbError::Runtime(RuntimeError::Io(_))
    ));
}

#[test]
fn run_helper_evaluates_source() {
    let ctx = rbtrace::run("x = 1").expect("run");
    assert!(ctx.vm().call_info().is_empty());
}

#[test]
fn compile_follows_the_engine_debug_info_setting() {
    let mut ctx = Engine::new().with_debug_info(false).new_context();
    let irep = ctx.compile("def m\nend\nm", Some("unit.rb")).expect("compile");
    assert!(irep.lines.is_none());
    assert_eq!(irep.filename.as_deref(), Some("unit.rb"));
    assert_eq!(ctx.execute(irep).expect("execute"), Value::Nil);
}

use rbtrace::diagnostics::capture;
use rbtrace::{Context, Engine, Value};

const CHAIN: &str = r#"class C
  def c
    Backtrace.backtrace
  end
end

class B
  def b
    C.new.c
  end
end

class A
  def a
    B.new.b
  end
end

A.new.a
"#;

fn context() -> Context {
    Engine::new().with_captured_output(true).new_context()
}

fn strings(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => panic!("expected string entry, got {other:?}"),
            })
            .collect(),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn backtrace_lists_callers_most_recent_first() {
    let mut ctx = context();
    let value = ctx
        .eval_named(CHAIN, Some("capture.rb"))
        .expect("script should run");

    assert_eq!(
        strings(value),
        vec!["\tcapture.rb:9:in B#b", "\tcapture.rb:15:in A#a"]
    );
}

#[test]
fn put_rb_writes_header_and_frames() {
    let source = CHAIN.replace("Backtrace.backtrace", "Backtrace.put_rb");
    let mut ctx = context();
    let value = ctx
        .eval_named(&source, Some("capture.rb"))
        .expect("script should run");

    assert_eq!(value, Value::Nil);
    assert_eq!(
        ctx.output().text(),
        "backtrace:\n\tcapture.rb:9:in B#b\n\tcapture.rb:15:in A#a\n"
    );
}

#[test]
fn native_frames_between_scripted_frames_are_skipped() {
    let source = r#"class A
  def a
    send("b")
  end
  def b
    Backtrace.backtrace
  end
end
def run
  A.new.a
end
run
"#;
    let mut ctx = context();
    let value = ctx.eval(source).expect("script should run");

    assert_eq!(strings(value), vec!["\t-:3:in A#a", "\t-:10:in Object#run"]);
}

#[test]
fn class_methods_use_dot_separator() {
    let source = r#"class K
  def self.k
    Backtrace.backtrace
  end
end
class L
  def self.l
    K.k
  end
end
def top
  L.l
end
top
"#;
    let mut ctx = context();
    let value = ctx.eval(source).expect("script should run");

    assert_eq!(strings(value), vec!["\t-:8:in L.l", "\t-:12:in Object#top"]);
}

#[test]
fn class_body_frames_render_file_and_line() {
    let source = r#"class Foo
  def self.trace
    Backtrace.backtrace
  end
  trace
end
"#;
    let mut ctx = context();
    let value = ctx.eval(source).expect("script should run");

    assert_eq!(strings(value), vec!["\t-:5"]);
}

#[test]
fn inherited_methods_report_the_defining_class() {
    let source = r#"class Base
  def run
    step
  end
  def step
    Backtrace.backtrace
  end
end
class Child < Base
end
Child.new.run
"#;
    let mut ctx = context();
    let value = ctx.eval(source).expect("script should run");

    assert_eq!(strings(value), vec!["\t-:3:in Base#run"]);
}

#[test]
fn outermost_capture_returns_nil() {
    let mut ctx = context();
    assert_eq!(ctx.eval("Backtrace.backtrace").expect("run"), Value::Nil);

    let source = "def t\n  Backtrace.backtrace\nend\nt\n";
    assert_eq!(ctx.eval(source).expect("run"), Value::Nil);
}

#[test]
fn outermost_put_rb_prints_only_the_header() {
    let mut ctx = context();
    ctx.eval("Backtrace.put_rb").expect("run");
    assert_eq!(ctx.output().text(), "backtrace:\n");
}

#[test]
fn compiling_without_debug_info_reports_line_minus_one() {
    let mut ctx = Engine::new()
        .with_captured_output(true)
        .with_debug_info(false)
        .new_context();
    let value = ctx
        .eval_named(CHAIN, Some("capture.rb"))
        .expect("script should run");

    assert_eq!(
        strings(value),
        vec!["\tcapture.rb:-1:in B#b", "\tcapture.rb:-1:in A#a"]
    );
}

#[test]
fn unnamed_code_reports_unknown_file() {
    let mut ctx = context();
    let value = ctx.eval_named(CHAIN, None).expect("script should run");

    assert_eq!(
        strings(value),
        vec!["\t(unknown):9:in B#b", "\t(unknown):15:in A#a"]
    );
}

#[test]
fn capture_on_an_idle_vm_is_empty() {
    let ctx = context();
    assert_eq!(
        capture::capture_interpreter_trace(ctx.vm()).expect("capture"),
        None
    );

    let mut out = Vec::new();
    capture::print_interpreter_trace(ctx.vm(), &mut out).expect("print");
    assert_eq!(String::from_utf8(out).expect("utf8"), "backtrace:\n");
}

#[test]
fn put_vm_without_native_unwinding_writes_nothing() {
    let mut ctx = Engine::new()
        .with_captured_output(true)
        .with_native_unwind(false)
        .new_context();
    let value = ctx.eval("Backtrace.put_vm").expect("run");

    assert_eq!(value, Value::Nil);
    assert_eq!(ctx.output().text(), "");
}

#[test]
fn captured_entries_are_script_strings() {
    let source = r#"class A
  def a
    first = b
    second = b
    puts first.size
    puts second.first
    puts second.last
  end
  def b
    Backtrace.backtrace
  end
end
def outer
  A.new.a
end
outer
"#;
    let mut ctx = context();
    ctx.eval(source).expect("script should run");

    assert_eq!(
        ctx.output().lines(),
        vec!["2", "\t-:4:in A#a", "\t-:14:in Object#outer"]
    );
}

#[test]
fn call_stack_is_unchanged_after_capture() {
    let mut ctx = context();
    ctx.eval_named(CHAIN, Some("capture.rb")).expect("run");
    assert!(ctx.vm().call_info().is_empty());
}

#[test]
fn repeated_capture_at_one_point_is_identical() {
    let source = r#"class A
  def a
    b
  end
  def b
    first = Backtrace.backtrace
    second = Backtrace.backtrace
    p first, second
  end
end
def outer
  A.new.a
end
outer
"#;
    let mut ctx = context();
    let value = ctx.eval(source).expect("script should run");

    let Value::Array(mut pair) = value else {
        panic!("expected both captures, got {value:?}");
    };
    assert_eq!(pair.len(), 2);
    let second = strings(pair.pop().expect("second capture"));
    let first = strings(pair.pop().expect("first capture"));
    assert_eq!(first, vec!["\t-:3:in A#a", "\t-:12:in Object#outer"]);
    assert_eq!(first, second);

    let printed = ctx.output().lines();
    assert_eq!(printed.len(), 2);
    assert_eq!(printed[0], printed[1]);
}

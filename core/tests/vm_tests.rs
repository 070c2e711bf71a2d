use rbtrace::vm::compiler::CompileOptions;
use rbtrace::{Context, Engine, RbError, RuntimeError, Value, Vm};

fn context() -> Context {
    Engine::new().with_captured_output(true).new_context()
}

fn run_output(source: &str) -> Vec<String> {
    let mut ctx = context();
    ctx.eval(source).expect("script should run");
    ctx.output().lines()
}

fn runtime_error(source: &str) -> RuntimeError {
    let mut ctx = context();
    match ctx.eval(source) {
        Err(RbError::Runtime(err)) => err,
        other => panic!("expected runtime error, got {other:?}"),
    }
}

#[test]
fn puts_and_p_write_to_the_output_sink() {
    let output = run_output("puts 1, \"two\"\np \"three\"\nputs\nputs nil");
    assert_eq!(output, vec!["1", "two", "\"three\"", "", ""]);
}

#[test]
fn methods_receive_arguments_as_locals() {
    let source = r#"class Greeter
  def greet(name, punct)
    puts name
    puts punct
  end
end
Greeter.new.greet("hi", "!")
"#;
    assert_eq!(run_output(source), vec!["hi", "!"]);
}

#[test]
fn last_statement_is_the_result() {
    let mut ctx = context();
    assert_eq!(ctx.eval("x = 4\ny = 5\nx").expect("run"), Value::Integer(4));
}

#[test]
fn class_reopening_adds_methods() {
    let source = r#"class A
  def one
    1
  end
end
class A
  def two
    2
  end
end
a = A.new
puts a.one, a.two
"#;
    assert_eq!(run_output(source), vec!["1", "2"]);
}

#[test]
fn subclasses_inherit_instance_methods() {
    let source = r#"class Base
  def hello
    "hello"
  end
end
class Child < Base
end
puts Child.new.hello
puts Child.name
puts Child.new.class.name
"#;
    assert_eq!(run_output(source), vec!["hello", "Child", "Child"]);
}

#[test]
fn send_dispatches_by_name_with_arguments() {
    let source = r#"class A
  def echo(x)
    x
  end
end
puts A.new.send("echo", 42)
"#;
    assert_eq!(run_output(source), vec!["42"]);
}

#[test]
fn array_builtins() {
    let source = "a = p(1, 2, 3)\nputs a.size, a.first, a.last";
    assert_eq!(run_output(source), vec!["1", "2", "3", "3", "1", "3"]);
}

#[test]
fn undefined_method_is_reported() {
    let err = runtime_error("class A\nend\nA.new.missing");
    assert!(matches!(err, RuntimeError::NoMethod { ref name, .. } if name == "missing"));
}

#[test]
fn undefined_constant_is_reported() {
    let err = runtime_error("Nope.new");
    assert!(matches!(err, RuntimeError::UninitializedConstant { ref name } if name == "Nope"));
}

#[test]
fn wrong_argument_count_is_reported() {
    let err = runtime_error("def two(a, b)\nend\ntwo(1)");
    assert!(matches!(
        err,
        RuntimeError::ArityMismatch {
            expected: 2,
            given: 1
        }
    ));
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let mut ctx = Engine::new()
        .with_captured_output(true)
        .with_max_call_depth(64)
        .new_context();
    let err = ctx.eval("def f\n  f\nend\nf").expect_err("unbounded recursion");
    assert!(matches!(err, RbError::Runtime(RuntimeError::StackTooDeep { .. })));
    assert!(ctx.vm().call_info().is_empty());
}

#[test]
fn errors_unwind_the_call_stack() {
    let mut ctx = context();
    let source = "class A\n  def a\n    send(\"b\")\n  end\n  def b\n    boom\n  end\nend\nA.new.a";
    assert!(ctx.eval(source).is_err());
    assert!(ctx.vm().call_info().is_empty());

    // The context stays usable.
    assert_eq!(ctx.eval("1").expect("run"), Value::Integer(1));
}

#[test]
fn superclass_mismatch_is_rejected() {
    let err = runtime_error("class A\nend\nclass B\nend\nclass C < A\nend\nclass C < B\nend");
    assert!(matches!(err, RuntimeError::TypeError { ref message } if message.contains("superclass mismatch")));
}

#[test]
fn modules_cannot_be_instantiated() {
    let err = runtime_error("module M\nend\nM.new");
    assert!(matches!(err, RuntimeError::NoMethod { ref name, .. } if name == "new"));
}

#[test]
fn syntax_errors_surface_before_running() {
    let mut ctx = context();
    let err = ctx.eval("puts 1\nclass").expect_err("incomplete class");
    assert!(matches!(err, RbError::Syntax(_)));
    assert!(ctx.output().lines().is_empty());
}

#[test]
fn compile_records_filename_and_lines() {
    let mut vm = Vm::new();
    let options = CompileOptions {
        filename: Some("unit.rb".into()),
        debug_info: true,
    };
    let irep = vm.compile("def m\n  1\nend\nm", options).expect("compile");
    assert_eq!(irep.filename.as_deref(), Some("unit.rb"));
    assert_eq!(irep.lines.as_ref().map(Vec::len), Some(irep.iseq.len()));
    assert_eq!(irep.reps.len(), 1);
    assert_eq!(irep.reps[0].filename.as_deref(), Some("unit.rb"));

    let listing = irep.disassemble(vm.symbols());
    assert!(listing.contains("Def m"));
    assert!(listing.contains("Send :m argc=0"));
}

#[test]
fn compile_without_debug_info_drops_line_tables() {
    let mut vm = Vm::new();
    let options = CompileOptions {
        filename: None,
        debug_info: false,
    };
    let irep = vm.compile("class A\n  def a\n  end\nend", options).expect("compile");
    assert!(irep.lines.is_none());
    assert!(irep.reps.iter().all(|rep| rep.lines.is_none()));
}

fn assignments(count: usize) -> String {
    let mut source: String = (0..count).map(|i| format!("x = \"s{i}\"\n")).collect();
    source.push('x');
    source
}

#[test]
fn full_string_pool_still_addresses_every_literal() {
    let mut ctx = context();
    let value = ctx.eval(&assignments(65536)).expect("script should run");
    assert_eq!(value, Value::String("s65535".into()));
}

#[test]
fn string_pool_overflow_is_a_syntax_error() {
    let mut vm = Vm::new();
    match vm.compile(&assignments(65537), CompileOptions::default()) {
        Err(RbError::Syntax(err)) => {
            assert_eq!(err.message, "too many string literals");
            assert_eq!(err.line, 65537);
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn method_body_overflow_is_a_syntax_error() {
    let source: String = (0..65537).map(|i| format!("def m{i}\nend\n")).collect();
    let mut vm = Vm::new();
    match vm.compile(&source, CompileOptions::default()) {
        Err(RbError::Syntax(err)) => assert_eq!(err.message, "too many class and method bodies"),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

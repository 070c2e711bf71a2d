use std::io::Write;

use crate::errors::RuntimeError;
use crate::vm::Vm;
use crate::vm::bytecode::Value;

/// Core methods every fresh VM starts with.
pub(crate) fn install(vm: &mut Vm) {
    let core = vm.classes().core();

    vm.define_native(core.object, "puts", object_puts, false);
    vm.define_native(core.object, "p", object_p, false);
    vm.define_native(core.object, "send", object_send, false);
    vm.define_native(core.object, "class", object_class, false);

    vm.define_native(core.class, "new", class_new, false);
    vm.define_native(core.class, "name", class_name, false);

    vm.define_native(core.array, "size", array_size, false);
    vm.define_native(core.array, "first", array_first, false);
    vm.define_native(core.array, "last", array_last, false);
}

fn expect_args(args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            expected,
            given: args.len(),
        })
    }
}

fn object_puts(vm: &mut Vm, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let mut lines = Vec::new();
    for arg in args {
        match arg {
            Value::Array(items) => {
                lines.extend(items.iter().map(|item| item.to_output(vm.classes())));
            }
            other => lines.push(other.to_output(vm.classes())),
        }
    }
    if args.is_empty() {
        lines.push(String::new());
    }

    let out = vm.output_mut();
    for line in lines {
        if line.ends_with('\n') {
            out.write_all(line.as_bytes())?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    Ok(Value::Nil)
}

fn object_p(vm: &mut Vm, _recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let lines: Vec<String> = args.iter().map(|arg| arg.inspect(vm.classes())).collect();
    let out = vm.output_mut();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(match args {
        [] => Value::Nil,
        [single] => single.clone(),
        many => Value::Array(many.to_vec()),
    })
}

fn object_send(vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    let Some((name, rest)) = args.split_first() else {
        return Err(RuntimeError::ArityMismatch {
            expected: 1,
            given: 0,
        });
    };
    let Value::String(name) = name else {
        return Err(RuntimeError::type_error(format!(
            "{} is not a method name",
            name.inspect(vm.classes())
        )));
    };
    let mid = vm.intern(name);
    vm.funcall(recv, mid, rest)
}

fn object_class(vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_args(args, 0)?;
    Ok(Value::Class(recv.class_of(vm.classes())))
}

fn class_new(vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_args(args, 0)?;
    let Value::Class(class) = recv else {
        return Err(RuntimeError::type_error("new called on a non-class"));
    };
    if vm.classes().get(class).is_some_and(|c| c.is_module) {
        return Err(RuntimeError::NoMethod {
            name: "new".to_string(),
            receiver: recv.inspect(vm.classes()),
        });
    }
    Ok(Value::Object(class))
}

fn class_name(vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_args(args, 0)?;
    let name = match recv {
        Value::Class(class) => vm.classes().name(class).map(str::to_string),
        _ => None,
    };
    Ok(name.map_or(Value::Nil, Value::String))
}

fn array_items(recv: &Value) -> Result<&[Value], RuntimeError> {
    match recv {
        Value::Array(items) => Ok(items),
        _ => Err(RuntimeError::type_error("receiver is not an Array")),
    }
}

fn array_size(_vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_args(args, 0)?;
    Ok(Value::Integer(array_items(&recv)?.len() as i64))
}

fn array_first(_vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_args(args, 0)?;
    Ok(array_items(&recv)?.first().cloned().unwrap_or(Value::Nil))
}

fn array_last(_vm: &mut Vm, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_args(args, 0)?;
    Ok(array_items(&recv)?.last().cloned().unwrap_or(Value::Nil))
}

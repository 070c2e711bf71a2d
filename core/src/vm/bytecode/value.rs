use crate::runtime::class::{ClassId, ClassTable};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Integer(i64),
    String(String),
    Array(Vec<Value>),
    /// A class or module object.
    Class(ClassId),
    /// An instance with no state of its own.
    Object(ClassId),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Class used for instance method dispatch.
    pub fn class_of(&self, classes: &ClassTable) -> ClassId {
        let core = classes.core();
        match self {
            Value::Nil => core.nil,
            Value::Integer(_) => core.integer,
            Value::String(_) => core.string,
            Value::Array(_) => core.array,
            Value::Class(_) => core.class,
            Value::Object(class) => *class,
        }
    }

    /// `to_s` conversion used by `puts`.
    pub fn to_output(&self, classes: &ClassTable) -> String {
        match self {
            Value::Nil => String::new(),
            Value::Integer(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Class(_) | Value::Object(_) | Value::Array(_) => self.inspect(classes),
        }
    }

    /// `inspect` conversion used by `p`.
    pub fn inspect(&self, classes: &ClassTable) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Integer(n) => n.to_string(),
            Value::String(s) => format!("{s:?}"),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.inspect(classes)).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Class(id) => classes.name(*id).unwrap_or("#<Class>").to_string(),
            Value::Object(id) => format!("#<{}>", classes.name(*id).unwrap_or("Object")),
        }
    }
}

use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::symbol::Sym;
use crate::vm::machine::Proc;

/// Index of a class in the VM's class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub struct RClass {
    /// `None` for anonymous classes.
    pub name: Option<String>,
    pub superclass: Option<ClassId>,
    pub is_module: bool,
    pub methods: HashMap<Sym, Rc<Proc>>,
    pub class_methods: HashMap<Sym, Rc<Proc>>,
}

/// Classes created by the builtins; always present in a fresh table.
#[derive(Debug, Clone, Copy)]
pub struct CoreClasses {
    pub object: ClassId,
    pub class: ClassId,
    pub nil: ClassId,
    pub integer: ClassId,
    pub string: ClassId,
    pub array: ClassId,
}

#[derive(Debug)]
pub struct ClassTable {
    classes: Vec<RClass>,
    constants: HashMap<String, ClassId>,
    core: CoreClasses,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    pub fn new() -> Self {
        let mut table = Self {
            classes: Vec::new(),
            constants: HashMap::new(),
            core: CoreClasses {
                object: ClassId(0),
                class: ClassId(0),
                nil: ClassId(0),
                integer: ClassId(0),
                string: ClassId(0),
                array: ClassId(0),
            },
        };
        let object = table.define(Some("Object"), None, false);
        table.core = CoreClasses {
            object,
            class: table.define(Some("Class"), Some(object), false),
            nil: table.define(Some("NilClass"), Some(object), false),
            integer: table.define(Some("Integer"), Some(object), false),
            string: table.define(Some("String"), Some(object), false),
            array: table.define(Some("Array"), Some(object), false),
        };
        table
    }

    pub fn core(&self) -> CoreClasses {
        self.core
    }

    /// Create a class; named classes are also registered as constants.
    pub fn define(
        &mut self,
        name: Option<&str>,
        superclass: Option<ClassId>,
        is_module: bool,
    ) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(RClass {
            name: name.map(str::to_string),
            superclass,
            is_module,
            methods: HashMap::new(),
            class_methods: HashMap::new(),
        });
        if let Some(name) = name {
            self.constants.insert(name.to_string(), id);
        }
        id
    }

    pub fn get(&self, id: ClassId) -> Option<&RClass> {
        self.classes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ClassId) -> Option<&mut RClass> {
        self.classes.get_mut(id.index())
    }

    pub fn constant(&self, name: &str) -> Option<ClassId> {
        self.constants.get(name).copied()
    }

    /// Display name of a class, `None` when anonymous or unknown.
    pub fn name(&self, id: ClassId) -> Option<&str> {
        self.get(id).and_then(|class| class.name.as_deref())
    }

    pub fn define_method(&mut self, id: ClassId, mid: Sym, proc: Rc<Proc>) {
        if let Some(class) = self.get_mut(id) {
            class.methods.insert(mid, proc);
        }
    }

    pub fn define_class_method(&mut self, id: ClassId, mid: Sym, proc: Rc<Proc>) {
        if let Some(class) = self.get_mut(id) {
            class.class_methods.insert(mid, proc);
        }
    }

    /// Instance method lookup along the superclass chain. Returns the owner.
    pub fn find_method(&self, start: ClassId, mid: Sym) -> Option<(ClassId, Rc<Proc>)> {
        self.ancestors(start)
            .find_map(|(id, class)| class.methods.get(&mid).map(|p| (id, p.clone())))
    }

    /// Class (singleton) method lookup along the superclass chain.
    pub fn find_class_method(&self, start: ClassId, mid: Sym) -> Option<(ClassId, Rc<Proc>)> {
        self.ancestors(start)
            .find_map(|(id, class)| class.class_methods.get(&mid).map(|p| (id, p.clone())))
    }

    fn ancestors(&self, start: ClassId) -> impl Iterator<Item = (ClassId, &RClass)> {
        let mut next = Some(start);
        std::iter::from_fn(move || {
            let id = next?;
            let class = self.get(id)?;
            next = class.superclass;
            Some((id, class))
        })
    }
}

// ABOUTME: Lexically-scoped, parent-chained environment with declare-once bindings

use crate::error::InterpreterError;
use crate::value::{SectionValue, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct Cell {
    value: RefCell<Value>,
    mutable: bool,
}

/// A lexical scope. Declaring a name that already exists in *this* scope is a
/// `NameError`; shadowing a name from an enclosing scope by declaring a new one in a
/// child scope is fine. `set` walks up the parent chain and fails on immutable cells.
pub struct Environment {
    bindings: RefCell<HashMap<String, Cell>>,
    sections: RefCell<HashMap<String, Rc<SectionValue>>>,
    parent: Option<Rc<Environment>>,
    io_handle: RefCell<Option<Rc<crate::io_handle::IoHandle>>>,
}

impl Environment {
    pub fn root() -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            sections: RefCell::new(HashMap::new()),
            parent: None,
            io_handle: RefCell::new(None),
        })
    }

    pub fn child(parent: &Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            sections: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
            io_handle: RefCell::new(None),
        })
    }

    /// Declares `name` in this scope. Fails if `name` is already declared *in this
    /// scope* (shadowing an outer scope's binding is allowed).
    pub fn declare(&self, name: String, value: Value, mutable: bool) -> Result<(), InterpreterError> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(&name) {
            return Err(InterpreterError::name(
                format!("{name} is already declared in this scope"),
                0,
                0,
            ));
        }
        bindings.insert(name, Cell { value: RefCell::new(value), mutable });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(cell) = self.bindings.borrow().get(name) {
            return Some(cell.value.borrow().clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Reassigns an existing binding, walking the parent chain. Fails with a
    /// `NameError` if undeclared, or a `NameError` if the binding was declared
    /// immutable.
    pub fn set(&self, name: &str, value: Value) -> Result<(), InterpreterError> {
        if let Some(cell) = self.bindings.borrow().get(name) {
            if !cell.mutable {
                return Err(InterpreterError::name(format!("{name} is not mutable"), 0, 0));
            }
            *cell.value.borrow_mut() = value;
            return Ok(());
        }
        match &self.parent {
            Some(p) => p.set(name, value),
            None => Err(InterpreterError::undefined(name, 0, 0)),
        }
    }

    /// Registers a top-level `section` statement. Subject to the same declare-once
    /// discipline as variable bindings.
    pub fn declare_section(&self, name: String, section: SectionValue) -> Result<(), InterpreterError> {
        let mut sections = self.sections.borrow_mut();
        if sections.contains_key(&name) {
            return Err(InterpreterError::name(format!("section {name} is already declared"), 0, 0));
        }
        sections.insert(name, Rc::new(section));
        Ok(())
    }

    pub fn get_section(&self, name: &str) -> Option<Rc<SectionValue>> {
        self.sections.borrow().get(name).cloned()
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.borrow().keys().cloned().collect()
    }

    pub fn set_io_handle(&self, handle: Rc<crate::io_handle::IoHandle>) {
        *self.io_handle.borrow_mut() = Some(handle);
    }

    /// The nearest I/O handle in the scope chain, if any was injected.
    pub fn io_handle(&self) -> Option<Rc<crate::io_handle::IoHandle>> {
        if let Some(h) = self.io_handle.borrow().as_ref() {
            return Some(h.clone());
        }
        self.parent.as_ref().and_then(|p| p.io_handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    #[test]
    fn declare_then_get_round_trips() {
        let env = Environment::root();
        env.declare("x".into(), int(5), false).unwrap();
        assert!(env.get("x").unwrap().equals(&int(5)));
    }

    #[test]
    fn redeclaring_in_same_scope_is_a_name_error() {
        let env = Environment::root();
        env.declare("x".into(), int(1), false).unwrap();
        let err = env.declare("x".into(), int(2), false).unwrap_err();
        assert!(matches!(err, InterpreterError::Name { .. }));
    }

    #[test]
    fn child_scope_can_shadow_parent_binding() {
        let parent = Environment::root();
        parent.declare("x".into(), int(1), false).unwrap();
        let child = Environment::child(&parent);
        child.declare("x".into(), int(2), false).unwrap();
        assert!(child.get("x").unwrap().equals(&int(2)));
        assert!(parent.get("x").unwrap().equals(&int(1)));
    }

    #[test]
    fn child_scope_sees_parent_bindings() {
        let parent = Environment::root();
        parent.declare("x".into(), int(1), false).unwrap();
        let child = Environment::child(&parent);
        assert!(child.get("x").unwrap().equals(&int(1)));
    }

    #[test]
    fn set_on_immutable_binding_fails() {
        let env = Environment::root();
        env.declare("x".into(), int(1), false).unwrap();
        assert!(env.set("x", int(2)).is_err());
    }

    #[test]
    fn set_on_mutable_binding_through_parent_chain() {
        let parent = Environment::root();
        parent.declare("x".into(), int(1), true).unwrap();
        let child = Environment::child(&parent);
        child.set("x", int(9)).unwrap();
        assert!(parent.get("x").unwrap().equals(&int(9)));
    }

    #[test]
    fn undefined_get_returns_none() {
        let env = Environment::root();
        assert!(env.get("missing").is_none());
    }

    #[test]
    fn sections_cannot_be_redeclared() {
        use crate::ast::Block;
        let env = Environment::root();
        let body = Block { statements: vec![] };
        env.declare_section("input".into(), SectionValue { body: body.clone(), env: env.clone() }).unwrap();
        let err = env.declare_section("input".into(), SectionValue { body, env: env.clone() }).unwrap_err();
        assert!(matches!(err, InterpreterError::Name { .. }));
    }
}

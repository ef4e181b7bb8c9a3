//! Lexical environments: parent-linked frames of name bindings.
//!
//! Frames are shared, not owned: the evaluation that creates a frame and
//! every closure that captures it see the same bindings. That sharing is
//! what lets `letrec` tie recursive knots — the closures stored in a
//! frame capture the frame itself. Frames in such a cycle stay allocated
//! until the process exits; see DESIGN.md.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::number;
use crate::value::Value;

/// One scope level plus an optional link to its enclosing scope.
///
/// Cloning an `Environment` clones the handle, not the frame.
#[derive(Clone, Default)]
pub struct Environment {
    inner: Rc<RefCell<Frame>>,
}

#[derive(Default)]
struct Frame {
    bindings: HashMap<String, Value>,
    outer: Option<Environment>,
}

impl Environment {
    /// A fresh top-level frame with no enclosing scope.
    pub fn new() -> Self {
        Environment::default()
    }

    /// A fresh frame nested inside `parent`.
    pub fn with_parent(parent: &Environment) -> Self {
        Environment {
            inner: Rc::new(RefCell::new(Frame {
                bindings: HashMap::new(),
                outer: Some(parent.clone()),
            })),
        }
    }

    /// Whether this is the top-level frame. Gates `define`.
    pub fn is_top_level(&self) -> bool {
        self.inner.borrow().outer.is_none()
    }

    /// Bind `name` in this frame, overwriting any existing binding here.
    /// Bindings in outer frames are shadowed, never modified.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.inner.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Look `name` up through the frame chain, innermost first.
    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.inner.borrow();
        match frame.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => frame.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    /// Frame identity. Closure equality uses this rather than comparing
    /// contents, which could cycle back through the closure itself.
    pub fn ptr_eq(a: &Environment, b: &Environment) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Every binding visible from this frame, innermost frame winning,
    /// sorted by name. Used by the REPL's `:env` command.
    pub fn all_bindings(&self) -> Vec<(String, Value)> {
        let mut bindings = HashMap::new();
        self.collect_bindings(&mut bindings);

        let mut result: Vec<_> = bindings.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    fn collect_bindings(&self, into: &mut HashMap<String, Value>) {
        let frame = self.inner.borrow();
        // Outer bindings first so inner ones overwrite them.
        if let Some(outer) = &frame.outer {
            outer.collect_bindings(into);
        }
        for (name, value) in &frame.bindings {
            into.insert(name.clone(), value.clone());
        }
    }
}

impl fmt::Debug for Environment {
    // Binding values can hold closures that point back at this frame, so
    // only the local names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.inner.borrow();
        let mut names: Vec<&String> = frame.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("top_level", &frame.outer.is_none())
            .finish()
    }
}

/// A top-level environment pre-loaded with the numeric library.
pub fn create_global_env() -> Environment {
    let env = Environment::new();
    for &(name, func) in number::BUILTINS {
        env.define(name, Value::BuiltInProc { name, func });
    }
    env
}

use std::fmt;
use std::rc::Rc;

use crate::environment::prelude::Context;
use crate::parser::prelude::Node;

/// A user-defined function value. The captured defining context is held
/// strongly so the lexical home outlives the call that created it.
pub struct UserFunction {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub returns_null: bool,
    pub defining_context: Rc<Context>,
}

impl UserFunction {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserFunction({})", self.display_name())
    }
}

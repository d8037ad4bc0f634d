use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::utils::prelude::Position;
use super::symbol_table::SymbolTable;

/// Invocations deeper than this fail with a reported runtime error instead
/// of exhausting the host stack.
pub const MAX_CALL_DEPTH: usize = 256;

/// A call frame. `parent` follows call sites (traceback ancestry), while the
/// owned scope's parent follows the defining context (lexical ancestry); the
/// two chains are deliberately distinct.
pub struct Context {
    pub display_name: String,
    pub parent: Option<Rc<Context>>,
    pub parent_entry_pos: Option<Position>,
    pub scope: Rc<RefCell<SymbolTable>>,
    pub depth: usize,
}

impl Context {
    pub fn global(display_name: &str, scope: SymbolTable) -> Rc<Self> {
        Rc::new(Self {
            display_name: display_name.to_string(),
            parent: None,
            parent_entry_pos: None,
            scope: Rc::new(RefCell::new(scope)),
            depth: 0,
        })
    }

    pub fn frame(
        display_name: &str,
        parent: Rc<Context>,
        entry_pos: Position,
        scope: SymbolTable
    ) -> Rc<Self> {
        let depth = parent.depth + 1;

        Rc::new(Self {
            display_name: display_name.to_string(),
            parent: Some(parent),
            parent_entry_pos: Some(entry_pos),
            scope: Rc::new(RefCell::new(scope)),
            depth,
        })
    }
}

// Contexts link back to themselves through captured closures; the derived
// Debug would recurse forever.
impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({}, depth {})", self.display_name, self.depth)
    }
}

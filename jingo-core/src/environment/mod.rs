pub mod symbol_table;
pub mod context;

pub mod prelude {
    pub use super::{
        symbol_table::*,
        context::*
    };
}

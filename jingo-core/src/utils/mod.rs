pub mod diagnostic;
pub mod position;
pub mod error;

pub mod prelude {
    pub use super::{
        diagnostic::*,
        position::*,
        error::*
    };
}

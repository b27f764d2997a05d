mod cell;
mod gc;
mod objects;
mod pool;
mod runtime;
mod signature;
mod strings;
mod visitor;

pub use cell::*;
pub use gc::GcStats;
pub use objects::*;
pub use pool::*;
pub use runtime::*;
pub use signature::*;
pub use strings::*;
pub use visitor::{Visitable, Visitor};

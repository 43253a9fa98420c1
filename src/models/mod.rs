pub mod evidence;
pub mod item;
pub mod loan;

pub use evidence::*;
pub use item::*;
pub use loan::*;

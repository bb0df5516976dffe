pub mod speech;
pub mod timer;

pub use speech::*;
pub use timer::*;

pub mod announcer;
pub mod highlighter;
pub mod locator;
pub mod marker;
pub mod matcher;
pub mod term_index;
pub mod cortex;

pub use announcer::*;
pub use highlighter::*;
pub use locator::*;
pub use marker::*;
pub use matcher::*;
pub use term_index::*;
pub use cortex::*;

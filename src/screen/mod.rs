pub mod definition;
pub mod interpreter;

pub use definition::{LineKind, ProjectRef, ScreenDefinition, ScreenLine};
pub use interpreter::{BuiltScreen, ScreenInterpreter};

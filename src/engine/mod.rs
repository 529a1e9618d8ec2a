pub mod change;
pub mod cortex;
pub mod substitute;
pub mod trigger;
pub mod widget;

#[cfg(test)]
mod tests;

pub use change::*;
pub use cortex::*;
pub use substitute::*;
pub use trigger::*;
pub use widget::*;

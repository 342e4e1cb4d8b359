pub mod controller;
pub mod editor;
pub mod input;
pub mod mutation;
pub mod shortcuts;

pub use controller::{GesturePhase, InteractionConfig, InteractionController, SnapIndicator};
pub use editor::{HistorySink, SlideEditor};
pub use input::{InputEvent, Modifiers};
pub use mutation::{LayerMutation, apply_mutation};
pub use shortcuts::{ShortcutAction, ShortcutMap};

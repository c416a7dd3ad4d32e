pub mod activations;
pub mod layers;
pub mod loss;
mod model;
mod sequential;

pub use model::{Mode, Model, ModeGuard};
pub use sequential::Sequential;

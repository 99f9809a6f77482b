//! Run configuration: the action inputs and transport settings.

pub mod inputs;
pub mod settings;

pub use inputs::ActionInputs;
pub use settings::HttpSettings;

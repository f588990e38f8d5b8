pub mod generation;
pub mod placeholder;
pub mod record;
pub mod template;

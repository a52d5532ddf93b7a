pub mod background_loader;
pub mod background_resolver;
pub mod compositor;

pub mod background_spec;

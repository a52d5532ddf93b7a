pub mod chroma_keyer;
pub mod color_classifier;
pub mod edge_refiner;
mod gaussian;
pub mod matte_generator;
mod morphology;
pub mod spill_suppressor;

pub mod emotion;
pub mod features;
pub mod providers;
pub mod recommendations;
pub mod scoring;
pub mod selection;
pub mod text;

pub use recommendations::Recommender;

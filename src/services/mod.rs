pub mod analysis;
pub mod llm;
pub mod metadata;
pub mod providers;
pub mod recommendations;

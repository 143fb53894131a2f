//! Text processing, extraction and matching

pub mod text_processor;
pub mod experience;
pub mod entities;
pub mod extraction;
pub mod gazetteer;
pub mod embeddings;
pub mod skill_gap;
pub mod pipeline;

//! draftscope - corpus-aware writing assistant
//!
//! Mines a corpus of past texts for topics and keywords, flags weak
//! sentences in a draft, refines phrase suggestions with a language model
//! (or offline), and scores the draft.

pub mod ai;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod models;
pub mod nlp;
pub mod pipeline;
pub mod report;
pub mod reporters;
pub mod scoring;

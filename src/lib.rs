//! Flashgen Library
//!
//! Core modules for turning selected text into flashcards, explanations and
//! vocabulary cards with a language model.

pub mod collection;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod generator;
pub mod ipc;
pub mod llm;
pub mod prompt;

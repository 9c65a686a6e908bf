//! LLM adapter modules.
//!
//! Provides implementations of the [`Llm`](crate::port::outbound::llm::Llm) trait
//! for Anthropic Claude and OpenAI.

pub mod anthropic;
pub mod openai;

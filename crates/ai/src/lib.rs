//! Sentiment classification over an OpenAI-compatible chat API.
//!
//! [`client::SentimentClient`] sends one interaction's text to the
//! configured model and returns a validated [`parse::SentimentResult`].
//! Model output that cannot be parsed degrades to a neutral result
//! rather than failing the caller; only transport and HTTP errors
//! surface as errors.

pub mod client;
pub mod parse;

pub use client::{Analysis, SentimentClient, SentimentClientError, SentimentConfig};
pub use parse::SentimentResult;

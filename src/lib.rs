//! OCR Server Library
//!
//! Text extraction over HTTP. The binary in main.rs wires these modules
//! together; they are exposed here so the pipeline can be tested and reused.
//!
//! # Modules
//!
//! - `ocr`: request validation, image normalization and the recognition pipeline
//! - `routes`: HTTP surface (`/health`, `/ocr`, `/languages`)
//! - `config`: environment-driven configuration
//! - `error`: HTTP error mapping

pub mod config;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod state;

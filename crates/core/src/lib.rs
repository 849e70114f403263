//! Core library for coursetab
//!
//! This crate implements the **Functional Core** of the coursetab application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The coursetab project uses a three-crate architecture:
//!
//! - **`coursetab_core`** (this crate): Pure extraction and transformation
//!   functions with zero I/O
//! - **`pdf`**: PDF parsing, column cropping and table detection
//! - **`coursetab`**: file I/O, logging and orchestration (the Imperative Shell)
//!
//! Nothing in this crate opens a file or prints. Extractors take already
//! extracted page text and string grids, and return records together with
//! the [`diagnostics::Diagnostic`]s they produced, so the shell decides what
//! to log.
//!
//! # Module Organization
//!
//! - [`catalog`]: course sections, fields and requisite edges from the
//!   course catalog
//! - [`timetable`]: meeting rows from the timetable, folded page by page
//! - [`postprocess`]: year-level column and key deduplication over CSV tables
//! - [`mapping`]: closed enum tables (breadth requirement, delivery mode)
//! - [`codes`]: course-code patterns shared by both extractors
//! - [`schema`]: output CSV column layouts
//!
//! # Example Usage
//!
//! ```rust
//! use coursetab_core::catalog::{extract_catalog, CatalogConfig};
//!
//! let region = "ABCD01H3: Things\nPrerequisite: ABCD02H3\nLink to UTSC Timetable\n";
//! let out = extract_catalog([region], &CatalogConfig::default());
//!
//! assert_eq!(out.courses[0].name, "Things");
//! assert_eq!(out.prerequisites[0].required, "ABCD02H3");
//! ```

pub mod catalog;
pub mod codes;
pub mod diagnostics;
pub mod error;
pub mod mapping;
pub mod postprocess;
pub mod schema;
pub mod timetable;

pub use error::{Error, Result};

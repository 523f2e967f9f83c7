// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Plan Lens
//!
//! Risk-aware summaries of Terraform-style execution plans.
//!
//! ## Overview
//!
//! Plan Lens reads the JSON rendering of a plan (`terraform show -json`) and
//! turns each resource change into something a reviewer can act on:
//!
//! - A property-level diff that never leaks sensitive values
//! - Replacement classification, including replacements that depend on
//!   values only known after apply
//! - Danger flags for deletions and sensitive changes
//! - Aggregate statistics, provider grouping, and risk-first ordering
//!
//! ## Modules
//!
//! - [`plan`]: Plan document model and loading
//! - [`analyzer`]: Diff engine, classifiers, and report assembly
//! - [`config`]: Configuration parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! sensitive_resources:
//!   - resource_type: aws_db_instance
//! sensitive_properties:
//!   - resource_type: aws_instance
//!     property: user_data
//! grouping:
//!   enabled: true
//!   threshold: 10
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod plan;

// ============================================================================
// Re-exports
// ============================================================================

pub use analyzer::{PlanAnalyzer, PlanReport, ResourceChange};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{AnalysisConfig, ConfigParser, ConfigValidator};
pub use error::{PlanLensError, Result};
pub use plan::{Plan, PlanLoader};

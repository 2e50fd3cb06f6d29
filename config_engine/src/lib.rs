//! eslintrc-engine: hierarchical configuration resolver for eslintrc-style
//! lint toolchains.
//!
//! Given an absolute source-file path, the resolver produces one extracted
//! configuration by gathering, ordering, and merging config fragments from
//! a directory hierarchy, shareable config packages, plugin presets, and
//! command-line overrides:
//!
//! ```no_run
//! use std::path::Path;
//! use eslintrc_engine::{CascadingConfigArrayFactory, CascadingConfigArrayFactoryOptions};
//!
//! # fn main() -> Result<(), eslintrc_engine::ConfigError> {
//! let cascading =
//!     CascadingConfigArrayFactory::new(CascadingConfigArrayFactoryOptions::with_discovery());
//! let array = cascading.config_array_for_file(Path::new("/project/src/app.js"))?;
//! let config = array.extract_config(Path::new("/project/src/app.js"))?;
//! println!("{}", serde_json::to_string_pretty(&*config).unwrap());
//! # Ok(())
//! # }
//! ```
//!
//! The core is single-threaded and synchronous. Module resolution and
//! schema validation are pluggable seams ([`ModuleResolver`],
//! [`ConfigValidator`]); file enumeration over source trees and rule
//! execution are the caller's business.

pub mod builtin;
pub mod cascade;
pub mod config_array;
pub mod dependency;
pub mod element;
pub mod error;
pub mod extracted;
pub mod factory;
mod loaders;
mod merge;
pub mod naming;
pub mod overrides;
pub mod plugins;
pub mod resolver;
pub mod types;
pub mod validate;

pub use cascade::{CascadingConfigArrayFactory, CascadingConfigArrayFactoryOptions};
pub use config_array::{ConfigArray, PluginMemberMaps};
pub use dependency::{LoadedDependency, LoadedParser, LoadedPlugin};
pub use element::{ConfigArrayElement, ConfigBody};
pub use error::ConfigError;
pub use extracted::ExtractedConfig;
pub use factory::{ConfigArrayFactory, ConfigArrayFactoryOptions, LoadOptions};
pub use overrides::OverrideTester;
pub use plugins::{ParserDefinition, PluginDefinition, ProcessorDefinition, RuleDefinition, RuleModule};
pub use resolver::{ModuleDefinition, ModuleResolver, NullResolver, StaticModuleResolver};
pub use types::{OneOrMany, RuleEntry, Severity};
pub use validate::{ConfigValidator, NoopValidator, RuleSeverityValidator};

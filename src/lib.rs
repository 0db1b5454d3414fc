//! # nacforge
//!
//! Network access control configuration generator for 802.1X, MAB,
//! RADIUS and TACACS+ deployments.
//!
//! The crate turns a [`DeploymentSettings`] into vendor-specific switch
//! configuration and scores it against a table of best-practice rules.
//!
//! ## Pipeline
//!
//! - **Schema**: declarative wizard questions validated into settings
//! - **Template**: logic-less templates with sections and inverted sections
//! - **Vendor catalog**: per-platform templates and capability flags
//! - **Generator**: capability gating, rendering, file output and drift checks
//! - **Compliance**: weighted findings and a 0-100 score
//! - **Snapshots**: named generated configurations in a JSON file
//!
//! ## Quick Start
//!
//! ```
//! use nacforge::{compliance, ConfigGenerator, DeploymentSettings};
//!
//! let settings = DeploymentSettings::from_toml(r#"
//! vendor = "cisco"
//! platform = "ios-xe"
//!
//! [radius]
//! primary_server = "10.1.1.10"
//! secondary_server = "10.1.1.11"
//! shared_secret = "vT4#pQ9!rL2@xM7$"
//! "#)?;
//!
//! let config = ConfigGenerator::new(settings.clone()).generate()?;
//! assert!(config.content.contains("radius server RADIUS-PRIMARY"));
//!
//! let report = compliance::evaluate(&settings);
//! assert!(report.is_compliant());
//! # Ok::<(), nacforge::Error>(())
//! ```

pub mod compliance;
mod error;
pub mod generator;
pub mod observability;
pub mod parse;
pub mod schema;
pub mod settings;
pub mod snapshot;
pub mod template;
pub mod vendor;

// Re-exports
pub use compliance::{ComplianceReport, Finding, Severity};
pub use error::{Error, Result};
pub use generator::{ConfigGenerator, GeneratedConfig, GeneratorError};
pub use schema::{Answers, Schema, SchemaError};
pub use settings::{AuthMethod, AuthMode, DeploymentSettings, HostMode, PolicyMode};
pub use snapshot::{Snapshot, SnapshotError, SnapshotStore};
pub use template::{Context, Template, TemplateError};

//! # strain-build: Helpers Around the Image Build
//!
//! Small input-to-output transformations the CI pipeline runs next to
//! validation:
//!
//! - [`image_tag`]: per-service image keys and dynamic tag generation.
//! - [`strain_file`]: editing one top-level key of a strain file.
//! - [`env_file`]: exporting values to the CI environment file.
//! - [`build_log`]: scanning a build log for known error and warning text.

pub mod build_log;
pub mod env_file;
pub mod error;
pub mod image_tag;
pub mod strain_file;

pub use build_log::{Finding, LogScanner, ScanReport, Severity};
pub use env_file::EnvEmitter;
pub use error::BuildError;
pub use image_tag::{
    dynamic_image_tag, random_suffix, ImageRef, ServiceImageKeys, TagStamp, TagTemplate,
    DEFAULT_RANDOM_SUFFIX_LENGTH, DEFAULT_TAG_PREFIX, DEFAULT_TIMESTAMP_FORMAT,
};
pub use strain_file::StrainFile;

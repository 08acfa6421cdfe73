//! # Image Tag Subcommands
//!
//! `image-tag` has two modes. By default it derives a dynamic tag for one
//! service from the strain's current image and platform version, and prints
//! `TARGET_KEY=` / `DYNAMIC_IMAGE_TAG=` lines for the CI environment. With
//! `--save-config true --image-tag <IMAGE>` it writes that image back to the
//! service's key instead.
//!
//! `target-key` prints the strain key a service's image lives under.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};

use strain_build::{
    dynamic_image_tag, BuildError, EnvEmitter, ImageRef, ServiceImageKeys, StrainFile, TagStamp,
    TagTemplate, DEFAULT_RANDOM_SUFFIX_LENGTH, DEFAULT_TAG_PREFIX, DEFAULT_TIMESTAMP_FORMAT,
};
use strain_core::StrainKeys;

/// Arguments for `strain image-tag`.
#[derive(Args, Debug)]
pub struct ImageTagArgs {
    /// Strain configuration file.
    #[arg(long, value_name = "PATH", default_value = "config.yml")]
    pub config_file: PathBuf,

    /// Service whose image is being built (e.g. openedx, mfe).
    #[arg(long, default_value = "openedx")]
    pub service: String,

    /// Text between the platform version and the timestamp, usually the
    /// release name.
    #[arg(long, default_value = DEFAULT_TAG_PREFIX)]
    pub image_tag_prefix: String,

    /// strftime format of the build time.
    #[arg(long, default_value = DEFAULT_TIMESTAMP_FORMAT)]
    pub timestamp_format: String,

    /// Append a random `[a-z0-9]` suffix to the tag.
    #[arg(
        long,
        value_name = "BOOL",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub add_random_suffix_to_image_tag: bool,

    /// Length of the random suffix.
    #[arg(long, default_value_t = DEFAULT_RANDOM_SUFFIX_LENGTH)]
    pub random_suffix_length: usize,

    /// Write `--image-tag` to the service's key instead of generating a tag.
    #[arg(
        long,
        value_name = "BOOL",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub save_config: bool,

    /// Full image reference to save with `--save-config`.
    #[arg(long, value_name = "IMAGE")]
    pub image_tag: Option<String>,

    /// Also append the assignments to this file (e.g. "$GITHUB_ENV").
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

impl ImageTagArgs {
    /// The tag template these arguments describe.
    pub fn template(&self) -> TagTemplate {
        TagTemplate {
            prefix: self.image_tag_prefix.clone(),
            timestamp_format: self.timestamp_format.clone(),
            random_suffix_length: self
                .add_random_suffix_to_image_tag
                .then_some(self.random_suffix_length),
        }
    }
}

/// A generated image reference and the key it belongs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicImageTag {
    pub target_key: String,
    pub image: String,
}

impl DynamicImageTag {
    /// Write the `TARGET_KEY` and `DYNAMIC_IMAGE_TAG` assignments.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if the write fails.
    pub fn emit<W: Write>(&self, out: &mut EnvEmitter<W>) -> Result<(), BuildError> {
        out.emit("TARGET_KEY", &self.target_key)?;
        out.emit("DYNAMIC_IMAGE_TAG", &self.image)
    }
}

/// Execute the image-tag subcommand. Returns exit code 0.
pub fn run_image_tag(
    args: &ImageTagArgs,
    keys: &StrainKeys,
    services: &ServiceImageKeys,
) -> Result<u8> {
    if args.save_config {
        save_image_tag(args, services)?;
        return Ok(0);
    }

    let template = args.template();
    let tag = generate_image_tag(args, keys, services, &TagStamp::now(&template))?;
    tag.emit(&mut EnvEmitter::new(std::io::stdout().lock(), "stdout"))?;
    if let Some(path) = &args.env_file {
        tag.emit(&mut EnvEmitter::append_to(path)?)?;
    }
    Ok(0)
}

/// Derive the next image reference for `args.service`.
///
/// # Errors
///
/// Fails if the service is unknown, the strain lacks the image key or the
/// platform version, or the image or template is invalid.
pub fn generate_image_tag(
    args: &ImageTagArgs,
    keys: &StrainKeys,
    services: &ServiceImageKeys,
    stamp: &TagStamp,
) -> Result<DynamicImageTag> {
    let target_key = services.key_for(&args.service)?;
    let strain = StrainFile::open(&args.config_file)?;
    let current = required_str(&strain, target_key)?;
    let version = required_str(&strain, &keys.platform_version)?;

    let image = dynamic_image_tag(current, version, &args.template(), stamp)?;
    tracing::info!(service = %args.service, target_key, from = %current, to = %image, "generated image tag");
    Ok(DynamicImageTag {
        target_key: target_key.to_string(),
        image,
    })
}

/// Store `args.image_tag` under the service's key and save the strain.
///
/// The key must already exist; a service the strain does not build is not
/// added by accident.
///
/// # Errors
///
/// Fails if `--image-tag` is missing or invalid, the service is unknown,
/// the strain lacks the key, or the write fails.
pub fn save_image_tag(args: &ImageTagArgs, services: &ServiceImageKeys) -> Result<String> {
    let Some(image) = args.image_tag.as_deref() else {
        bail!("--image-tag must be provided when --save-config is true");
    };
    ImageRef::parse(image)?;

    let target_key = services.key_for(&args.service)?;
    let mut strain = StrainFile::open(&args.config_file)?;
    required_str(&strain, target_key)?;

    strain.set_string(target_key, image);
    strain
        .save()
        .with_context(|| format!("failed to update {}", args.config_file.display()))?;
    tracing::info!(service = %args.service, target_key, image, "saved image tag");
    Ok(target_key.to_string())
}

fn required_str<'a>(strain: &'a StrainFile, key: &str) -> Result<&'a str, BuildError> {
    strain.get_str(key).ok_or_else(|| BuildError::MissingKey {
        key: key.to_string(),
    })
}

/// Arguments for `strain target-key`.
#[derive(Args, Debug)]
pub struct TargetKeyArgs {
    /// Service to look up.
    #[arg(long)]
    pub service: String,
}

/// Print the strain key holding the service's image. Returns exit code 0.
pub fn run_target_key(args: &TargetKeyArgs, services: &ServiceImageKeys) -> Result<u8> {
    println!("{}", services.key_for(&args.service)?);
    Ok(0)
}

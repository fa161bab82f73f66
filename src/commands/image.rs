//! Image commands

use crate::image::ImageResolver;
use crate::translate::runtime_command;
use clap::Args;

/// Arguments for `images`
#[derive(Args, Debug, Default)]
pub struct ImagesArgs {
    /// Show the translated command without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Only show image IDs
    #[arg(short, long)]
    pub quiet: bool,
}

impl ImagesArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("images");
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args
    }
}

/// Arguments for `pull`
#[derive(Args, Debug, Default)]
pub struct PullArgs {
    /// Image reference
    pub image: String,
}

impl PullArgs {
    /// Runtime arguments; the reference is fully qualified first
    pub fn runtime_args(&self, resolver: &ImageResolver) -> Vec<String> {
        let mut args = runtime_command("pull");
        args.push(resolver.resolve(&self.image));
        args
    }
}

/// Arguments for `build`
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Name and optionally a tag in the `name:tag` format
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Name of the Dockerfile
    #[arg(short, long)]
    pub file: Option<String>,

    /// Set build-time variables
    #[arg(long = "build-arg")]
    pub build_args: Vec<String>,

    /// Do not use cache when building the image
    #[arg(long)]
    pub no_cache: bool,

    /// Set the target build stage to build
    #[arg(long)]
    pub target: Option<String>,

    /// Build context
    #[arg(default_value = ".")]
    pub context: String,
}

impl BuildArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("build");
        if let Some(tag) = &self.tag {
            args.extend(["--tag".to_string(), tag.clone()]);
        }
        if let Some(file) = &self.file {
            args.extend(["--file".to_string(), file.clone()]);
        }
        for build_arg in &self.build_args {
            args.extend(["--build-arg".to_string(), build_arg.clone()]);
        }
        if self.no_cache {
            args.push("--no-cache".to_string());
        }
        if let Some(target) = &self.target {
            args.extend(["--target".to_string(), target.clone()]);
        }
        args.push(self.context.clone());
        args
    }
}

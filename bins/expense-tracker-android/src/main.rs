//! Expense Tracker Android CLI
//!
//! Validates, resolves and release-checks the Android build descriptor.

use anyhow::Result;
use clap::{Parser, Subcommand};
use expense_tracker_android::{
    check_release, check_release_after, load_descriptor, BuildDescriptor, DescriptorError,
    PlatformDefaults, ReleasePolicy, SigningRegistry,
};
use expense_tracker_cli::output::{format_count, print_diagnostics, Status};
use expense_tracker_core::config::Config;
use expense_tracker_core::error::{exit_codes, Error};
use expense_tracker_telemetry::{Timer, TelemetryConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "expense-tracker-android")]
#[command(about = "Validate and resolve the expense tracker Android build descriptor")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and validate the descriptor
    Validate {
        /// build.gradle.kts path (defaults to [general] descriptor)
        #[arg(long)]
        descriptor: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved descriptor as JSON
    Resolve {
        /// build.gradle.kts path (defaults to [general] descriptor)
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// Summarize the descriptor as declared
    Show {
        /// build.gradle.kts path (defaults to [general] descriptor)
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// Check that the descriptor can be published as a new release
    #[command(name = "check-release")]
    CheckRelease {
        /// build.gradle.kts path (defaults to [general] descriptor)
        #[arg(long)]
        descriptor: Option<PathBuf>,
        /// versionCode of the previous release
        #[arg(long, conflicts_with = "previous", required_unless_present = "previous")]
        previous_code: Option<i64>,
        /// Descriptor of the previous release
        #[arg(long)]
        previous: Option<PathBuf>,
        /// Accept a release signed with the debug key
        #[arg(long)]
        allow_debug_signing: bool,
    },
}

/// Everything resolved from the tool configuration
struct Context {
    config: Config,
    defaults: PlatformDefaults,
    registry: SigningRegistry,
    quiet: bool,
}

impl Context {
    fn descriptor_path(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.unwrap_or_else(|| PathBuf::from(&self.config.schema.general.descriptor))
    }

    /// Load a descriptor and resolve its platform references
    fn load_resolved(&self, path: &Path) -> std::result::Result<(BuildDescriptor, BuildDescriptor), Error> {
        let timer = Timer::start("load_descriptor");
        let declared = load_descriptor(path).map_err(|e| in_file(e, path))?;
        let resolved = declared
            .resolve(&self.defaults)
            .map_err(|e| in_file(e.into(), path))?;
        timer.stop();
        Ok((declared, resolved))
    }
}

fn in_file(err: DescriptorError, path: &Path) -> Error {
    Error::from(err).with_context(format!("In {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.code.exit_code());
        }
    };

    let level = expense_tracker_telemetry::level_for(cli.verbose, cli.quiet, &config.schema.logging.level);
    expense_tracker_telemetry::init_with_config(TelemetryConfig::with_level(level))?;

    if let Some(path) = &config.path {
        tracing::debug!(config = %path.display(), "Using configuration file");
    }

    let ctx = Context {
        defaults: PlatformDefaults::from_config(&config.schema.platform),
        registry: SigningRegistry::from_config(&config.schema.signing),
        config,
        quiet: cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Validate { descriptor, json } => run_validate(&ctx, descriptor, json),
        Commands::Resolve { descriptor } => run_resolve(&ctx, descriptor),
        Commands::Show { descriptor } => run_show(&ctx, descriptor),
        Commands::CheckRelease {
            descriptor,
            previous_code,
            previous,
            allow_debug_signing,
        } => run_check_release(
            &ctx,
            descriptor,
            previous_code,
            previous.as_deref(),
            allow_debug_signing,
        ),
    };

    std::process::exit(exit_code);
}

fn report(err: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(out) => println!("{}", out),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
    err.code.exit_code()
}

fn run_validate(ctx: &Context, descriptor: Option<PathBuf>, json: bool) -> i32 {
    let path = ctx.descriptor_path(descriptor);
    let (_, resolved) = match ctx.load_resolved(&path) {
        Ok(loaded) => loaded,
        Err(e) => return report(&e, json),
    };

    let result = resolved.diagnose(&ctx.registry);
    let exit_code = if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    };

    if json {
        let out = serde_json::json!({
            "descriptor": path.display().to_string(),
            "valid": result.is_valid(),
            "errors": result.errors(),
            "warnings": result.warnings(),
        });
        match serde_json::to_string_pretty(&out) {
            Ok(out) => println!("{}", out),
            Err(e) => return report(&Error::from(e), false),
        }
        return exit_code;
    }

    print_diagnostics(&result);
    let warnings = format_count(result.warnings().len(), "warning", "warnings");
    if result.is_valid() {
        if !ctx.quiet {
            Status::success(&format!("{} is valid ({})", path.display(), warnings));
        }
    } else {
        Status::error(&format!(
            "{} is invalid: {}, {}",
            path.display(),
            format_count(result.errors().len(), "error", "errors"),
            warnings
        ));
    }
    exit_code
}

fn run_resolve(ctx: &Context, descriptor: Option<PathBuf>) -> i32 {
    let path = ctx.descriptor_path(descriptor);
    let (_, resolved) = match ctx.load_resolved(&path) {
        Ok(loaded) => loaded,
        Err(e) => return report(&e, false),
    };

    match serde_json::to_string_pretty(&resolved) {
        Ok(out) => {
            println!("{}", out);
            exit_codes::SUCCESS
        }
        Err(e) => report(&Error::from(e), false),
    }
}

fn run_show(ctx: &Context, descriptor: Option<PathBuf>) -> i32 {
    let path = ctx.descriptor_path(descriptor);
    let declared = match load_descriptor(&path) {
        Ok(declared) => declared,
        Err(e) => return report(&in_file(e, &path), false),
    };

    Status::header(&path.display().to_string());
    Status::field("applicationId", &declared.application_id);
    if let Some(namespace) = &declared.namespace {
        Status::field("namespace", namespace);
    }
    Status::field("plugins", &declared.plugins.join(" → "));
    Status::field("compileSdk", &declared.sdk.compile.to_string());
    Status::field("minSdk", &declared.sdk.min.to_string());
    Status::field("targetSdk", &declared.sdk.target.to_string());
    if let Some(ndk) = &declared.ndk_version {
        Status::field("ndkVersion", &ndk.to_string());
    }
    Status::field("versionCode", &declared.version_code.to_string());
    if let Some(name) = &declared.version_name {
        Status::field("versionName", &name.to_string());
    }
    if let Some(level) = declared.compile_options.source_compatibility {
        Status::field("languageLevel", &level.to_string());
    }
    Status::field(
        "desugaring",
        if declared.compile_options.core_library_desugaring {
            "enabled"
        } else {
            "disabled"
        },
    );

    Status::header("Build types");
    for build_type in &declared.build_types {
        Status::field(
            &build_type.name,
            build_type.signing_config.as_deref().unwrap_or("unsigned"),
        );
    }

    Status::header(&format_count(declared.dependencies.len(), "dependency", "dependencies"));
    for dependency in &declared.dependencies {
        Status::field(&dependency.configuration, &dependency.to_string());
    }
    exit_codes::SUCCESS
}

fn run_check_release(
    ctx: &Context,
    descriptor: Option<PathBuf>,
    previous_code: Option<i64>,
    previous: Option<&Path>,
    allow_debug_signing: bool,
) -> i32 {
    let path = ctx.descriptor_path(descriptor);
    let (_, resolved) = match ctx.load_resolved(&path) {
        Ok(loaded) => loaded,
        Err(e) => return report(&e, false),
    };

    if let Err(e) = resolved.validate(&ctx.registry) {
        return report(&in_file(e.into(), &path), false);
    }

    let policy = ReleasePolicy {
        allow_debug_signing: allow_debug_signing
            || ReleasePolicy::from(&ctx.config.schema.release).allow_debug_signing,
    };

    let outcome = match (previous_code, previous) {
        (Some(code), _) => check_release(code, &resolved, &ctx.registry, policy),
        (None, Some(previous_path)) => {
            let previous = match ctx.load_resolved(previous_path) {
                Ok((_, previous)) => previous,
                Err(e) => return report(&e, false),
            };
            check_release_after(&previous, &resolved, &ctx.registry, policy)
        }
        (None, None) => unreachable!("clap requires --previous-code or --previous"),
    };

    match outcome {
        Ok(()) => {
            if !ctx.quiet {
                Status::success(&format!(
                    "versionCode {} can be released",
                    resolved.version_code
                ));
            }
            exit_codes::SUCCESS
        }
        Err(e) => report(&in_file(e.into(), &path), false),
    }
}

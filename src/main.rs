//! LinkedIn Post Archiver - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use linkedin_archiver::{
    api::{collect_posts, resolve_token, CachedToken, LinkedInApi, TokenCache},
    archive::{Archiver, HttpMediaSink},
    cli::Args,
    config::{validate_config, validate_token, Config},
    error::{exit_codes, Error, Result},
    export::ExportParser,
    output::{
        print_banner, print_config_summary, print_error, print_info, print_run_stats,
        print_success, print_warning,
    },
    post::parse_api_posts,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::MissingConfig(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::Authentication(_) | Error::Api(_) | Error::ExhaustedRetries { .. } => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::Export(_) | Error::PostArchival { .. } => {
                    ExitCode::from(exit_codes::ARCHIVE_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    if !args.quiet {
        print_banner();
    }

    if !args.has_action() {
        print_info("No action specified. Run with --help for usage.");
        return Ok(());
    }

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            args.config.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    args.merge_into_config(&mut config);
    validate_config(&config)?;

    if let Some(export_path) = &args.import_export {
        return run_import(&config, &args, export_path).await;
    }

    if args.auth {
        return run_auth(&args);
    }

    run_fetch(&config, &args).await
}

/// Import posts from a data export bundle. No API access needed.
async fn run_import(config: &Config, args: &Args, export_path: &std::path::Path) -> Result<()> {
    if !args.quiet {
        print_config_summary(
            &format!("export bundle {}", export_path.display()),
            &config.base_dir().display().to_string(),
        );
    }

    let parser = ExportParser::new(export_path);
    let mut posts = parser.parse()?;

    if posts.is_empty() {
        print_warning("No posts found in export");
        return Ok(());
    }

    print_info(&format!("Found {} posts in export", posts.len()));

    let sink = HttpMediaSink::new(config.media.clone(), config.api.timeout_secs)?;
    let mut archiver = Archiver::new(config, sink);
    let stats = archiver.archive_posts(&mut posts).await;

    print_run_stats(&stats, None);
    print_info(&format!("Archive location: {}", config.base_dir().display()));
    Ok(())
}

/// Store the supplied token in the cache for later runs.
fn run_auth(args: &Args) -> Result<()> {
    let cache = TokenCache::default_location()?;

    if args.reauth {
        cache.clear()?;
    }

    let token = args
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            Error::MissingConfig("token (pass --token or set LINKEDIN_TOKEN)".to_string())
        })?;

    validate_token(token)?;

    cache.store(&CachedToken {
        access_token: token.to_string(),
        expires_at: None,
    })?;

    print_success("Token stored. You can now run with --fetch to archive your posts");
    Ok(())
}

/// Fetch posts via the API and archive them.
async fn run_fetch(config: &Config, args: &Args) -> Result<()> {
    let cache = TokenCache::default_location()?;
    if args.reauth {
        cache.clear()?;
    }

    let token = resolve_token(args.token.as_deref(), &cache)?;
    validate_token(&token)?;

    if !args.quiet {
        print_config_summary(
            "LinkedIn API",
            &config.base_dir().display().to_string(),
        );
    }

    let api = LinkedInApi::new(token, &config.api)?;

    let profile = api.get_profile().await?;
    print_info(&format!("Archiving posts for: {}", profile.display_name()));

    let author_urn = LinkedInApi::person_urn(&profile)?;

    let collection = collect_posts(&api, &author_urn, config.api.page_size, args.limit).await;
    if let Some(failure) = &collection.failure {
        print_warning(&format!(
            "Fetch stopped early ({}); continuing with {} collected posts",
            failure,
            collection.records.len()
        ));
    }

    let mut posts = parse_api_posts(&collection.records);
    if posts.is_empty() {
        print_warning("No posts found");
        return Ok(());
    }

    print_info(&format!("Found {} posts to archive", posts.len()));

    let sink = HttpMediaSink::new(config.media.clone(), config.api.timeout_secs)?;
    let mut archiver = Archiver::new(config, sink);
    let stats = archiver.archive_posts(&mut posts).await;

    print_run_stats(&stats, Some(api.request_count().await));
    print_info(&format!("Archive location: {}", config.base_dir().display()));
    Ok(())
}

//! changelog-generator - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use git2::Repository;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use changelog_generator::changelog::{ClassificationPolicy, RenderStrategy, summarize};
use changelog_generator::config::load_config;
use changelog_generator::generator::{Generator, MergeWindow};
use changelog_generator::git::{commits_in_range, resolve_range};
use changelog_generator::github::{GitHubSource, get_github_token, parse_github_remote};
use changelog_generator::output::write_changelog;

/// Generate a changelog from the merged PRs between two commits.
#[derive(Parser, Debug)]
#[command(name = "changelog-generator")]
#[command(about = "Generate a changelog from the merged PRs between two commits")]
#[command(version)]
struct Cli {
    /// Start of commit range (tag, commit hash, or branch). Defaults to the previous release tag
    #[arg(long)]
    from: Option<String>,

    /// End of commit range
    #[arg(long, default_value = "HEAD")]
    to: String,

    /// Repository owner (defaults to the 'origin' remote)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (defaults to the 'origin' remote)
    #[arg(long)]
    repo: Option<String>,

    /// GitHub token (defaults to gh CLI auth, GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Path to the local git checkout
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bullet text: PR titles or release-note fences (overrides config)
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(["title", "release-note"]))]
    mode: Option<String>,

    /// Classify by labels only, never by title keywords (overrides config)
    #[arg(long)]
    label_only: bool,

    /// Write the changelog to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Maximum number of merged PRs to fetch
    #[arg(long)]
    limit: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Step 1: Load config and apply CLI overrides
    let mut config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(mode) = cli.mode.as_deref() {
        config.mode = mode
            .parse::<RenderStrategy>()
            .map_err(anyhow::Error::msg)?;
    }
    if cli.label_only {
        config.classification = ClassificationPolicy::LabelOnly;
    }

    // Step 2: Resolve commit range
    let repo = Repository::open(&cli.path)
        .context("Not a git repository. Run from within a git repository or pass --path.")?;

    let range = resolve_range(&repo, cli.from.as_deref(), Some(&cli.to))
        .context("Failed to resolve commit range")?;
    let commits = commits_in_range(&repo, &range).context("Failed to walk commit range")?;

    eprintln!(
        "Collecting merged PRs from {} to {} ({} commits)...",
        range.from_ref,
        range.to_ref,
        commits.len()
    );

    // Step 3: Connect to GitHub
    let (owner, repo_name) = resolve_owner_repo(&repo, cli.owner, cli.repo)?;
    let token = get_github_token(cli.token.as_deref())
        .context("GitHub authentication required for PR fetching")?;
    let source = GitHubSource::with_token(&token, owner, repo_name)
        .context("Failed to create GitHub client")?
        .with_limit(cli.limit);

    // Step 4: Generate
    let renderer = config.renderer();
    debug!(
        mode = ?renderer.strategy(),
        classification = ?renderer.classifier().policy(),
        "Rendering configuration"
    );
    let generator = Generator::new(source, renderer);
    let changelog = generator
        .generate(&MergeWindow::from_range(&range, commits))
        .await
        .context("Failed to generate changelog")?;

    if changelog.is_empty() {
        eprintln!("No changelog-worthy changes found.");
        return Ok(());
    }

    // Step 5: Write or display
    match cli.output {
        Some(path) => {
            write_changelog(&path, &changelog.markdown)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {} to {}", summarize(&changelog.buckets), path.display());
        }
        None => println!("{}", changelog.markdown.trim()),
    }

    Ok(())
}

/// Owner and repository name from the flags, falling back to the 'origin' remote.
fn resolve_owner_repo(
    repo: &Repository,
    owner: Option<String>,
    name: Option<String>,
) -> Result<(String, String)> {
    if let (Some(owner), Some(name)) = (&owner, &name) {
        return Ok((owner.clone(), name.clone()));
    }

    let remote = repo
        .find_remote("origin")
        .context("No 'origin' remote found. Pass --owner and --repo.")?;
    let url = remote.url().context("Remote has no URL")?;
    let (remote_owner, remote_name) =
        parse_github_remote(url).context("Could not parse GitHub remote URL")?;

    Ok((owner.unwrap_or(remote_owner), name.unwrap_or(remote_name)))
}

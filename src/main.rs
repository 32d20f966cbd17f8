use anyhow::{Context, Result};
use clap::Parser;
use gh_followers::{app, args::Args, config::Config, followers::github::GithubSource};
use log::warn;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = try_main().await {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("Because: {cause}");
        }
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args).context("failed to load configuration")?;

    let source = GithubSource::new(config.token.clone(), config.api_base.clone())
        .context("cannot create GitHub client, set GITHUB_ACCESS_TOKEN before running")?;

    let cancel = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let outcome = app::run(&config, source, cancel)
        .await
        .with_context(|| format!("tracking followers of {} failed", config.user))?;

    print!("{}", outcome.report(&config.user, config.list));
    Ok(())
}

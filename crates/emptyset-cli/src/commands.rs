//! Implementations of the CLI commands.

use crate::cli::{
    DeployArgs,
    DeploymentsArgs,
    ShowArgs,
};
use alloy_provider::{
    Provider,
    ProviderBuilder,
    RootProvider,
    WsConnect,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use colored::Colorize;
use emptyset_common::{
    DeployerAccount,
    PackageConfig,
    config,
};
use emptyset_deploy::{
    ArtifactResolver,
    Deployer,
    DeploymentStore,
    MigrationRunner,
};
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;
use tracing::info;
use url::Url;

pub async fn deploy(args: DeployArgs) -> Result<()> {
    let root = package_root(args.package_root.as_ref())?;
    let package = package_config(&args.package, &root)?;

    let rpc_url = match args.rpc_url {
        Some(url) => url,
        None => config::rpc_url(args.network)?,
    };
    info!(network = %args.network, rpc = %rpc_url, "connecting");
    let provider = connect_provider(&rpc_url).await?;

    let store = DeploymentStore::open(
        &root,
        args.network,
        package.external_deployments_for(args.network).to_vec(),
    );
    let mut artifacts = ArtifactResolver::new(args.artifact_dirs.clone());
    artifacts.push_dir(root.join("artifacts"));
    artifacts.push_dir(root.join("out"));

    let account = match args.deployer_index {
        Some(index) => DeployerAccount::Index(index),
        None => package.deployer,
    };
    let deployer =
        Deployer::connect(provider, args.network, store, artifacts, account).await?;

    let runner = MigrationRunner::standard();
    let spinner = create_spinner(format!("Running migrations on {}", args.network));
    let result = if args.tags.is_empty() {
        runner.run_all(&deployer).await
    } else {
        let mut outcome = Ok(());
        for tag in &args.tags {
            spinner.set_message(format!("Running {tag} on {}", args.network));
            if let Err(err) = runner.run_tag(&deployer, tag).await {
                outcome = Err(err);
                break;
            }
        }
        outcome
    };
    match result {
        Ok(()) => {
            spinner
                .finish_with_message(format!("✅ Migrations complete on {}", args.network));
        }
        Err(err) => {
            spinner.finish_with_message("❌ Migration failed");
            return Err(err.into());
        }
    }

    println!("\n{}", "Deployments".bold().green());
    println!("{}", "===========".green());
    for name in deployer.store().list()? {
        let address = deployer.store().address_of(&name)?;
        println!("  {} {address}", name.cyan().bold());
    }
    Ok(())
}

pub fn list(args: DeploymentsArgs) -> Result<()> {
    let store = open_store(&args)?;
    let names = store.list()?;
    if names.is_empty() {
        println!("no deployments recorded for {}", args.network);
        return Ok(());
    }
    println!(
        "{}",
        format!("Deployments on {}", args.network).bold().green()
    );
    for name in names {
        let address = store.address_of(&name)?;
        println!("  {} {address}", name.cyan().bold());
    }
    Ok(())
}

pub fn show(args: ShowArgs) -> Result<()> {
    let store = open_store(&args.target)?;
    let deployment = store.get(&args.name)?;
    println!("{}", serde_json::to_string_pretty(&deployment)?);
    Ok(())
}

fn open_store(args: &DeploymentsArgs) -> Result<DeploymentStore> {
    let root = package_root(args.package_root.as_ref())?;
    let package = package_config(&args.package, &root)?;
    Ok(DeploymentStore::open(
        &root,
        args.network,
        package.external_deployments_for(args.network).to_vec(),
    ))
}

fn package_root(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// An `emptyset.toml` in the package root wins over the built-in package
/// configurations.
fn package_config(package: &str, root: &Path) -> Result<PackageConfig> {
    let file = root.join("emptyset.toml");
    if file.is_file() {
        info!(path = %file.display(), "using package configuration file");
        return Ok(PackageConfig::from_file(&file)?);
    }
    match package {
        config::DSU_PACKAGE => Ok(config::dsu_package()),
        config::RESERVE_PACKAGE => Ok(config::reserve_package()?),
        other => Err(eyre!("unknown package '{other}'; expected 'dsu' or 'reserve'")),
    }
}

async fn connect_provider(url: &Url) -> Result<RootProvider> {
    let provider = match url.scheme() {
        "ws" | "wss" => {
            ProviderBuilder::new()
                .connect_ws(WsConnect::new(url.as_str()))
                .await?
        }
        _ => ProviderBuilder::new().connect_http(url.clone()),
    };
    Ok(provider.root().clone())
}

fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .expect("Failed to set spinner style"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

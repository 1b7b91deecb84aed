use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};

use kube_unused::k8s::client::{connect, KubeconfigSource};
use kube_unused::{Inventory, Scanner};

#[derive(Parser, Debug)]
#[command(name = "kube-unused")]
#[command(bin_name = "kube-unused")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the kubeconfig file.
    /// Default is ~/.kube/config when it exists, otherwise the configuration is
    /// inferred (KUBECONFIG or the in-cluster service account).
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        // stdout is reserved for the report.
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    info!("Parsed CLI arguments: {:?}", args);

    let home = dirs::home_dir();
    let source = KubeconfigSource::resolve(args.kubeconfig.as_deref(), home.as_deref());
    info!("Using cluster configuration from {:?}", source);

    let kube_client = connect(&source).await?;
    let inventory = Inventory::fetch(kube_client).await?;

    let report = Scanner::default().scan(&inventory);
    print!("{}", report);

    Ok(())
}

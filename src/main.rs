use std::sync::Arc;

use clap::Parser;

use coi_serve::assets::AssetTree;
use coi_serve::config::{CachePolicyKind, Config};
use coi_serve::handler::StaticFiles;
use coi_serve::pipeline::{CachePolicy, Pipeline};
use coi_serve::{logger, server, StartupError};

/// Serve the embedded frontend bundle with cross-origin isolation headers
#[derive(Debug, Parser)]
#[command(name = "coi-serve", version, about)]
struct Cli {
    /// Configuration file, without the `.toml` extension
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Listen host, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Cache-Control policy, overrides `cache.policy`
    #[arg(long, value_enum)]
    cache_policy: Option<CachePolicyKind>,
}

impl Cli {
    fn apply(self, cfg: &mut Config) {
        if let Some(host) = self.host {
            cfg.server.host = host;
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(policy) = self.cache_policy {
            cfg.cache.policy = policy;
        }
    }
}

fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();
    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    logger::init(&cfg.logging)?;

    let tree = AssetTree::from_bundle()?;
    let cache_policy = CachePolicy::from_config(&cfg.cache)?;
    let server = StaticFiles::new(Arc::new(tree), cfg.static_files.index_files.clone());
    let pipeline = Arc::new(Pipeline::new(
        server,
        cache_policy,
        logger::access_sink(&cfg.logging),
    ));

    // Worker threads follow `server.workers`, defaulting to one per CPU
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(server::run(&cfg, pipeline))
}

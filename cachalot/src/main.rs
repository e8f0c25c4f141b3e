use cachalot_config::CachalotConfig;
use cachalot_core::Master;
use utils::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = CachalotConfig::from_file_or_default("cachalot.conf");
    cfg.print();

    Master::new(cfg).run().await
}

use dbseed::{config, runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; sqlx query logging stays off
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = EnvFilter::new("dbseed=info,sqlx=off");
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let params = config::connect_params()?;
    let descriptors = config::descriptors();

    let report = runner::run(&params, &descriptors).await?;

    println!();
    println!("Seed Summary");
    println!("============");
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(load) => println!("  {}: {} rows", outcome.table, load.rows_inserted),
            Err(e) => println!("  {}: FAILED ({})", outcome.table, e),
        }
    }
    println!();
    println!(
        "Files loaded: {}/{}",
        report.files_loaded(),
        report.outcomes.len()
    );
    println!("Records loaded: {}", report.records_loaded());

    Ok(())
}

use market_dashboard_sdk::{Dashboard, DashboardConfig, PrimaryView};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "bitcoin".to_string());

    // 1. Startup snapshot
    let dashboard = Dashboard::new(DashboardConfig::from_env()?)?;
    println!("Market Dashboard (provider: {})", dashboard.provider_name());
    println!("-------------------------------------------");

    let start = Instant::now();
    if let Err(e) = dashboard.initialize().await {
        eprintln!("   Snapshot failed: {}", e);
    }
    println!("1. Top assets ({:?})", start.elapsed());
    for row in dashboard.view().await.rows() {
        println!(
            "   {:<24} {:>14} {:>12} {:>8} [{}]",
            row.title,
            row.price,
            row.market_cap,
            row.change,
            row.direction.css_class()
        );
    }
    println!();

    // 2. Search
    println!("2. Searching for {:?}...", query);
    let start = Instant::now();
    let result = dashboard.submit_search(&query).await;
    let view = dashboard.view().await;

    if let Some(prompt) = view.validation_prompt() {
        println!("   {}", prompt);
        return Ok(());
    }
    if let Err(e) = result {
        println!("   Error: {}", e);
        return Ok(());
    }
    if let PrimaryView::SearchDetail(_) = &view.primary {
        for row in view.rows() {
            println!("   {} ({:?})", row.title, start.elapsed());
            println!("   Price: {}  Market Cap: {}  24h: {}", row.price, row.market_cap, row.change);
        }
    }
    println!();

    // 3. Chart for the resolved asset
    dashboard.wait_for_chart().await;
    match dashboard.view().await.chart_series {
        Some(series) => {
            println!("3. {} - {} points", series.asset_label, series.points.len());
            for point in &series.points {
                println!("   {}  ${:.2}", point.label, point.value);
            }
        }
        None => println!("3. Chart unavailable"),
    }

    Ok(())
}

/// Diagnostic tool to verify the assets → layout → tiles pipeline
use std::path::PathBuf;

use clap::Parser;
use folioview_rs::layout::{Bounds, LayoutConfig, LayoutStrategy};
use folioview_rs::portfolio::load_assets;
use folioview_rs::render::build_treemap;
use folioview_rs::render::colors::ColorSettings;
use folioview_rs::ui::format::format_eur;

#[derive(Debug, Parser)]
#[command(name = "debug-layout", about = "Check treemap layout coverage and anomalies")]
struct Args {
    /// Asset rows as JSON (`-` for stdin)
    assets: PathBuf,
    #[arg(long, value_enum, default_value_t = LayoutStrategy::Binary)]
    strategy: LayoutStrategy,
    /// Viewport width
    #[arg(long, default_value_t = 1920.0)]
    width: f64,
    /// Viewport height
    #[arg(long, default_value_t = 1080.0)]
    height: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folioview_rs=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    println!("=== DIAGNOSTIC: Assets → Layout Pipeline ===");
    println!("Reading: {}", args.assets.display());

    let rows = load_assets(&args.assets)?;
    let positive = rows.iter().filter(|r| r.total_value > 0.0).count();
    let total: f64 = rows.iter().map(|r| r.total_value).sum();
    println!("\n[1] Loaded {} rows ({} with positive value)", rows.len(), positive);
    println!("    Total value: {}", format_eur(total));

    // Show top 10 rows by value
    println!("\n[2] Top 10 rows by value:");
    let mut by_value: Vec<_> = rows.iter().collect();
    by_value.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    for (i, row) in by_value.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' ({}) - {} in '{}'",
            i,
            row.name,
            row.identifier(),
            format_eur(row.total_value),
            row.account_name
        );
    }

    let config = LayoutConfig {
        strategy: args.strategy,
        bounds: Bounds::new(0.0, 0.0, args.width, args.height),
        ..LayoutConfig::default()
    };
    let treemap = build_treemap(&rows, &config, &ColorSettings::default());
    println!(
        "\n[3] Layout computed ({:?}): {} tiles in {:.0}x{:.0}",
        config.strategy,
        treemap.tiles.len(),
        args.width,
        args.height
    );

    // Show top 10 largest tiles
    println!("\n[4] Top 10 largest tiles by area:");
    let mut sorted_tiles: Vec<_> = treemap.tiles.iter().collect();
    sorted_tiles.sort_by(|a, b| b.bounds.area().total_cmp(&a.bounds.area()));
    for (i, tile) in sorted_tiles.iter().take(10).enumerate() {
        let b = tile.bounds;
        let aspect = if b.w > 0.0 && b.h > 0.0 {
            b.w.max(b.h) / b.w.min(b.h)
        } else {
            f64::INFINITY
        };
        println!(
            "    [{}] '{}' - rect: {:.1}x{:.1} ({:.0}px²) at ({:.1}, {:.1}) - weight {:.2}% - aspect {:.2}",
            i,
            tile.asset.name,
            b.w,
            b.h,
            b.area(),
            b.x,
            b.y,
            tile.weight_pct,
            aspect
        );
    }

    // Check for anomalies
    println!("\n[5] Checking for anomalies:");
    let viewport_area = args.width * args.height;
    let area_sum: f64 = treemap.tiles.iter().map(|t| t.bounds.area()).sum();
    println!("    Total tile area: {:.0}px²", area_sum);
    println!("    Viewport area:   {:.0}px²", viewport_area);
    if viewport_area > 0.0 {
        println!("    Coverage: {:.3}%", area_sum / viewport_area * 100.0);
    }

    let mut anomalies = 0;
    for tile in &treemap.tiles {
        let b = tile.bounds;
        let expected = tile.weight_pct / 100.0 * viewport_area;
        let out_of_bounds = b.x < -1e-6
            || b.y < -1e-6
            || b.x + b.w > args.width + 1e-6
            || b.y + b.h > args.height + 1e-6;
        let disproportionate = (b.area() - expected).abs() > 1e-6 * viewport_area.max(1.0);
        if out_of_bounds || disproportionate || !b.area().is_finite() {
            anomalies += 1;
            println!(
                "    ✗ '{}' rect {:?} (expected area {:.1})",
                tile.asset.name, b, expected
            );
        }
    }
    if anomalies == 0 {
        println!("    ✓ All tiles inside the viewport and proportional to value");
    }

    let labeled = treemap.tiles.iter().filter(|t| t.label != folioview_rs::render::LabelSize::Hidden).count();
    println!("\n[6] Labelled tiles: {} (out of {})", labeled, treemap.tiles.len());

    Ok(())
}

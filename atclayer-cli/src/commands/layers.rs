//! Layers command - load a data directory and list the hierarchy.

use std::path::Path;

use atclayer::classify::ALL_CATEGORIES;
use atclayer::registry::Handle;
use atclayer::render::{LayerId, LayerKind, MemoryRenderer};
use atclayer::style::format_altitude;

use super::{print_report, start_app};
use crate::error::CliError;

/// Run the layers command.
pub async fn run(data: &Path) -> Result<(), CliError> {
    let (app, report) = start_app(data).await?;

    if app.registry().is_empty() {
        println!("No layers loaded from {}", data.display());
        print_report(&report);
        return Ok(());
    }

    for domain in app.registry().domains() {
        println!("{}", domain.name);
        for facility in domain.facilities() {
            println!("  {}", facility.name);
            for category in ALL_CATEGORIES {
                if !facility.has_category(category) {
                    continue;
                }
                println!("    {}", category);
                for item in facility.items(category) {
                    match &item.handle {
                        Handle::BySector(positions) => {
                            let labels: Vec<String> = positions
                                .iter()
                                .map(|(position, id)| {
                                    position_label(app.renderer(), *id, position)
                                })
                                .collect();
                            println!("      {} [{}]", item.name, labels.join(", "));
                        }
                        Handle::Single(_) => println!("      {}", item.name),
                    }
                }
            }
        }
    }

    print_report(&report);
    Ok(())
}

/// Position label with its altitude band, when the layer carries one.
fn position_label(renderer: &MemoryRenderer, id: LayerId, position: &str) -> String {
    if let Some(LayerKind::Sector(spec)) = renderer.layer(id) {
        if let Some(feature) = spec.features.first() {
            if let (Some(low), Some(high)) = (&feature.low, &feature.high) {
                return format!(
                    "{} {}-{}",
                    position,
                    format_altitude(low),
                    format_altitude(high)
                );
            }
        }
    }
    position.to_string()
}

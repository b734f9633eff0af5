use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use step_planner::domain::EmissionTable;
use step_planner::navitia::{NavitiaClient, NavitiaConfig};
use step_planner::planner::{Planner, SearchConfig, SearchOutcome, SearchRequest};
use step_planner::settings::Settings;
use step_planner::summary::summarize;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("step_planner=info")),
        )
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let emissions = match &settings.emissions_path {
        Some(path) => match EmissionTable::load(path) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Failed to load {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => EmissionTable::default(),
    };

    let client = match NavitiaClient::new(NavitiaConfig::new(&settings.api_key)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create navitia client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let request = SearchRequest::with_derived_radius(
        settings.origin,
        settings.destination,
        settings.target_steps,
        settings.stride,
    );
    println!("Stride length: {:.2} m", settings.stride.stride_m());
    println!(
        "Target: {} steps ({:.0} m), searching stations within {:.0} m",
        request.target_steps,
        request.target_distance_m(),
        request.radius_m
    );

    let search_config = SearchConfig::default();
    let planner = Planner::new(&client, &client, &search_config);

    let outcome = match planner.search(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        SearchOutcome::Found(result) => {
            println!(
                "Best match: {:.0} m of walking for a {:.0} m target ({} queries, {} skipped)",
                result.walking_distance_m,
                result.target_distance_m,
                result.stats.pairs_queried,
                result.stats.failed_calls
            );
            println!();
            println!(
                "{}",
                summarize(&result.itinerary, &settings.stride, &emissions)
            );
            ExitCode::SUCCESS
        }
        SearchOutcome::NoStations {
            origin_candidates,
            destination_candidates,
            radius_m,
        } => {
            println!(
                "No stations found within {radius_m:.0} m ({origin_candidates} near the start, {destination_candidates} near the destination)."
            );
            println!("Try increasing the number of target steps for a larger search area.");
            ExitCode::FAILURE
        }
        SearchOutcome::NoRoute(stats) => {
            println!(
                "No suitable route found ({} queries, {} failed).",
                stats.pairs_queried, stats.failed_calls
            );
            ExitCode::FAILURE
        }
    }
}

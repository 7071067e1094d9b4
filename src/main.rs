use anyhow::Result;
use clap::{Parser, Subcommand};

use network_consolidator::config::Config;
use network_consolidator::consolidate::consolidate_network;
use network_consolidator::network::xml::{read_network_file, write_network_file};
use network_consolidator::stops::{place_stops, write_transit_schedule_file, Point};
use network_consolidator::storage;

#[derive(Parser, Debug)]
#[clap(
    name = "network-consolidator",
    about = "Merge duplicate nodes of a road network and keep its largest strongly connected part"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, global = true, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Consolidate a network file
    Consolidate {
        /// Path to input network XML
        #[clap(long)]
        input: String,

        /// Path for the consolidated network XML
        #[clap(long)]
        output: String,

        /// Maximum distance between nodes merged into one
        #[clap(long, default_value = "1.0")]
        eps: f64,

        /// Optional path for a JSON run summary
        #[clap(long)]
        summary: Option<String>,
    },

    /// Attach stops to the nearest links of a network
    Stops {
        /// Path to network XML (usually a consolidated one)
        #[clap(long)]
        network: String,

        /// Path for the transit schedule XML
        #[clap(long)]
        output: String,

        /// Stop position as X,Y in the network's coordinate system
        #[clap(long = "point", required = true)]
        points: Vec<Point>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    match args.command {
        Command::Consolidate {
            input,
            output,
            eps,
            summary,
        } => {
            let config = Config::new(eps, args.threads);

            let num_threads = config.worker_threads();
            log::info!("Using {} worker threads", num_threads);
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;

            log::info!("Input: {}", input);
            log::info!("Output: {}", output);

            let network = read_network_file(&input)?;
            let consolidation = consolidate_network(&network, &config)?;

            write_network_file(&consolidation.graph.to_network(), &output)?;
            if let Some(summary) = summary {
                storage::save_summary(&consolidation.report, &summary)?;
            }

            log::info!("Consolidation complete. Result saved to {}", output);
        }
        Command::Stops {
            network,
            output,
            points,
        } => {
            let network = read_network_file(&network)?;
            let stops = place_stops(&points, &network);
            write_transit_schedule_file(&stops, &output)?;

            log::info!("{} stops written to {}", stops.len(), output);
        }
    }

    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use campuswalk_cli::output::{
    parse_coordinate, render_inspect, render_nearest, render_walk, OutputFormat,
};
use campuswalk_lib::{
    build_graph, load_map, plan_walk, Coordinate, DirectionOptions, GeocoderConfig, Graph,
    ReverseGeocoder, SpatialIndex,
};

const MAP_PATH_ENV: &str = "CAMPUSWALK_MAP_PATH";
const DEFAULT_MAP_PATH: &str = "campus_map.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Campus walking directions")]
struct Cli {
    /// Map JSON file. Falls back to $CAMPUSWALK_MAP_PATH, then ./campus_map.json.
    #[arg(long, global = true)]
    map: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a walk between two positions and print turn-by-turn directions.
    Route {
        /// Starting position as LAT,LON.
        #[arg(long = "from", value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Coordinate,
        /// Destination as LAT,LON.
        #[arg(long = "to", value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Coordinate,
        /// Fold silent straight-on legs into the preceding instruction.
        #[arg(long)]
        merge_straight: bool,
    },
    /// Show the map node a position snaps to.
    Nearest {
        /// Position as LAT,LON.
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        point: Coordinate,
    },
    /// Summarise the loaded map.
    Inspect,
    /// Look up the place name for a position.
    Geocode {
        /// Position as LAT,LON.
        #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
        point: Coordinate,
        /// Nominatim base URL.
        #[arg(long)]
        geocoder_url: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let map_path = resolve_map_path(cli.map);

    match cli.command {
        Command::Route {
            from,
            to,
            merge_straight,
        } => handle_route(&map_path, from, to, merge_straight, cli.format),
        Command::Nearest { point } => handle_nearest(&map_path, point, cli.format),
        Command::Inspect => handle_inspect(&map_path, cli.format),
        Command::Geocode {
            point,
            geocoder_url,
        } => handle_geocode(point, geocoder_url),
    }
}

fn resolve_map_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(MAP_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAP_PATH))
}

fn load_graph(path: &Path) -> Result<Graph> {
    let map =
        load_map(path).with_context(|| format!("failed to load map from {}", path.display()))?;
    let graph = build_graph(&map)
        .with_context(|| format!("failed to build graph from {}", path.display()))?;
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "map loaded"
    );
    Ok(graph)
}

fn handle_route(
    map_path: &Path,
    from: Coordinate,
    to: Coordinate,
    merge_straight: bool,
    format: OutputFormat,
) -> Result<()> {
    let graph = load_graph(map_path)?;
    let index = SpatialIndex::build(&graph);
    let options = DirectionOptions {
        merge_straight_legs: merge_straight,
    };
    let plan = plan_walk(&graph, &index, from, to, options).context("failed to plan walk")?;
    println!("{}", render_walk(&plan, format)?);
    Ok(())
}

fn handle_nearest(map_path: &Path, point: Coordinate, format: OutputFormat) -> Result<()> {
    let graph = load_graph(map_path)?;
    let index = SpatialIndex::build(&graph);
    let (node, offset) = index.nearest_with_distance(point)?;
    let position = graph.node(node)?.position;
    println!("{}", render_nearest(node, position, offset, format)?);
    Ok(())
}

fn handle_inspect(map_path: &Path, format: OutputFormat) -> Result<()> {
    let graph = load_graph(map_path)?;
    println!("{}", render_inspect(&graph, format)?);
    Ok(())
}

fn handle_geocode(point: Coordinate, geocoder_url: Option<String>) -> Result<()> {
    let mut config = GeocoderConfig::default();
    if let Some(url) = geocoder_url {
        config.base_url = url;
    }
    let geocoder = ReverseGeocoder::new(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let name = runtime
        .block_on(geocoder.reverse(point))
        .context("reverse geocoding failed")?;

    println!("{}", name.as_deref().unwrap_or("Unknown location"));
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use routemap::route::load_route_graph;
use routemap::util::{format_position, short_title};
use routemap::view::{DEFAULT_RESULT_CAP, MapSession, RenderFrame};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Route data: a list of connections or a `{nodes, edges}` document.
    #[arg(long, default_value = "data/world.json")]
    data: PathBuf,
    /// Viewport as "swLng,swLat,neLng,neLat".
    #[arg(long, default_value = "0,0,0,0", allow_hyphen_values = true)]
    bbox: String,
    #[arg(long, default_value_t = DEFAULT_RESULT_CAP)]
    cap: usize,
    /// Select a place by exact title.
    #[arg(long)]
    select: Option<String>,
    /// Select the place at "LAT,LNG", as a marker click would.
    #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
    click: Option<(f64, f64)>,
    /// Hover a place by exact title.
    #[arg(long, conflicts_with = "hover_at")]
    hover: Option<String>,
    /// Hover the place at "LAT,LNG"; only connected places highlight.
    #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
    hover_at: Option<(f64, f64)>,
    /// List visible places whose title fuzzy-matches this text.
    #[arg(long)]
    search: Option<String>,
    /// List the N most connected places in the whole graph.
    #[arg(long)]
    top: Option<usize>,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

fn parse_lat_lng(value: &str) -> Result<(f64, f64)> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("expected \"LAT,LNG\", got {value:?}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid latitude in {value:?}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid longitude in {value:?}"))?;
    Ok((lat, lng))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let graph = load_route_graph(&args.data)?;

    let mut session = MapSession::new(graph).with_cap(args.cap);
    session.set_bounds(&args.bbox)?;

    if let Some((lat, lng)) = args.click
        && session.click_at(lat, lng).is_none()
    {
        warn!(lat, lng, "no visible place at the clicked position");
    }
    if let Some(title) = &args.select
        && session.click_title(title).is_none()
    {
        warn!(%title, "selected place is not visible");
    }
    if let Some(title) = &args.hover {
        session.hover_title(title);
    }
    if let Some((lat, lng)) = args.hover_at {
        session.hover_at(lat, lng);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(limit) = args.top {
        write_top(&mut out, &session, limit)?;
    }
    if let Some(query) = &args.search {
        write_search(&mut out, &session, query)?;
    }

    let frame = session.frame();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &frame).context("failed to write frame")?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_frame(&mut out, &frame)?,
    }

    Ok(())
}

fn write_top(out: &mut impl Write, session: &MapSession, limit: usize) -> Result<()> {
    let graph = session.graph();
    writeln!(out, "most connected places:")?;
    for id in graph.top_by_degree(limit) {
        let node = graph.node(id);
        writeln!(
            out,
            "  {:>4}  {}  ({})",
            graph.degree(id),
            short_title(&node.title),
            format_position(node)
        )?;
    }
    Ok(())
}

fn write_search(out: &mut impl Write, session: &MapSession, query: &str) -> Result<()> {
    let visible = session.visible();
    let hits = visible.search(query);
    writeln!(out, "{} visible match(es) for {query:?}:", hits.len())?;
    for index in hits {
        if let Some(node) = visible.node(index) {
            writeln!(out, "  [{index}] {}", node.title)?;
        }
    }
    Ok(())
}

fn write_frame(out: &mut impl Write, frame: &RenderFrame<'_>) -> Result<()> {
    writeln!(
        out,
        "viewport {}: {} place(s), {} route(s)",
        frame.bound,
        frame.nodes.len(),
        frame.edges.len()
    )?;

    match frame.active {
        Some(active) => {
            writeln!(
                out,
                "selected: {} ({})",
                active.title,
                format_position(active)
            )?;
            writeln!(
                out,
                "{} connected route(s), {} other",
                frame.connected.len(),
                frame.other.len()
            )?;
            for edge in &frame.connected {
                let neighbour = if edge.origin.title == active.title {
                    edge.destination
                } else {
                    edge.origin
                };
                let marker = match frame.hover {
                    Some(hover) if hover.title == neighbour.title => '*',
                    _ => ' ',
                };
                writeln!(out, " {marker} {}", short_title(&neighbour.title))?;
            }
            if let Some(fit) = frame.fit_bounds {
                writeln!(out, "fit to: {fit}")?;
            }
        }
        None => writeln!(out, "nothing selected")?,
    }

    Ok(())
}

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use swipedeck::catalog::{
    Candidate, CandidateKind, CatalogSource, JsonFileCatalog, Level, StaticCatalog,
};
use swipedeck::config::EngineConfig;
use swipedeck::decisions::{DecisionLog, Direction, FileDecisionLog, SubjectId};
use swipedeck::kernel::event::{Event, GestureInput, SideEffect};
use swipedeck::kernel::filter::RawFilter;
use swipedeck::kernel::gesture::Vector2;
use swipedeck::services::backend::RestBackend;
use swipedeck::SessionDriver;

/// Terminal swipe session over the triage engine.
#[derive(Parser, Debug)]
#[command(name = "swipedeck", version)]
struct Args {
    /// Engine configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Catalog as a JSON array. Ignored when a backend is configured.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// JSON-lines decision log. Ignored when a backend is configured.
    #[arg(long, default_value = "decisions.jsonl")]
    decisions: PathBuf,
    #[arg(long, default_value = "local-user")]
    subject: String,
}

fn demo_catalog() -> Vec<Candidate> {
    vec![
        Candidate::new("t-ana", CandidateKind::Teacher, 450.0, Level::Beginner)
            .with_text("Piano lessons for adults")
            .with_tags(["piano", "classical"]),
        Candidate::new("t-bruno", CandidateKind::Teacher, 900.0, Level::Intermediate)
            .with_text("Jazz guitar and improvisation")
            .with_tags(["guitar", "jazz"]),
        Candidate::new("c-sala-3", CandidateKind::Classroom, 1200.0, Level::Intermediate)
            .with_text("Rehearsal room with drum kit")
            .with_tags(["drums", "room"]),
        Candidate::new("t-clara", CandidateKind::Teacher, 1800.0, Level::Advanced)
            .with_text("Conservatory violin preparation")
            .with_tags(["violin", "classical"]),
        Candidate::new("t-dario", CandidateKind::Teacher, 500.0, Level::Beginner)
            .with_text("Singing for beginners")
            .with_tags(["voice", "pop"]),
    ]
}

fn parse_filter(args: &[&str]) -> RawFilter {
    let mut raw = RawFilter::default();
    for arg in args {
        match arg.split_once('=') {
            Some(("level", value)) => raw.level = value.to_string(),
            Some(("price", value)) => raw.price_bucket = value.to_string(),
            Some(("keywords", value)) => {
                raw.keywords = value.split(',').map(str::to_string).collect()
            }
            _ => println!("[FILTER] ignoring '{}'", arg),
        }
    }
    raw
}

fn print_stack(driver: &SessionDriver) {
    let reactor = driver.reactor();
    println!("[STACK] {:?}, {} in queue", reactor.status(), reactor.queue().len());
    for item in &reactor.window().items {
        let c = &item.candidate;
        println!(
            "  depth {} | {} | {:?} | {:.0} | {}",
            item.depth,
            c.id,
            c.level,
            c.price,
            c.searchable_text
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let (log, catalog): (Arc<dyn DecisionLog>, Arc<dyn CatalogSource>) = match &config.backend {
        Some(backend) => {
            tracing::info!("Using backend at {}", backend.base_url);
            let rest = Arc::new(RestBackend::new(backend));
            let log: Arc<dyn DecisionLog> = rest.clone();
            let catalog: Arc<dyn CatalogSource> = rest;
            (log, catalog)
        }
        None => {
            let log: Arc<dyn DecisionLog> =
                Arc::new(FileDecisionLog::open(args.decisions.clone()).await?);
            let catalog: Arc<dyn CatalogSource> = match &args.catalog {
                Some(path) => Arc::new(JsonFileCatalog::new(path.clone())),
                None => Arc::new(StaticCatalog::new(demo_catalog())),
            };
            (log, catalog)
        }
    };

    let mut driver = SessionDriver::new(SubjectId::new(args.subject.clone()), config, log, catalog);

    let mut notices = driver.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            match notice {
                SideEffect::Hint { candidate, hint } => println!("[HINT] {} -> {:?}", candidate, hint),
                SideEffect::ResetCard { candidate } => println!("[CARD] {} back to origin", candidate),
                SideEffect::ExitCard { candidate, direction } => {
                    println!("[CARD] {} leaves ({})", candidate, direction.as_str())
                }
                SideEffect::Accepted(candidate) => {
                    println!("[ACCEPTED] {} is ready for booking", candidate.id)
                }
                SideEffect::CommitFailed { error, .. } => println!("[RETRY] {}", error),
                SideEffect::InputRejected { reason, .. } => println!("[IGNORED] {:?}", reason),
                SideEffect::StackChanged { .. } | SideEffect::Persist(_) => {}
            }
        }
    });

    driver.load().await?;
    print_stack(&driver);
    println!("Commands: show | drag <dx> [vx] | accept | reject | filter k=v.. | accepted | stats | reload | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, rest)) = words.split_first() else {
            continue;
        };

        match *command {
            "show" => {}
            "drag" => {
                let Some(top) = driver.reactor().current_top().map(|c| c.id.clone()) else {
                    println!("[STACK] nothing to drag");
                    continue;
                };
                let dx: f32 = rest.first().unwrap_or(&"0").parse().context("drag distance")?;
                let vx: f32 = rest.get(1).unwrap_or(&"0").parse().context("drag velocity")?;
                let end = Vector2::new(dx, 0.0);
                let flick = Vector2::new(vx, 0.0);
                driver.dispatch(vec![
                    Event::Gesture(GestureInput::Begin { candidate: top }),
                    Event::Gesture(GestureInput::Move { offset: end, velocity: flick }),
                    Event::Gesture(GestureInput::Release { offset: end, velocity: flick }),
                ]);
            }
            "accept" | "reject" => {
                let Some(top) = driver.reactor().current_top().map(|c| c.id.clone()) else {
                    println!("[STACK] nothing to decide");
                    continue;
                };
                let direction = if *command == "accept" { Direction::Accept } else { Direction::Reject };
                driver.dispatch(vec![Event::Button { candidate: top, direction }]);
            }
            "filter" => {
                if let Err(e) = driver.set_filter(&parse_filter(rest)) {
                    println!("[FILTER] {}", e);
                }
            }
            "accepted" => {
                for candidate in driver.reactor().accepted() {
                    match candidate.kind {
                        Some(kind) => println!("  {} ({:?})", candidate.id, kind),
                        None => println!("  {}", candidate.id),
                    }
                }
                continue;
            }
            "stats" => {
                println!("{:#?}", driver.reactor().telemetry.snapshot());
                continue;
            }
            "reload" => driver.load().await?,
            "quit" | "exit" => break,
            other => {
                println!("unknown command '{}'", other);
                continue;
            }
        }

        driver.settle().await;
        print_stack(&driver);
    }

    if driver.pending_writes() > 0 {
        bail!("exiting with {} unconfirmed decisions", driver.pending_writes());
    }
    Ok(())
}

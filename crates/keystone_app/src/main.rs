//! # keystone_app
//!
//! Demonstration wiring for the keystone singleton helpers:
//!
//! 1. Build a [`LocalHost`] and register the demo services.
//! 2. Build a [`SingletonRegistry`] and attach its reconciliation hook to
//!    the host's lifecycle bus.
//! 3. Pick a session runtime: NATS-backed when `NATS_URL` is set, static
//!    otherwise.
//! 4. Acquire singletons from several threads, run the tick loop, change
//!    scene, and show the scene-scoped singleton being recreated.

mod services;
mod tick;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keystone_host::{HostRuntime, LocalHost, SceneId, SessionId};
use keystone_session::{Connection, SessionRuntime, SessionTracker, StaticSession};
use keystone_singleton::{ProcessScoped, SceneScoped, SingletonRegistry};

use services::{MatchDirector, ScoreBoard};
use tick::{TickConfig, TickLoop};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("keystone_app=info".parse()?)
                .add_directive("keystone_singleton=info".parse()?),
        )
        .init();

    info!("keystone demo starting");

    let host = Arc::new(LocalHost::new());
    host.register::<MatchDirector>();
    host.register::<ScoreBoard>();

    let registry = Arc::new(SingletonRegistry::new());
    SingletonRegistry::attach_lifecycle(
        &registry,
        host.hooks(),
        Arc::clone(&host) as Arc<dyn HostRuntime>,
    );

    if std::env::var_os(keystone_session::connection::NATS_URL_ENV).is_some() {
        run_networked(host, registry).await
    } else {
        run_offline(host, registry).await
    }
}

/// Single-process run with a locally-driven session.
async fn run_offline(host: Arc<LocalHost>, registry: Arc<SingletonRegistry>) -> Result<()> {
    let session = Arc::new(StaticSession::new(
        SessionId::random(),
        SceneId::from_name("lobby"),
    ));
    SingletonRegistry::attach_teardown(&registry, session.as_ref());

    demo_process_singleton(&host, &registry);

    let scores = SceneScoped::<ScoreBoard>::new(
        Arc::clone(&registry),
        Arc::clone(&host) as Arc<dyn HostRuntime>,
        Arc::clone(&session) as Arc<dyn SessionRuntime>,
    );

    let lobby_board = scores.get()?;
    info!(instance = %lobby_board.id(), "scoreboard for lobby");

    TickLoop::new(TickConfig {
        tick_rate: 60.0,
        max_ticks: 30,
    })
    .run(&host)
    .await;

    session.change_scene(SceneId::from_name("arena"));
    let arena_board = scores.get()?;
    info!(
        instance = %arena_board.id(),
        recreated = (arena_board != lobby_board),
        "scoreboard for arena"
    );

    info!("keystone demo shut down");
    Ok(())
}

/// Networked run: session state follows the NATS event bus.
async fn run_networked(host: Arc<LocalHost>, registry: Arc<SingletonRegistry>) -> Result<()> {
    let conn = Connection::connect().await?;

    let tracker = Arc::new(SessionTracker::new(
        SessionId::random(),
        SceneId::from_name("lobby"),
    ));
    SingletonRegistry::attach_teardown(&registry, tracker.as_ref());

    let follower = Arc::clone(&tracker);
    let follower_conn = conn.clone();
    tokio::spawn(async move { follower.run(&follower_conn).await });

    info!(
        participant = tracker.participant_id(),
        authority = tracker.is_authority(),
        "joined session bus"
    );

    demo_process_singleton(&host, &registry);

    let scores = SceneScoped::<ScoreBoard>::new(
        Arc::clone(&registry),
        Arc::clone(&host) as Arc<dyn HostRuntime>,
        Arc::clone(&tracker) as Arc<dyn SessionRuntime>,
    );

    let lobby_board = scores.get()?;
    info!(instance = %lobby_board.id(), "scoreboard for lobby");

    TickLoop::new(TickConfig {
        tick_rate: 60.0,
        max_ticks: 30,
    })
    .run(&host)
    .await;

    // Announce a scene change to every participant, ourselves included.
    tracker
        .announce_scene(&conn, SceneId::from_name("arena"))
        .await?;
    let arena_board = scores.get()?;
    info!(
        instance = %arena_board.id(),
        recreated = (arena_board != lobby_board),
        "scoreboard for arena"
    );

    info!("keystone demo shut down");
    Ok(())
}

/// Race several threads at the process-scoped singleton and report.
fn demo_process_singleton(host: &Arc<LocalHost>, registry: &Arc<SingletonRegistry>) {
    let director = Arc::new(ProcessScoped::<MatchDirector>::new(
        Arc::clone(registry),
        Arc::clone(host) as Arc<dyn HostRuntime>,
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let director = Arc::clone(&director);
            std::thread::spawn(move || director.get().map(|handle| handle.id()))
        })
        .collect();
    for handle in handles {
        if let Ok(Ok(id)) = handle.join() {
            info!(instance = %id, "match director acquired");
        }
    }

    info!(
        created = host.created_count(),
        "creations after concurrent access"
    );

    if let Ok(handle) = director.get()
        && let Some(director) = handle.downcast::<MatchDirector>()
    {
        let round = director.advance_round();
        info!(round, "match director advanced");
    }
}

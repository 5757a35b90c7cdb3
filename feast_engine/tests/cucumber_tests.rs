mod cucumber;

use ::cucumber::{codegen::LocalBoxFuture, event::ScenarioFinished, gherkin, writer, World};
use feast_engine::FeastDatabase;
use futures_util::FutureExt;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tokio::runtime::Runtime;

use crate::cucumber::FeastWorld;

fn main() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let sys = Runtime::new().unwrap();
    sys.block_on(
        FeastWorld::cucumber()
            .with_writer(writer::Libtest::or_basic())
            .after(|_f, _r, scenario, ev, w| tear_down(scenario, ev, w))
            .run("tests/features"),
    );
    info!("🚀️ Tests complete");
}

/// Releases whatever the scenario left open (tracking feeds, live queries), then closes the database. The database
/// file is kept when the scenario failed so it can be inspected.
fn tear_down<'a>(
    scenario: &'a gherkin::Scenario,
    ev: &'a ScenarioFinished,
    world: Option<&'a mut FeastWorld>,
) -> LocalBoxFuture<'a, ()> {
    async move {
        let Some(world) = world else {
            warn!("🚀️ No world for \"{}\". Nothing to clean up.", scenario.name);
            return;
        };
        world.release_live_views().await;
        let Some(sys) = world.system.as_ref() else {
            return;
        };
        let listeners = sys.feast.db().change_feed_listeners();
        let watches = sys.location.active_watches();
        if listeners > 0 || watches > 0 {
            error!(
                "🚀️ \"{}\" leaked {listeners} change feed listeners and {watches} position watches",
                scenario.name
            );
        }
        let mut db = sys.feast.db().clone();
        if let Err(e) = db.close().await {
            error!("🚀️ Failed to close database {}: {e}", sys.db_path);
        }
        match ev {
            ScenarioFinished::StepPassed => {
                trace!("🚀️ Removing database {}", sys.db_path);
                if let Err(e) = Sqlite::drop_database(&sys.db_path).await {
                    warn!("🚀️ Could not remove database {}: {e}", sys.db_path);
                }
            },
            _ => error!("🚀️ \"{}\" did not pass. Database retained: {}", scenario.name, sys.db_path),
        }
    }
    .boxed_local()
}

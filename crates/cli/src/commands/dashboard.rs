use anyhow::Context;
use chrono::Utc;

use materials_auth::Page;
use materials_client::{DashboardView, RefreshScheduler};
use materials_infra::PgListenFeed;
use materials_inventory::DashboardWindow;

use crate::app::App;
use crate::render;

pub async fn run(app: &App, watch: bool) -> anyhow::Result<()> {
    let session = app.enter(Page::Dashboard).await?;
    let window = DashboardWindow {
        days: app.config.dashboard_days,
        ..DashboardWindow::default()
    };

    if !watch {
        let snapshot = app.ledger.dashboard(&session, Utc::now(), window).await?;
        print!("{}", render::dashboard(&snapshot));
        return Ok(());
    }

    let database_url = app
        .config
        .database_url
        .as_deref()
        .context("--watch needs MATERIALS_DATABASE_URL for change notifications")?;
    let feed = PgListenFeed::connect(database_url, &app.config.change_channels).await?;

    let view = DashboardView::new(
        app.ledger.clone(),
        session,
        window,
        app.navigator.generation().clone(),
    );
    let scheduler = RefreshScheduler::new(app.config.refresh_quiet);
    let mut updates = view.subscribe();

    let printer = async {
        while updates.changed().await.is_ok() {
            if let Some(snapshot) = updates.borrow_and_update().clone() {
                println!("--- {} ---", snapshot.generated_at.format("%d/%m/%Y %H:%M:%S"));
                print!("{}", render::dashboard(&snapshot));
            }
        }
    };

    tokio::select! {
        runs = view.watch(feed, &scheduler) => {
            tracing::info!(runs, "change feed ended");
        }
        _ = printer => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for Ctrl-C")?;
            scheduler.shutdown();
        }
    }
    Ok(())
}

use materials_auth::Page;

use crate::app::App;
use crate::render;

pub async fn history(app: &App, limit: usize) -> anyhow::Result<()> {
    let session = app.enter(Page::History).await?;
    let mut rows = app.ledger.history(&session).await?;
    rows.truncate(limit);
    print!("{}", render::history(&rows));
    Ok(())
}

pub async fn ranking(app: &App) -> anyhow::Result<()> {
    let session = app.enter(Page::Ranking).await?;
    let rows = app.ledger.ranking(&session).await?;
    print!("{}", render::ranking(&rows));
    Ok(())
}

use materials_auth::Page;
use materials_inventory::{CategoryFilter, StockFilter};

use crate::app::App;
use crate::render;

pub async fn run(
    app: &App,
    search: Option<String>,
    category: Option<String>,
    include_inactive: bool,
    below_min: bool,
) -> anyhow::Result<()> {
    let session = app.enter(Page::Stock).await?;
    let rows = app.ledger.stock(&session).await?;

    let filter = StockFilter {
        query: search.unwrap_or_default(),
        category: category.map_or(CategoryFilter::All, CategoryFilter::Named),
        only_active: !include_inactive,
        only_below_min: below_min,
    };
    print!("{}", render::stock(&filter.apply(&rows)));
    Ok(())
}

use article_views::{Analytics, ArticleViews, MemoryStore};
use chrono::NaiveDate;

fn main() -> article_views::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let day = |d| NaiveDate::from_ymd_opt(2012, 6, d).unwrap();
    let views = ArticleViews::new(MemoryStore::new());

    views.view_article("home", 5, day(12))?;
    views.view_article("home", 5, day(14))?;
    views.view_article("home", 6, day(14))?;
    views.view_article("about", 6, day(14))?;
    views.view_article("about", 7, day(20))?;

    println!("home on 2012-06-14 = {}", views.article_views("home", day(14))?);
    println!("home in June 2012 = {}", views.article_monthly_views("home", 6, 2012)?);
    println!(
        "about from 2012-06-12 to 2012-06-14 = {}",
        views.article_daterange_views("about", day(12), day(14))?
    );

    for (doc, count) in Analytics::new(&views).date_range_views(day(1), day(30))?.iter() {
        println!("{doc}: {count}");
    }
    Ok(())
}

use crate::client::Method;
use crate::runner::context::TestContext;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;

/// Days covered by the dashboard queries, ending today
pub const WINDOW_DAYS: i64 = 30;

/// `(start, end)` dates of the trailing window, formatted `YYYY-MM-DD`
pub fn date_window(today: NaiveDate) -> (String, String) {
    let start = today - Duration::days(WINDOW_DAYS);
    (
        start.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

const AGGREGATES: [(&str, u16); 8] = [
    ("dados-dashboard/top-produtos", 54),
    ("dados-dashboard/grafico", 55),
    ("dados-dashboard/infos-adicionais", 56),
    ("dados-dashboard/top-sellers", 57),
    ("dados-dashboard/providers", 58),
    ("dados-dashboard/acquirer", 59),
    ("faturamento-whitelabel", 60),
    ("whitelabel-financeiro", 61),
];

pub async fn dashboard(ctx: &mut TestContext) {
    ctx.header("Dashboard");

    let (start, end) = date_window(Utc::now().date_naive());
    let range = json!({ "startDate": start, "endDate": end });

    ctx.invoke("dados-dashboard", Method::Post, range.clone(), Some(52))
        .await;
    ctx.get(&format!("analytics-reports/top-sellers/{}/{}", start, end), 53)
        .await;
    for (operation, tag) in AGGREGATES {
        ctx.invoke(operation, Method::Post, range.clone(), Some(tag))
            .await;
    }
}

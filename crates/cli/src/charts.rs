//! ECharts rendering of the portfolio series.
//!
//! Charts are built with `charming` and written into a standalone HTML page
//! that loads ECharts from a CDN, one container per chart.

use charming::{
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Tooltip, Trigger},
    series::{Line, Pie},
    Chart,
};

use btc_tracker_core::models::chart::{CapitalAllocation, ChartDataPoint, EntryPricePoint};

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

/// A chart and the id of the element it renders into.
pub struct PageChart {
    pub id: &'static str,
    pub chart: Chart,
}

fn grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

/// Money spent so far against what the stack is worth now.
pub fn portfolio_chart(points: &[ChartDataPoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
    let spent: Vec<f64> = points.iter().map(|p| p.cumulative_spent as f64).collect();
    let value: Vec<f64> = points.iter().map(|p| p.current_value.round()).collect();
    let pnl: Vec<f64> = points.iter().map(|p| p.pnl.round()).collect();

    Chart::new()
        .title(Title::new().text("Portfolio").subtext("Cumulative, valued at the current price"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().right("4%"))
        .grid(grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Line::new().name("Spent (IDR)").data(spent))
        .series(Line::new().name("Value (IDR)").data(value))
        .series(Line::new().name("P&L (IDR)").data(pnl))
}

pub fn entry_price_chart(points: &[EntryPricePoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
    let entry: Vec<f64> = points.iter().map(|p| p.entry_price.round()).collect();
    let current: Vec<f64> = points.iter().map(|p| p.current_price.round()).collect();

    Chart::new()
        .title(Title::new().text("Entry price").subtext("Price paid per BTC"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().right("4%"))
        .grid(grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Line::new().name("Entry price").data(entry))
        .series(Line::new().name("Current price").data(current))
}

pub fn allocation_chart(allocation: &CapitalAllocation) -> Chart {
    let pl_label = if allocation.is_profit() { "Profit" } else { "Loss" };
    Chart::new()
        .title(Title::new().text("Capital allocation"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("2%"))
        .series(
            Pie::new()
                .name("Capital")
                .radius(vec!["40%", "70%"])
                .data(vec![
                    (allocation.invested.round(), "Invested"),
                    (allocation.profit_loss.abs().round(), pl_label),
                ]),
        )
}

/// Standalone page with every chart stacked vertically.
pub fn render_page(title: &str, charts: &[PageChart]) -> String {
    let containers = charts
        .iter()
        .map(|c| format!(r#"<div id="{}" style="width:100%;height:380px;margin-bottom:24px"></div>"#, c.id))
        .collect::<Vec<_>>()
        .join("\n");

    let scripts = charts
        .iter()
        .map(|c| {
            format!(
                r#"(function() {{
    const chart = echarts.init(document.getElementById("{}"));
    chart.setOption({});
    window.addEventListener('resize', chart.resize);
}})();"#,
                c.id,
                c.chart
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{ECHARTS_CDN}"></script>
</head>
<body style="max-width:1000px;margin:0 auto;font-family:sans-serif">
<h1>{title}</h1>
{containers}
<script>
{scripts}
</script>
</body>
</html>
"#
    )
}

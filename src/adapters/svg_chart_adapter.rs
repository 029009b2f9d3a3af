//! SVG charts: equity curves for both series and a bar chart of the metrics
//! record.

use std::fmt::Write as _;

use crate::domain::backtest::BacktestResult;
use crate::domain::equity::EquitySeries;
use crate::domain::error::VoltimerError;
use crate::domain::metrics::Comparison;
use crate::ports::report_port::ReportPort;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

const STRATEGY_COLOR: &str = "#2563eb";
const BENCHMARK_COLOR: &str = "#9ca3af";

fn svg_open(svg: &mut String, height: f64) {
    let _ = write!(
        svg,
        r##"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"##,
        w = CHART_WIDTH,
        h = height
    );
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
}

fn axes(svg: &mut String) {
    let _ = writeln!(
        svg,
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    );
    let _ = writeln!(
        svg,
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    );
}

fn label(svg: &mut String, x: f64, y: f64, anchor: &str, text: &str) {
    let _ = writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"{}\" font-size=\"10\" fill=\"#666\">{}</text>",
        x, y, anchor, text
    );
}

/// Both equity curves on shared axes. Empty string when there is nothing to plot.
pub fn equity_svg(strategy: &EquitySeries, benchmark: &EquitySeries) -> String {
    let len = strategy.len().max(benchmark.len());
    if len == 0 {
        return String::new();
    }

    let all = strategy.points.iter().chain(&benchmark.points).map(|p| p.equity);
    let min_equity = all.clone().fold(f64::INFINITY, f64::min);
    let max_equity = all.fold(f64::NEG_INFINITY, f64::max);
    let range = (max_equity - min_equity).max(1e-9);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_scale = |i: usize| MARGIN_LEFT + (i as f64 / (len - 1).max(1) as f64) * plot_width;
    let y_scale =
        |v: f64| MARGIN_TOP + plot_height - ((v - min_equity) / range) * plot_height;

    let path = |series: &EquitySeries| {
        let mut d = String::new();
        for (i, point) in series.points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            let _ = write!(d, "{} {:.1} {:.1}", cmd, x_scale(i), y_scale(point.equity));
        }
        d
    };

    let dates = if strategy.len() >= benchmark.len() {
        strategy
    } else {
        benchmark
    };
    let start_date = dates.points[0].date;
    let mid_date = dates.points[len / 2].date;
    let end_date = dates.points[len - 1].date;

    let mut svg = String::new();
    svg_open(&mut svg, CHART_HEIGHT);
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"15\" text-anchor=\"middle\" font-size=\"12\" fill=\"#333\">Equity Curve: Buy &amp; Hold vs Volatility-Timing Strategy</text>",
        CHART_WIDTH / 2.0
    );
    axes(&mut svg);
    label(&mut svg, MARGIN_LEFT - 5.0, MARGIN_TOP + 5.0, "end", &format!("{:.2}", max_equity));
    label(
        &mut svg,
        MARGIN_LEFT - 5.0,
        MARGIN_TOP + plot_height / 2.0,
        "end",
        &format!("{:.2}", (max_equity + min_equity) / 2.0),
    );
    label(
        &mut svg,
        MARGIN_LEFT - 5.0,
        CHART_HEIGHT - MARGIN_BOTTOM - 5.0,
        "end",
        &format!("{:.2}", min_equity),
    );
    label(&mut svg, MARGIN_LEFT, CHART_HEIGHT - 5.0, "middle", &start_date.to_string());
    label(
        &mut svg,
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 5.0,
        "middle",
        &mid_date.to_string(),
    );
    label(
        &mut svg,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - 5.0,
        "middle",
        &end_date.to_string(),
    );

    for (series, color, name) in [
        (benchmark, BENCHMARK_COLOR, "Buy &amp; Hold"),
        (strategy, STRATEGY_COLOR, "Volatility Strategy"),
    ] {
        if series.is_empty() {
            continue;
        }
        let _ = writeln!(
            svg,
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"><title>{}</title></path>",
            path(series),
            color,
            name
        );
    }
    legend(&mut svg);
    svg.push_str("</svg>");
    svg
}

fn legend(svg: &mut String) {
    let x = MARGIN_LEFT + 10.0;
    for (i, (color, name)) in [
        (BENCHMARK_COLOR, "Buy &amp; Hold"),
        (STRATEGY_COLOR, "Volatility Strategy"),
    ]
    .iter()
    .enumerate()
    {
        let y = MARGIN_TOP + 10.0 + i as f64 * 14.0;
        let _ = writeln!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"10\" height=\"10\" fill=\"{}\"/>",
            x,
            y - 9.0,
            color
        );
        label(svg, x + 14.0, y, "start", name);
    }
}

/// Grouped bars: one group per metric, one bar per series. Percent metrics
/// are scaled by 100 as in the metrics table.
pub fn metrics_svg(comparison: &Comparison) -> String {
    let groups: [(&str, f64, f64); 4] = [
        (
            "Annual Return (%)",
            comparison.strategy.annual_return * 100.0,
            comparison.benchmark.annual_return * 100.0,
        ),
        (
            "Annual Vol (%)",
            comparison.strategy.annual_volatility * 100.0,
            comparison.benchmark.annual_volatility * 100.0,
        ),
        (
            "Sharpe",
            comparison.strategy.sharpe_ratio,
            comparison.benchmark.sharpe_ratio,
        ),
        (
            "Max DD (%)",
            comparison.strategy.max_drawdown * 100.0,
            comparison.benchmark.max_drawdown * 100.0,
        ),
    ];

    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let max_abs = groups
        .iter()
        .flat_map(|(_, s, b)| [finite(*s).abs(), finite(*b).abs()])
        .fold(0.0_f64, f64::max)
        .max(1e-9);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let zero_y = MARGIN_TOP + plot_height / 2.0;
    let half = plot_height / 2.0;
    let group_width = plot_width / groups.len() as f64;
    let bar_width = group_width * 0.3;

    let mut svg = String::new();
    svg_open(&mut svg, CHART_HEIGHT);
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"15\" text-anchor=\"middle\" font-size=\"12\" fill=\"#333\">Strategy vs Buy &amp; Hold</text>",
        CHART_WIDTH / 2.0
    );
    axes(&mut svg);
    let _ = writeln!(
        svg,
        "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"#999\" stroke-width=\"1\"/>",
        MARGIN_LEFT,
        zero_y,
        CHART_WIDTH - MARGIN_RIGHT,
        zero_y
    );

    for (g, (name, strategy, benchmark)) in groups.iter().enumerate() {
        let center = MARGIN_LEFT + group_width * (g as f64 + 0.5);
        for (offset, value, color) in [
            (-bar_width, *strategy, STRATEGY_COLOR),
            (0.0, *benchmark, BENCHMARK_COLOR),
        ] {
            let height = finite(value).abs() / max_abs * half;
            let top = if value >= 0.0 { zero_y - height } else { zero_y };
            let _ = writeln!(
                svg,
                "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"><title>{:.2}</title></rect>",
                center + offset,
                top,
                bar_width,
                height,
                color,
                value
            );
        }
        label(&mut svg, center, CHART_HEIGHT - 5.0, "middle", name);
    }
    legend(&mut svg);
    svg.push_str("</svg>");
    svg
}

/// Renders the equity chart and the metrics chart stacked in one SVG file.
pub struct SvgChartReport;

impl ReportPort for SvgChartReport {
    fn render(&self, result: &BacktestResult) -> Result<Vec<u8>, VoltimerError> {
        let equity = equity_svg(&result.strategy_equity, &result.benchmark_equity);
        let metrics = metrics_svg(&result.metrics);

        let total_height = CHART_HEIGHT * 2.0;
        let mut svg = String::new();
        svg_open(&mut svg, total_height);
        svg.push_str(&equity.replacen("<svg ", "<svg x=\"0\" y=\"0\" ", 1));
        svg.push('\n');
        svg.push_str(&metrics.replacen("<svg ", &format!("<svg x=\"0\" y=\"{}\" ", CHART_HEIGHT), 1));
        svg.push_str("\n</svg>\n");

        Ok(svg.into_bytes())
    }
}

//! Chart generation and rendering for the reports page.
//!
//! Charts are built with `charming` and handed to ECharts in the browser as
//! JSON options:
//! - **Spending Chart**: expense totals per bucket as a line chart
//! - **Category Chart**: expense totals per category as a donut chart

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    html::HeadElement,
    report::buckets::{ExpenseReport, ReportPeriod},
    settings::Currency,
    transaction::display_category,
};

/// A report chart with its HTML container ID and ECharts configuration.
pub(super) struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for report charts.
pub(super) fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript that initializes each chart with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[ReportChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn period_subtext(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Daily => "Last seven days",
        ReportPeriod::Weekly => "Last four weeks",
        ReportPeriod::Monthly => "Last six months",
    }
}

pub(super) fn spending_chart(
    report: &ExpenseReport,
    period: ReportPeriod,
    currency: Currency,
) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Spending")
                .subtext(period_subtext(period)),
        )
        .tooltip(currency_tooltip(currency))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(report.labels.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency))),
        )
        .series(Line::new().name("Expenses").data(report.totals.clone()))
}

pub(super) fn category_chart(
    report: &ExpenseReport,
    period: ReportPeriod,
    currency: Currency,
) -> Chart {
    let data: Vec<(f64, String)> = report
        .categories
        .iter()
        .map(|(category, total)| (*total, display_category(category)))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Spending by Category")
                .subtext(period_subtext(period)),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(currency)),
        )
        .legend(Legend::new().left("center").top("bottom"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

#[inline]
fn currency_formatter(currency: Currency) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";",
            currency.code()
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency: Currency) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

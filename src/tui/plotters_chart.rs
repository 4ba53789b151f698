//! Plotters-powered response-curve widget for Ratatui.
//!
//! Shows the selected grade's titre as a function of density at the current
//! TS, with the current measurement marked on the curve.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call (see
/// `response_series`), which keeps them testable without a terminal.
pub struct TitrePlottersChart<'a> {
    /// Model curve over the density range.
    pub curve: &'a [(f64, f64)],
    /// Current (density, titre), if finite.
    pub marker: Option<(f64, f64)>,
    /// X bounds (density, kg/m³).
    pub x_bounds: [f64; 2],
    /// Y bounds (titre, %).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for TitrePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255); // cyan
            let marker_color = RGBColor(255, 255, 0); // yellow

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a small cross
            // of pixels reads better in a terminal.
            if let Some((x, y)) = self.marker {
                let dx = (x1 - x0) / 200.0;
                let dy = (y1 - y0) / 100.0;
                let cross = [(x, y), (x - dx, y), (x + dx, y), (x, y - dy), (x, y + dy)];
                chart.draw_series(cross.into_iter().map(|p| Pixel::new(p, marker_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

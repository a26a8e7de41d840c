// SVG renderer - Draws a chart scene onto a plotters SVG backend
use crate::application::chart_view::{MARGIN_BOTTOM, MARGIN_LEFT, MARGIN_RIGHT, MARGIN_TOP};
use crate::domain::scene::{ChartScene, Point, SeriesLayer};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub type RenderError = DrawingAreaErrorKind<std::io::Error>;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
const GRID: RGBColor = RGBColor(230, 230, 230);
const AXIS: RGBColor = RGBColor(102, 102, 102);
const FALLBACK_SERIES: RGBColor = RGBColor(128, 128, 128);

const MARKER_AREA: f64 = 30.0;
const FOCUS_RADIUS: i32 = 5;
const LINE_WIDTH: u32 = 2;
/// Polyline points per cubic segment of a monotone curve.
const CURVE_STEPS: usize = 8;

/// Render one chart as a standalone SVG document.
///
/// Scene geometry is already in plot pixels, so it is drawn straight onto the
/// plot area. Hidden charts keep their frame and axes but no series.
pub fn render_svg(scene: &ChartScene) -> Result<String, RenderError> {
    let width = scene.width.max(0.0);
    let height = scene.height.max(0.0);
    let outer = (
        (width + MARGIN_LEFT + MARGIN_RIGHT).round() as u32,
        (height + MARGIN_TOP + MARGIN_BOTTOM).round() as u32,
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, outer).into_drawing_area();
        root.fill(&BACKGROUND)?;
        let plot = root.margin(
            MARGIN_TOP as i32,
            MARGIN_BOTTOM as i32,
            MARGIN_LEFT as i32,
            MARGIN_RIGHT as i32,
        );

        draw_grid(&plot, scene, width, height)?;
        draw_axis_labels(&root, scene, width, height)?;

        if scene.visible {
            for layer in scene.series.iter().filter(|l| l.visible && !l.points.is_empty()) {
                draw_series(&plot, layer, width)?;
            }
            for focus in scene.focus.iter().filter(|f| in_plot(f.point, width)) {
                let color = parse_color(&focus.color);
                plot.draw(&Circle::new(pixel(focus.point), FOCUS_RADIUS, color.filled()))?;
            }
        }

        root.present()?;
    }
    Ok(svg)
}

fn draw_grid(
    plot: &Area<'_>,
    scene: &ChartScene,
    width: f64,
    height: f64,
) -> Result<(), RenderError> {
    let right = width.round() as i32;
    let bottom = height.round() as i32;
    for tick in &scene.y_ticks {
        let y = tick.position.round() as i32;
        plot.draw(&PathElement::new(vec![(0, y), (right, y)], GRID.stroke_width(1)))?;
    }
    plot.draw(&PathElement::new(vec![(0, 0), (0, bottom)], AXIS.stroke_width(1)))?;
    plot.draw(&PathElement::new(vec![(0, bottom), (right, bottom)], AXIS.stroke_width(1)))?;
    Ok(())
}

/// Tick labels sit in the margins, so they are placed on the full canvas.
fn draw_axis_labels(
    root: &Area<'_>,
    scene: &ChartScene,
    width: f64,
    height: f64,
) -> Result<(), RenderError> {
    let left = MARGIN_LEFT.round() as i32;
    let top = MARGIN_TOP.round() as i32;
    let font = ("sans-serif", 11).into_font().color(&AXIS);

    let y_label = font.pos(Pos::new(HPos::Right, VPos::Center));
    for tick in &scene.y_ticks {
        let at = (left - 6, top + tick.position.round() as i32);
        root.draw(&Text::new(tick.label.clone(), at, y_label.clone()))?;
    }

    let x_label = font.pos(Pos::new(HPos::Center, VPos::Top));
    let baseline = top + height.round() as i32 + 6;
    for tick in scene.x_ticks.iter().filter(|t| t.position >= 0.0 && t.position <= width) {
        let at = (left + tick.position.round() as i32, baseline);
        root.draw(&Text::new(tick.label.clone(), at, x_label.clone()))?;
    }
    Ok(())
}

fn draw_series(plot: &Area<'_>, layer: &SeriesLayer, width: f64) -> Result<(), RenderError> {
    let color = parse_color(&layer.color);
    for run in clip_to_width(&monotone_points(&layer.points), width) {
        let path: Vec<(i32, i32)> = run.into_iter().map(pixel).collect();
        plot.draw(&PathElement::new(path, color.stroke_width(LINE_WIDTH)))?;
    }
    for point in layer.points.iter().copied().filter(|p| in_plot(*p, width)) {
        plot.draw(&Polygon::new(diamond(point), color.filled()))?;
    }
    Ok(())
}

/// Diamond marker of `MARKER_AREA` square pixels centred on `center`.
fn diamond(center: Point) -> Vec<(i32, i32)> {
    let tan30 = (1.0f64 / 3.0).sqrt();
    let dy = (MARKER_AREA / (tan30 * 2.0)).sqrt();
    let dx = dy * tan30;
    [(0.0, -dy), (dx, 0.0), (0.0, dy), (-dx, 0.0)]
        .into_iter()
        .map(|(x, y)| pixel(Point::new(center.x + x, center.y + y)))
        .collect()
}

/// Polyline through `points` following a monotone cubic in x, so the line
/// never overshoots between two samples.
fn monotone_points(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let tangents = monotone_tangents(points);
    let mut curve = Vec::with_capacity(1 + (points.len() - 1) * CURVE_STEPS);
    curve.push(points[0]);
    for (i, pair) in points.windows(2).enumerate() {
        let (p0, p1) = (pair[0], pair[1]);
        let dx = (p1.x - p0.x) / 3.0;
        let c0 = Point::new(p0.x + dx, p0.y + dx * tangents[i]);
        let c1 = Point::new(p1.x - dx, p1.y - dx * tangents[i + 1]);
        for step in 1..=CURVE_STEPS {
            curve.push(bezier(p0, c0, c1, p1, step as f64 / CURVE_STEPS as f64));
        }
    }
    curve
}

fn bezier(p0: Point, c0: Point, c1: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point::new(
        b0 * p0.x + b1 * c0.x + b2 * c1.x + b3 * p1.x,
        b0 * p0.y + b1 * c0.y + b2 * c1.y + b3 * p1.y,
    )
}

fn monotone_tangents(points: &[Point]) -> Vec<f64> {
    let n = points.len();
    let secant = |i: usize| {
        let h = points[i + 1].x - points[i].x;
        if h == 0.0 {
            None
        } else {
            Some((points[i + 1].y - points[i].y) / h)
        }
    };
    let sign = |v: f64| if v < 0.0 { -1.0 } else { 1.0 };

    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        let (h0, h1) = (points[i].x - points[i - 1].x, points[i + 1].x - points[i].x);
        tangents[i] = match (secant(i - 1), secant(i)) {
            (Some(s0), Some(s1)) => {
                let p = (s0 * h1 + s1 * h0) / (h0 + h1);
                let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
                if t.is_finite() { t } else { 0.0 }
            }
            _ => 0.0,
        };
    }

    let end_tangent = |secant: Option<f64>, neighbour: f64| match secant {
        Some(s) => (3.0 * s - neighbour) / 2.0,
        None => neighbour,
    };
    tangents[0] = end_tangent(secant(0), tangents[1]);
    tangents[n - 1] = end_tangent(secant(n - 2), tangents[n - 2]);
    tangents
}

/// Split a polyline into the runs that fall inside `[0, width]` horizontally.
fn clip_to_width(points: &[Point], width: f64) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], width) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    flush(&mut runs, &mut current);
                    current.push(start);
                }
                current.push(end);
            }
            None => flush(&mut runs, &mut current),
        }
    }
    flush(&mut runs, &mut current);
    runs
}

fn flush(runs: &mut Vec<Vec<Point>>, current: &mut Vec<Point>) {
    if current.len() >= 2 {
        runs.push(std::mem::take(current));
    }
    current.clear();
}

fn clip_segment(a: Point, b: Point, width: f64) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    if dx == 0.0 {
        return (a.x >= 0.0 && a.x <= width).then_some((a, b));
    }
    let (t0, t1) = ((0.0 - a.x) / dx, (width - a.x) / dx);
    let enter = t0.min(t1).max(0.0);
    let exit = t0.max(t1).min(1.0);
    (enter <= exit).then(|| (lerp(a, b, enter), lerp(a, b, exit)))
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

fn in_plot(point: Point, width: f64) -> bool {
    point.x >= 0.0 && point.x <= width
}

fn pixel(point: Point) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}

/// `#rrggbb` colors from the metric config; anything else draws grey.
fn parse_color(text: &str) -> RGBColor {
    let hex = text.trim_start_matches('#');
    if !text.starts_with('#') || hex.len() != 6 || !hex.is_ascii() {
        return FALLBACK_SERIES;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => FALLBACK_SERIES,
    }
}

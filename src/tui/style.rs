//! Color constants and auto-scaling helpers for the TUI.

use ratatui::style::Color;

/// Allocated MW line color.
pub const ALLOCATED_COLOR: Color = Color::Cyan;
/// Shed MW line color.
pub const SHED_COLOR: Color = Color::Red;
/// Gauge color when utilization is low (< 70%).
pub const LOAD_LOW: Color = Color::Green;
/// Gauge color when utilization is high (>= 70%).
pub const LOAD_MID: Color = Color::Yellow;
/// Gauge color when nearly full (>= 90%).
pub const LOAD_HIGH: Color = Color::Red;
/// Gauge color for an offline substation.
pub const OFFLINE: Color = Color::Magenta;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;

/// Returns a gauge color for a substation's utilization and availability.
pub fn load_color(utilization: f64, online: bool) -> Color {
    if !online {
        OFFLINE
    } else if utilization >= 0.9 {
        LOAD_HIGH
    } else if utilization >= 0.7 {
        LOAD_MID
    } else {
        LOAD_LOW
    }
}

/// Computes Y-axis bounds from chart data points, starting at zero with 10%
/// headroom.
pub fn auto_bounds_y(allocated: &[(f64, f64)], shed: &[(f64, f64)]) -> [f64; 2] {
    let max = allocated
        .iter()
        .chain(shed.iter())
        .map(|&(_, y)| y)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() || max <= 0.0 {
        return [0.0, 1.0];
    }
    [0.0, max * 1.1]
}

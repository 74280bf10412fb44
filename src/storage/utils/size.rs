const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

/// Render a byte count with a binary unit suffix, e.g. `1.5K` or `512B`.
pub fn format_size(size: u64) -> String {
    let mut unit = 0;
    let mut scaled = size as f64;
    while scaled >= 1024.0 && unit + 1 < UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }
    match unit {
        0 => format!("{size}B"),
        _ => format!("{scaled:.1}{}", UNITS[unit]),
    }
}

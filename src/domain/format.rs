// Display formatting helpers

const BYTE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with two decimals, e.g. `1.5 MB`
pub fn format_bytes(bytes: f64) -> String {
    format_bytes_with(bytes, 2)
}

/// Format a byte count using 1024-based units.
///
/// Trailing zeros are trimmed, so 1024 renders as `1 KB` rather than `1.00 KB`.
/// Anything at or below zero (or not finite) renders as `0 Bytes`.
pub fn format_bytes_with(bytes: f64, decimals: usize) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 Bytes".to_string();
    }

    let k = 1024_f64;
    let exponent = (bytes.ln() / k.ln()).floor().max(0.0) as usize;
    let exponent = exponent.min(BYTE_UNITS.len() - 1);
    let scaled = bytes / k.powi(exponent as i32);

    format!("{} {}", trim_decimals(scaled, decimals), BYTE_UNITS[exponent])
}

/// CPU utilisation as shown in the instance table, e.g. `10%` or `12.5%`
pub fn format_percent(value: f64) -> String {
    format!("{}%", trim_decimals(value, 2))
}

/// Dollar amount with cents
pub fn format_cost(value: f64) -> String {
    format!("${:.2}", value)
}

fn trim_decimals(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

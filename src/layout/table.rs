//! Table column resolution.

/// Resolve declared column widths against the table's content width.
///
/// Entries `<= 0` are flexible and share what the fixed columns leave,
/// equally. Fixed columns are never shrunk: when they alone exceed the
/// content width the result is simply wider than the table.
pub fn resolve_columns(declared: &[f64], content_width: f64) -> Vec<f64> {
    if declared.is_empty() {
        return vec![content_width.max(0.0)];
    }

    let mut widths = Vec::with_capacity(declared.len());
    let mut remaining = content_width;
    let mut flexible = 0;

    for &w in declared {
        if w > 0.0 {
            widths.push(w);
            remaining -= w;
        } else {
            widths.push(0.0);
            flexible += 1;
        }
    }

    if flexible > 0 {
        let share = (remaining / flexible as f64).max(0.0);
        for (w, &declared) in widths.iter_mut().zip(declared) {
            if declared <= 0.0 {
                *w = share;
            }
        }
    }

    widths
}

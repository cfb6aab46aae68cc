use crate::config::NOT_AVAILABLE;

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Count with separators.
pub fn count(n: usize) -> String {
    thousands(n as u64)
}

/// Rounded, separated number; `N/A` for NaN or negatives out of range.
pub fn rounded(v: f64) -> String {
    if !v.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let r = v.round();
    if r < 0.0 {
        format!("-{}", thousands(r.abs() as u64))
    } else {
        thousands(r as u64)
    }
}

/// `$12,345`.
pub fn currency(v: f64) -> String {
    if v.is_finite() {
        format!("${}", rounded(v))
    } else {
        NOT_AVAILABLE.to_string()
    }
}

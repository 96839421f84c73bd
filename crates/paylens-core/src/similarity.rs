//! Edit-distance string similarity
//!
//! The leaf primitive shared by the duplicate engine's field comparisons.
//! Also hosts the comparison-only normalizers for phone numbers and
//! website hostnames.

/// Levenshtein edit distance between two strings.
///
/// Classic single-character insert/delete/substitute distance, computed
/// over chars (not bytes) with a two-row DP table: O(|a|*|b|) time,
/// O(min(|a|,|b|)) extra space after the swap trick.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let m = a.len();
    let n = b.len();

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity in [0, 1]: `(L - distance) / L` where `L` is the
/// longer char length.
///
/// `similarity(x, x) == 1.0` for any x, and two empty strings compare as
/// an exact match by definition.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len = a.chars().count().max(b.chars().count());
    if len == 0 {
        return 1.0;
    }
    let distance = edit_distance(a, b);
    (len - distance) as f64 / len as f64
}

/// Reduce a phone number to its significant digits.
///
/// Strips every non-digit and drops the leading "1" country code from
/// 11-digit NANP numbers, so "+1 (555) 123-4567" and "5551234567" compare
/// equal.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

/// Extract a lowercase hostname from a raw website string.
///
/// Strips the scheme, path, query, and port. Keeps any leading "www.";
/// the duplicate engine decides how much credit www-stripping earns.
pub fn normalize_hostname(website: &str) -> String {
    let lower = website.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme
        .split(&['/', '?', '#'][..])
        .next()
        .unwrap_or(without_scheme);
    host.split(':').next().unwrap_or(host).to_string()
}

/// Strip a leading "www." from an already-normalized hostname.
pub fn strip_www(hostname: &str) -> &str {
    hostname.strip_prefix("www.").unwrap_or(hostname)
}

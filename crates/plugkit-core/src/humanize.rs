//! Human-friendly rendering helpers for messages and errors.

/// Join items into a human-readable list: `a`, `a or b`, `a, b, or c`.
///
/// Returns an empty string for an empty collection.
pub fn humanize_list<I, S>(items: I, conjunction: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .collect();
    match items.len() {
        0 => String::new(),
        1 => items[0].clone(),
        2 => format!("{} {} {}", items[0], conjunction.trim(), items[1]),
        _ => {
            let head = items[..items.len() - 1].join(", ");
            format!("{}, {} {}", head, conjunction.trim(), items[items.len() - 1])
        }
    }
}

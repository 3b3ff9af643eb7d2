/// Finds the entry with the largest threshold at or below `level`.
///
/// `table` must be sorted by ascending threshold. Levels below the first
/// threshold resolve to the first entry; an empty table resolves to `None`.
pub fn resolve_by_threshold<T>(table: &[(u32, T)], level: u32) -> Option<(u32, &T)> {
    table
        .iter()
        .rev()
        .find(|(threshold, _)| *threshold <= level)
        .or_else(|| table.first())
        .map(|(threshold, value)| (*threshold, value))
}

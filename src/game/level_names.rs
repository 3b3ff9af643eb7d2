use super::threshold::resolve_by_threshold;

const LEVEL_NAMES: &[(u32, &str)] = &[
    (1, "Beginner"),
    (5, "Developing"),
    (10, "Good"),
    (15, "Advanced"),
    (20, "Expert"),
    (25, "Master"),
    (30, "Legend"),
    (50, "Math Genius"),
    (100, "Grandmaster"),
];

/// Title for the nearest named level at or below `level`.
pub fn level_name(level: u32) -> &'static str {
    resolve_by_threshold(LEVEL_NAMES, level)
        .map(|(_, name)| *name)
        .unwrap_or("Beginner")
}

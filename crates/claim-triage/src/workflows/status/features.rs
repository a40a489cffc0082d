const EXCLUDED: [&str; 5] = [
    "исключен из егрюл",
    "исключение из егрюл",
    "юридическое лицо ликвидировано",
    "ликвидировано",
    "ликвидирован",
];
const PENDING_EXCLUSION: &str = "предстоящее исключение из егрюл";
const IN_REORGANIZATION: [&str; 3] = [
    "в состоянии реорганизац",
    "в процессе реорганизац",
    "путем преобразован",
];

/// Collapse whitespace runs and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keyword flags found in a lowercased, whitespace-collapsed status text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StatusFeatures {
    pub(crate) excluded: bool,
    pub(crate) reorganization: bool,
    pub(crate) bankrupt: bool,
    pub(crate) receivership: bool,
    pub(crate) observation: bool,
    pub(crate) unreliable_data: bool,
    pub(crate) unreliability: bool,
    pub(crate) active: bool,
    pub(crate) pending_exclusion: bool,
    pub(crate) in_reorganization: bool,
    pub(crate) transformation: bool,
}

impl StatusFeatures {
    pub(crate) fn detect(text: &str) -> Self {
        let lowered = collapse_whitespace(&text.to_lowercase());
        let has = |needle: &str| lowered.contains(needle);
        // A scheduled exclusion is not an exclusion yet.
        let settled = lowered.replace(PENDING_EXCLUSION, "");

        Self {
            excluded: EXCLUDED.iter().any(|needle| settled.contains(needle)),
            reorganization: has("реорганизац") || has("преобразован"),
            bankrupt: has("банкрот") || has("несостоятельн"),
            receivership: has("конкурсное производ"),
            observation: has("наблюдени"),
            unreliable_data: has("сведения недостоверны"),
            unreliability: has("недостоверн"),
            active: has("действующ") && !has("недействующ"),
            pending_exclusion: has(PENDING_EXCLUSION),
            in_reorganization: IN_REORGANIZATION.iter().any(|needle| has(needle)),
            transformation: has("путем преобразован"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_ignores_case_and_spacing() {
        let features = StatusFeatures::detect("  Юридическое   лицо  ЛИКВИДИРОВАНО\n(конкурсное производство)");

        assert!(features.excluded);
        assert!(features.receivership);
        assert!(!features.bankrupt);
        assert!(!features.active);
    }

    #[test]
    fn transformation_counts_as_reorganization() {
        let features = StatusFeatures::detect("Действующая, в процессе реорганизации путем преобразования");

        assert!(features.active);
        assert!(features.in_reorganization);
        assert!(features.transformation);
        assert!(features.reorganization);
        assert!(!features.pending_exclusion);
    }

    #[test]
    fn inactive_wording_is_not_active() {
        assert!(!StatusFeatures::detect("Недействующая организация").active);
        assert!(!StatusFeatures::detect("НЕДЕЙСТВУЮЩЕЕ юридическое лицо").active);
        assert!(StatusFeatures::detect("Действующая организация").active);
    }

    #[test]
    fn scheduled_exclusion_is_not_an_exclusion() {
        let features = StatusFeatures::detect("Действующий, предстоящее исключение из ЕГРЮЛ");

        assert!(features.pending_exclusion);
        assert!(!features.excluded);
    }
}

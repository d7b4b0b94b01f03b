//! "Did you mean" helper for misspelled names.

/// Largest edit distance still offered as a suggestion (exclusive).
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Levenshtein distance over characters.
pub fn edit_distance(lhs: &str, rhs: &str) -> usize {
    let n = lhs.chars().count();
    let m = rhs.chars().count();

    // Keep the shorter string in the inner loop
    if n < m {
        return edit_distance(rhs, lhs);
    }
    if m == 0 {
        return n;
    }

    let mut current: Vec<usize> = (0..=m).collect();
    for (i, ca) in lhs.chars().enumerate() {
        let mut prev = current[0];
        current[0] = i + 1;
        for (j, cb) in rhs.chars().enumerate() {
            let tmp = current[j + 1];
            current[j + 1] = (tmp + 1)
                .min(current[j] + 1)
                .min(prev + usize::from(ca != cb));
            prev = tmp;
        }
    }
    current[m]
}

/// Closest candidate to `word`, ignoring ASCII case, if it is near enough.
///
/// Ties go to the earliest candidate.
pub fn closest<'a, I>(word: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let word = word.to_ascii_lowercase();
    candidates
        .into_iter()
        .map(|c| (c, edit_distance(&word, &c.to_ascii_lowercase())))
        .filter(|&(_, d)| d < MAX_SUGGESTION_DISTANCE)
        .min_by_key(|&(_, d)| d)
        .map(|(c, _)| c)
}

/// Suffix for an error message, e.g. ` (did you mean 'CLK'?)`.
pub fn did_you_mean<'a, I>(word: &str, candidates: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    closest(word, candidates)
        .map(|c| format!(" (did you mean '{}'?)", c))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("CLK", "CLK"), 0);
        assert_eq!(edit_distance("DATA", "DAT"), 1);
    }

    #[test]
    fn test_closest_ignores_case() {
        let pins = ["DATA", "CLK", "SET", "CLEAR"];
        assert_eq!(closest("clok", pins), Some("CLK"));
        assert_eq!(closest("Dta", pins), Some("DATA"));
        assert_eq!(closest("frequency", pins), None);
    }

    #[test]
    fn test_did_you_mean() {
        assert_eq!(did_you_mean("Perod", ["Period"]), " (did you mean 'Period'?)");
        assert_eq!(did_you_mean("xyzzy", ["Period"]), "");
    }
}

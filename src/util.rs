use itertools::Itertools as _;

/// Computes the edit distance between two strings, counting adjacent
/// transpositions as one edit.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut rows: Vec<Vec<usize>> = vec![vec![0; b.len() + 1]; a.len() + 1];
    for (i, row) in rows.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        rows[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);

            let mut min = (rows[i - 1][j] + 1)
                .min(rows[i][j - 1] + 1)
                .min(rows[i - 1][j - 1] + cost);

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                min = min.min(rows[i - 2][j - 2] + cost);
            }

            rows[i][j] = min;
        }
    }

    rows[a.len()][b.len()]
}

/// Options from `options` that look like plausible misspellings of `input`,
/// most similar first.
pub(crate) fn suggestion_list<'a, I>(input: &str, options: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = (input.chars().count() / 2).max(1);

    let mut with_distance: Vec<(String, usize)> = options
        .into_iter()
        .filter_map(|opt| {
            let distance = edit_distance(input, opt);
            (distance <= threshold).then(|| (opt.to_owned(), distance))
        })
        .collect();

    with_distance.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    with_distance.into_iter().map(|(opt, _)| opt).collect()
}

/// Renders at most five items as `"a", "b", or "c"` for error messages.
pub(crate) fn quoted_or_list(items: &[String]) -> Option<String> {
    const MAX: usize = 5;

    let quoted: Vec<String> = items.iter().take(MAX).map(|i| format!("\"{i}\"")).collect();

    match quoted.len() {
        0 => None,
        1 => Some(quoted[0].clone()),
        2 => Some(format!("{} or {}", quoted[0], quoted[1])),
        len => {
            let init = quoted[..len - 1].iter().join(", ");
            Some(format!("{}, or {}", init, quoted[len - 1]))
        }
    }
}

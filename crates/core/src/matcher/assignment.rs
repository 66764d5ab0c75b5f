//! Minimum-cost perfect assignment on a square cost matrix.

/// Solves the assignment problem with the Hungarian method (O(n³)).
///
/// `costs[i][j]` is the cost of giving row `i` column `j`; `None` marks a
/// forbidden pair. Returns `assignment[row] = column`, or `None` when every
/// perfect assignment needs a forbidden pair (or the matrix is not square).
///
/// The result depends only on the input order, so equal-cost optima are
/// always resolved the same way.
pub fn min_cost_assignment(costs: &[Vec<Option<u32>>]) -> Option<Vec<usize>> {
    let n = costs.len();
    if n == 0 {
        return Some(Vec::new());
    }
    if costs.iter().any(|row| row.len() != n) {
        return None;
    }

    // Larger than any assignment made of allowed pairs only, so an optimum
    // uses a forbidden pair only if nothing else exists.
    let max = costs.iter().flatten().flatten().copied().max().unwrap_or(0) as i64;
    let forbidden = (max + 1) * n as i64 + 1;
    let cost = |row: usize, col: usize| costs[row][col].map_or(forbidden, i64::from);

    // 1-based potentials; index 0 is the virtual start column.
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut col0 = 0usize;
        let mut min_slack = vec![i64::MAX; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[col0] = true;
            let row0 = owner[col0];
            let mut delta = i64::MAX;
            let mut col1 = 0usize;

            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let slack = cost(row0 - 1, col - 1) - u[row0] - v[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            for col in 0..=n {
                if used[col] {
                    u[owner[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if owner[col0] == 0 {
                break;
            }
        }

        loop {
            let prev = way[col0];
            owner[col0] = owner[prev];
            col0 = prev;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for col in 1..=n {
        if owner[col] != 0 {
            assignment[owner[col] - 1] = col - 1;
        }
    }

    if assignment
        .iter()
        .enumerate()
        .any(|(row, &col)| costs[row][col].is_none())
    {
        return None;
    }
    Some(assignment)
}

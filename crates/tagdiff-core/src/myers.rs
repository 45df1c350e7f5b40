//! Myers' O((N+M)·D) greedy shortest-edit search over interned token ids.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    Equal,
    Insert,
    Delete,
}

/// Returns one step per consumed element. Within a changed region deletions
/// come before insertions.
pub(crate) fn shortest_edit(old: &[u32], new: &[u32]) -> Vec<Step> {
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(left, right)| left == right)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(left, right)| left == right)
        .count();

    let mut steps = vec![Step::Equal; prefix];
    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    steps.extend(middle(old_mid, new_mid));
    steps.extend(std::iter::repeat_n(Step::Equal, suffix));
    steps
}

fn middle(old: &[u32], new: &[u32]) -> Vec<Step> {
    if old.is_empty() {
        return vec![Step::Insert; new.len()];
    }
    if new.is_empty() {
        return vec![Step::Delete; old.len()];
    }
    let trace = forward(old, new);
    backtrack(&trace, old.len(), new.len())
}

/// Snapshot of the furthest-reaching x per diagonal `k` in `-d..=d`,
/// taken before round `d` runs.
struct Round {
    d: isize,
    xs: Vec<isize>,
}

impl Round {
    fn x(&self, k: isize) -> isize {
        self.xs[(k + self.d) as usize]
    }
}

fn forward(old: &[u32], new: &[u32]) -> Vec<Round> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max = n + m;
    let offset = max;
    let mut v = vec![0isize; 2 * max as usize + 2];
    let mut trace = Vec::new();
    let index = |k: isize| (offset + k) as usize;

    for d in 0..=max {
        trace.push(Round {
            d,
            xs: v[index(-d)..=index(d)].to_vec(),
        });
        for k in (-d..=d).step_by(2) {
            let mut x = if k == -d || (k != d && v[index(k - 1)] < v[index(k + 1)]) {
                v[index(k + 1)]
            } else {
                v[index(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            v[index(k)] = x;
            if x >= n && y >= m {
                return trace;
            }
        }
    }
    trace
}

fn backtrack(trace: &[Round], n: usize, m: usize) -> Vec<Step> {
    let mut steps = Vec::with_capacity(n + m);
    let mut x = n as isize;
    let mut y = m as isize;

    for round in trace.iter().rev() {
        let d = round.d;
        let k = x - y;
        if d == 0 {
            while x > 0 && y > 0 {
                steps.push(Step::Equal);
                x -= 1;
                y -= 1;
            }
            break;
        }
        let down = k == -d || (k != d && round.x(k - 1) < round.x(k + 1));
        let prev_k = if down { k + 1 } else { k - 1 };
        let prev_x = round.x(prev_k);
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            steps.push(Step::Equal);
            x -= 1;
            y -= 1;
        }
        steps.push(if down { Step::Insert } else { Step::Delete });
        x = prev_x;
        y = prev_y;
    }

    steps.reverse();
    steps
}

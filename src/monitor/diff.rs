//! Построчный unified diff между предыдущей и текущей версией файла.
//!
//! Формат повторяет классический `diff -u` без дат в заголовках:
//! `--- previous` / `+++ current`, хунки `@@ -a,b +c,d @@` с тремя строками
//! контекста. Строки соединяются через `\n`.

use std::ops::Range;

/// Количество строк контекста вокруг изменений.
pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Equal,
    Delete,
    Insert,
}

/// Шаг редакционного сценария. `old`/`new`: позиции в старом и новом
/// файлах на момент шага.
#[derive(Debug, Clone, Copy)]
struct Op {
    kind: OpKind,
    old: usize,
    new: usize,
}

/// Тело сообщения для изменённого файла.
///
/// Для файла, увиденного впервые (`previous == None`), возвращает `"+ "` и
/// всё текущее содержимое. Для одинаковых версий: пустую строку.
pub fn file_diff(
    previous: Option<&[String]>,
    current: &[String],
) -> String {
    match previous {
        None => format!("+ {}", current.join("\n")),
        Some(previous) => unified_diff(previous, current),
    }
}

/// Unified diff двух последовательностей строк.
pub fn unified_diff(
    old: &[String],
    new: &[String],
) -> String {
    let ops = edit_script(old, new);
    let hunks = group_hunks(&ops);
    if hunks.is_empty() {
        return String::new();
    }

    let mut out = vec!["--- previous".to_string(), "+++ current".to_string()];
    for (start, end) in hunks {
        let slice = &ops[start..end];
        let old_len = slice.iter().filter(|op| op.kind != OpKind::Insert).count();
        let new_len = slice.iter().filter(|op| op.kind != OpKind::Delete).count();
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(slice[0].old, old_len),
            format_range(slice[0].new, new_len)
        ));
        for op in slice {
            out.push(match op.kind {
                OpKind::Equal => format!(" {}", old[op.old]),
                OpKind::Delete => format!("-{}", old[op.old]),
                OpKind::Insert => format!("+{}", new[op.new]),
            });
        }
    }
    out.join("\n")
}

/// Диапазон хунка: начало с единицы, длина опускается, если она равна 1,
/// пустой диапазон указывает на строку перед позицией.
fn format_range(
    start: usize,
    len: usize,
) -> String {
    match len {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{}", start + 1, len),
    }
}

/// Кратчайший сценарий правки.
///
/// Общие префикс и суффикс отрезаются сразу, середина считается алгоритмом
/// Майерса с поиском средней змейки: память линейна по длине файлов, время
/// `O((n + m) * D)`, где `D`: число изменённых строк. Внутри каждого блока
/// изменений удаления идут раньше вставок.
fn edit_script(
    old: &[String],
    new: &[String],
) -> Vec<Op> {
    let max_d = max_d(old.len(), new.len());
    let mut vf = V::new(max_d);
    let mut vb = V::new(max_d);
    let mut kinds = Vec::with_capacity(old.len() + new.len());
    conquer(
        old,
        0..old.len(),
        new,
        0..new.len(),
        &mut vf,
        &mut vb,
        &mut kinds,
    );
    place(&kinds)
}

/// Расставляет позиции шагов и переупорядочивает каждый блок изменений:
/// сначала все удаления, затем все вставки.
fn place(kinds: &[OpKind]) -> Vec<Op> {
    let mut ops = Vec::with_capacity(kinds.len());
    let (mut i, mut j) = (0, 0);
    let mut idx = 0;
    while idx < kinds.len() {
        if kinds[idx] == OpKind::Equal {
            ops.push(Op {
                kind: OpKind::Equal,
                old: i,
                new: j,
            });
            i += 1;
            j += 1;
            idx += 1;
            continue;
        }

        let run_end = kinds[idx..]
            .iter()
            .position(|k| *k == OpKind::Equal)
            .map_or(kinds.len(), |p| idx + p);
        let run = &kinds[idx..run_end];
        let deletes = run.iter().filter(|k| **k == OpKind::Delete).count();
        let inserts = run.len() - deletes;

        for d in 0..deletes {
            ops.push(Op {
                kind: OpKind::Delete,
                old: i + d,
                new: j,
            });
        }
        for n in 0..inserts {
            ops.push(Op {
                kind: OpKind::Insert,
                old: i + deletes,
                new: j + n,
            });
        }
        i += deletes;
        j += inserts;
        idx = run_end;
    }
    ops
}

fn max_d(
    old_len: usize,
    new_len: usize,
) -> usize {
    (old_len + new_len + 1) / 2 + 1
}

/// Вектор `V` алгоритма Майерса, индексируемый диагональю `k` (может быть
/// отрицательной).
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl std::ops::Index<isize> for V {
    type Output = usize;

    fn index(
        &self,
        k: isize,
    ) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl std::ops::IndexMut<isize> for V {
    fn index_mut(
        &mut self,
        k: isize,
    ) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn common_prefix_len(
    old: &[String],
    new: &[String],
) -> usize {
    old.iter().zip(new).take_while(|(a, b)| a == b).count()
}

fn common_suffix_len(
    old: &[String],
    new: &[String],
) -> usize {
    old.iter()
        .rev()
        .zip(new.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Точка разбиения задачи на две независимые половины (начало средней
/// змейки) в абсолютных индексах.
fn find_middle_snake(
    old: &[String],
    old_range: Range<usize>,
    new: &[String],
    new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
) -> Option<(usize, usize)> {
    let n = old_range.len();
    let m = new_range.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = max_d(n, m) as isize;
    for d in 0..d_max {
        // Прямой проход
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(
                    &old[old_range.start + x..old_range.end],
                    &new[new_range.start + y..new_range.end],
                );
            }
            vf[k] = x;
            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Some((x0 + old_range.start, y0 + new_range.start));
            }
        }

        // Обратный проход
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(
                    &old[old_range.start..old_range.start + n - x],
                    &new[new_range.start..new_range.start + m - y],
                );
                x += advance;
                y += advance;
            }
            vb[k] = x;
            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((n - x + old_range.start, m - y + new_range.start));
            }
        }
    }
    None
}

/// Рекурсивно раскладывает диапазоны на шаги правки.
fn conquer(
    old: &[String],
    mut old_range: Range<usize>,
    new: &[String],
    mut new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    kinds: &mut Vec<OpKind>,
) {
    let prefix = common_prefix_len(&old[old_range.clone()], &new[new_range.clone()]);
    kinds.extend(std::iter::repeat(OpKind::Equal).take(prefix));
    old_range.start += prefix;
    new_range.start += prefix;

    let suffix = common_suffix_len(&old[old_range.clone()], &new[new_range.clone()]);
    old_range.end -= suffix;
    new_range.end -= suffix;

    if old_range.is_empty() {
        kinds.extend(std::iter::repeat(OpKind::Insert).take(new_range.len()));
    } else if new_range.is_empty() {
        kinds.extend(std::iter::repeat(OpKind::Delete).take(old_range.len()));
    } else if let Some((x, y)) =
        find_middle_snake(old, old_range.clone(), new, new_range.clone(), vf, vb)
    {
        conquer(old, old_range.start..x, new, new_range.start..y, vf, vb, kinds);
        conquer(old, x..old_range.end, new, y..new_range.end, vf, vb, kinds);
    } else {
        kinds.extend(std::iter::repeat(OpKind::Delete).take(old_range.len()));
        kinds.extend(std::iter::repeat(OpKind::Insert).take(new_range.len()));
    }

    kinds.extend(std::iter::repeat(OpKind::Equal).take(suffix));
}

/// Диапазоны `[start, end)` шагов для каждого хунка. Изменения, между
/// которыми не больше `2 * CONTEXT_LINES` общих строк, сливаются.
fn group_hunks(ops: &[Op]) -> Vec<(usize, usize)> {
    let changes: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| op.kind != OpKind::Equal)
        .map(|(idx, _)| idx)
        .collect();

    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for idx in changes {
        let start = idx.saturating_sub(CONTEXT_LINES);
        let end = (idx + 1 + CONTEXT_LINES).min(ops.len());
        match hunks.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => hunks.push((start, end)),
        }
    }
    hunks
}

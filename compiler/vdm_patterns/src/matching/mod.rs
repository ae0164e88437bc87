//! Pattern matching.
//!
//! Matching a pattern against a value yields every complete binding
//! environment the pattern admits. Most patterns produce at most one, but
//! set patterns range over every bijection between sub-patterns and
//! elements, concatenation patterns over every split of a sequence, and
//! union patterns over every partition of a set. Quantifiers and `let be
//! st` rely on seeing all of them.
//!
//! Internally a failed branch is an empty result; the first failure reason
//! is recorded so a top-level mismatch can still be reported with its
//! numbered code.

use vdm_diagnostic::ErrorCode;
use vdm_ir::{Location, Pattern, PatternKind};

use crate::errors::PatternMismatch;
use crate::value::{Value, ValueSet};
use crate::Bindings;

/// Set union patterns enumerate `2^n` partitions; larger sets are refused.
const MAX_UNION_PATTERN_SIZE: usize = 24;

/// Match `pattern` against `value` with default settings.
pub fn match_pattern(pattern: &Pattern, value: &Value) -> Result<Vec<Bindings>, PatternMismatch> {
    Matcher::new().matches(pattern, value)
}

/// Pattern matcher.
#[derive(Copy, Clone, Debug)]
pub struct Matcher {
    dedupe: bool,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Matcher { dedupe: true }
    }

    /// Whether structurally identical environments are collapsed. Symmetric
    /// set patterns such as `{x, -}` otherwise yield the same environment
    /// once per bijection.
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// All binding environments, or the first reason no environment exists.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn matches(&self, pattern: &Pattern, value: &Value) -> Result<Vec<Bindings>, PatternMismatch> {
        let mut failure = None;
        let mut envs = self.collect(pattern, value, &mut failure);
        if envs.is_empty() {
            return Err(failure.unwrap_or_else(|| {
                PatternMismatch::new(
                    ErrorCode::SetPatternFailed,
                    "Pattern does not match",
                    pattern.location,
                )
            }));
        }
        if self.dedupe {
            dedupe(&mut envs);
        }
        Ok(envs)
    }

    /// Match a list of patterns positionally against a list of values.
    pub fn matches_all(
        &self,
        patterns: &[Pattern],
        values: &[Value],
        location: Location,
    ) -> Result<Vec<Bindings>, PatternMismatch> {
        let mut failure = None;
        let mut envs = self.positional(patterns, values, location, &mut failure);
        if envs.is_empty() {
            return Err(failure.unwrap_or_else(|| {
                PatternMismatch::new(ErrorCode::SeqPatternLength, "Patterns do not match", location)
            }));
        }
        if self.dedupe {
            dedupe(&mut envs);
        }
        Ok(envs)
    }

    fn collect(
        &self,
        pattern: &Pattern,
        value: &Value,
        failure: &mut Option<PatternMismatch>,
    ) -> Vec<Bindings> {
        let location = pattern.location;
        let fail = |failure: &mut Option<PatternMismatch>, code: ErrorCode, message: String| {
            record_failure(failure, code, message, location)
        };

        match &pattern.kind {
            PatternKind::Identifier(name) => vec![Bindings::single(*name, value.clone())],
            PatternKind::Ignore => vec![Bindings::new()],

            PatternKind::Bool(expected) => match value.as_bool() {
                Ok(b) if b == *expected => vec![Bindings::new()],
                Ok(_) => fail(failure, ErrorCode::BoolPatternFailed, "Boolean pattern match failed".into()),
                Err(e) => fail(failure, e.code, e.message),
            },
            PatternKind::Char(expected) => match value.as_char() {
                Ok(c) if c == *expected => vec![Bindings::new()],
                Ok(_) => fail(failure, ErrorCode::CharPatternFailed, "Character pattern match failed".into()),
                Err(e) => fail(failure, e.code, e.message),
            },
            PatternKind::Int(expected) => match value.as_int() {
                Ok(i) if i == *expected => vec![Bindings::new()],
                Ok(_) => fail(failure, ErrorCode::IntPatternFailed, "Integer pattern match failed".into()),
                Err(e) => fail(failure, e.code, e.message),
            },
            PatternKind::Real(expected) => match value.as_real() {
                Ok(r) if Value::real(r) == Value::real(*expected) => vec![Bindings::new()],
                Ok(_) => fail(failure, ErrorCode::RealPatternFailed, "Real pattern match failed".into()),
                Err(e) => fail(failure, e.code, e.message),
            },
            PatternKind::Quote(expected) => match value.as_quote() {
                Ok(q) if q == *expected => vec![Bindings::new()],
                Ok(_) => fail(failure, ErrorCode::QuotePatternFailed, "Quote pattern match failed".into()),
                Err(e) => fail(failure, e.code, e.message),
            },
            PatternKind::Str(expected) => match value.as_seq() {
                Ok(_) if *value == Value::string(expected) => vec![Bindings::new()],
                Ok(_) => fail(failure, ErrorCode::StringPatternFailed, "String pattern match failed".into()),
                Err(e) => fail(failure, e.code, e.message),
            },
            PatternKind::Nil => match value {
                Value::Nil => vec![Bindings::new()],
                _ => fail(failure, ErrorCode::NilPatternFailed, "Nil pattern match failed".into()),
            },

            PatternKind::Record { ty, fields } => match value.as_record() {
                Ok(record) if record.ty.name == ty.name && record.fields.len() == fields.len() => {
                    self.positional(fields, &record.fields, location, failure)
                }
                Ok(record) => fail(
                    failure,
                    ErrorCode::RecordPatternType,
                    format!("Record type does not match pattern: {} vs {}", record.ty.name, ty.name),
                ),
                Err(e) => fail(failure, e.code, e.message),
            },

            PatternKind::Seq(items) => match value.as_seq() {
                Ok(values) if values.len() == items.len() => {
                    self.positional(items, values, location, failure)
                }
                Ok(values) => fail(
                    failure,
                    ErrorCode::SeqPatternLength,
                    format!(
                        "Sequence patterns do not match: {} elements vs {}",
                        items.len(),
                        values.len()
                    ),
                ),
                Err(e) => fail(failure, e.code, e.message),
            },

            PatternKind::Set(items) => match value.as_set() {
                Ok(set) if set.len() == items.len() => {
                    let envs = self.set_bijections(items, set, location, failure);
                    if envs.is_empty() {
                        fail(failure, ErrorCode::SetPatternFailed, "Cannot match set pattern".into())
                    } else {
                        envs
                    }
                }
                Ok(set) => fail(
                    failure,
                    ErrorCode::SetPatternSize,
                    format!(
                        "Set pattern does not match: {} elements vs {}",
                        items.len(),
                        set.len()
                    ),
                ),
                Err(e) => fail(failure, e.code, e.message),
            },

            PatternKind::Object { class, fields } => match value.as_object() {
                Ok(obj) if obj.class == *class => {
                    let mut values = Vec::with_capacity(fields.len());
                    for (name, _) in fields {
                        match obj.field(*name) {
                            Some(v) => values.push(v),
                            None => {
                                return fail(
                                    failure,
                                    ErrorCode::ObjectPatternFailed,
                                    format!("Object of class {class} has no field '{name}'"),
                                );
                            }
                        }
                    }
                    let patterns: Vec<&Pattern> = fields.iter().map(|(_, p)| p).collect();
                    self.product(&patterns, &values, location, failure)
                }
                Ok(obj) => fail(
                    failure,
                    ErrorCode::ObjectPatternFailed,
                    format!("Object pattern class {class} does not match {}", obj.class),
                ),
                Err(e) => fail(failure, e.code, e.message),
            },

            PatternKind::Concat(left, right) => match value.as_seq() {
                Ok(values) => {
                    let mut envs = Vec::new();
                    for split in 0..=values.len() {
                        let lhs = Value::seq(values[..split].to_vec());
                        let rhs = Value::seq(values[split..].to_vec());
                        let pair = [left.as_ref(), right.as_ref()];
                        envs.extend(self.product(&pair, &[lhs, rhs], location, failure));
                    }
                    if envs.is_empty() {
                        fail(
                            failure,
                            ErrorCode::ConcatPatternFailed,
                            "Cannot match sequence concatenation pattern".into(),
                        )
                    } else {
                        envs
                    }
                }
                Err(e) => fail(failure, e.code, e.message),
            },

            PatternKind::Union(left, right) => match value.as_set() {
                Ok(set) if set.len() <= MAX_UNION_PATTERN_SIZE => {
                    let elements: Vec<&Value> = set.iter().collect();
                    let mut envs = Vec::new();
                    for mask in 0u32..(1u32 << elements.len()) {
                        let (lhs, rhs): (Vec<_>, Vec<_>) = elements
                            .iter()
                            .enumerate()
                            .partition(|(i, _)| mask & (1u32 << *i) != 0);
                        let lhs = Value::set(lhs.into_iter().map(|(_, v)| (*v).clone()));
                        let rhs = Value::set(rhs.into_iter().map(|(_, v)| (*v).clone()));
                        let pair = [left.as_ref(), right.as_ref()];
                        envs.extend(self.product(&pair, &[lhs, rhs], location, failure));
                    }
                    if envs.is_empty() {
                        fail(failure, ErrorCode::UnionPatternFailed, "Cannot match set union pattern".into())
                    } else {
                        envs
                    }
                }
                Ok(set) => fail(
                    failure,
                    ErrorCode::UnionPatternFailed,
                    format!("Set of {} elements is too large for a union pattern", set.len()),
                ),
                Err(e) => fail(failure, e.code, e.message),
            },
        }
    }

    fn positional(
        &self,
        patterns: &[Pattern],
        values: &[Value],
        location: Location,
        failure: &mut Option<PatternMismatch>,
    ) -> Vec<Bindings> {
        if patterns.len() != values.len() {
            if failure.is_none() {
                *failure = Some(PatternMismatch::new(
                    ErrorCode::SeqPatternLength,
                    format!("Expecting {} values, got {}", patterns.len(), values.len()),
                    location,
                ));
            }
            return Vec::new();
        }
        let refs: Vec<&Pattern> = patterns.iter().collect();
        self.product(&refs, values, location, failure)
    }

    /// Cartesian-product merge of independent matches, left to right.
    fn product(
        &self,
        patterns: &[&Pattern],
        values: &[Value],
        location: Location,
        failure: &mut Option<PatternMismatch>,
    ) -> Vec<Bindings> {
        let mut acc = vec![Bindings::new()];
        for (pattern, value) in patterns.iter().zip(values) {
            let next = self.collect(pattern, value, failure);
            if next.is_empty() {
                return Vec::new();
            }
            acc = merge_all(&acc, &next, location, failure);
            if acc.is_empty() {
                return acc;
            }
        }
        acc
    }

    /// Depth-first search over assignments of distinct elements to
    /// sub-patterns. A branch is abandoned as soon as a sub-pattern cannot
    /// match its element or conflicts with earlier bindings, which yields
    /// the same union as enumerating all `k!` bijections.
    fn set_bijections(
        &self,
        patterns: &[Pattern],
        set: &ValueSet,
        location: Location,
        failure: &mut Option<PatternMismatch>,
    ) -> Vec<Bindings> {
        let elements: Vec<&Value> = set.iter().collect();
        let mut used = vec![false; elements.len()];
        let mut results = Vec::new();
        self.assign(
            patterns,
            &elements,
            &mut used,
            vec![Bindings::new()],
            location,
            failure,
            &mut results,
        );
        results
    }

    #[expect(clippy::too_many_arguments, reason = "recursive search state")]
    fn assign(
        &self,
        patterns: &[Pattern],
        elements: &[&Value],
        used: &mut [bool],
        partial: Vec<Bindings>,
        location: Location,
        failure: &mut Option<PatternMismatch>,
        results: &mut Vec<Bindings>,
    ) {
        let Some((pattern, rest)) = patterns.split_first() else {
            results.extend(partial);
            return;
        };
        for i in 0..elements.len() {
            if used[i] {
                continue;
            }
            let envs = self.collect(pattern, elements[i], failure);
            if envs.is_empty() {
                continue;
            }
            let merged = merge_all(&partial, &envs, location, failure);
            if merged.is_empty() {
                continue;
            }
            used[i] = true;
            self.assign(rest, elements, used, merged, location, failure, results);
            used[i] = false;
        }
    }
}

/// Record the first failure reason; a failed branch is an empty result.
fn record_failure(
    failure: &mut Option<PatternMismatch>,
    code: ErrorCode,
    message: String,
    location: Location,
) -> Vec<Bindings> {
    if failure.is_none() {
        *failure = Some(PatternMismatch::new(code, message, location));
    }
    Vec::new()
}

fn merge_all(
    left: &[Bindings],
    right: &[Bindings],
    location: Location,
    failure: &mut Option<PatternMismatch>,
) -> Vec<Bindings> {
    let mut merged = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            match l.merge(r, location) {
                Ok(env) => merged.push(env),
                Err(mismatch) => {
                    if failure.is_none() {
                        *failure = Some(mismatch);
                    }
                }
            }
        }
    }
    merged
}

/// Remove structurally identical environments, keeping first occurrences.
fn dedupe(envs: &mut Vec<Bindings>) {
    let mut unique: Vec<Bindings> = Vec::with_capacity(envs.len());
    for env in envs.drain(..) {
        if !unique.contains(&env) {
            unique.push(env);
        }
    }
    *envs = unique;
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

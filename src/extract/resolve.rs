//! @ai:module:intent Ordered lookup of differently spelled output variables
//! @ai:module:layer domain
//! @ai:module:public_api ResolutionChain, Resolved, ValueSource
//! @ai:module:stateless true

use crate::engine::{Binding, RawSolution};
use serde::{Deserialize, Serialize};

/// @ai:intent Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "variable")]
pub enum ValueSource {
    /// Read from the named solution variable
    Named(String),
    /// Derived from other extracted data
    Computed,
}

/// @ai:intent A value together with its source
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

/// @ai:intent Candidate variable names tried in order; the first readable one wins
pub struct ResolutionChain<'s> {
    solution: &'s RawSolution,
    candidates: &'s [&'static str],
}

impl<'s> ResolutionChain<'s> {
    /// @ai:effects pure
    pub fn new(solution: &'s RawSolution, candidates: &'s [&'static str]) -> Self {
        Self {
            solution,
            candidates,
        }
    }

    /// @ai:intent First candidate present and readable with `read`
    /// @ai:effects pure
    pub fn find<T>(&self, read: impl Fn(&Binding) -> Option<T>) -> Option<Resolved<T>> {
        self.candidates.iter().find_map(|name| {
            let value = self.solution.get(name).and_then(&read)?;
            Some(Resolved {
                value,
                source: ValueSource::Named((*name).to_string()),
            })
        })
    }

    /// @ai:intent Named lookup, with `compute` as the terminal link of the chain
    /// @ai:effects pure
    pub fn or_compute<T>(
        &self,
        read: impl Fn(&Binding) -> Option<T>,
        compute: impl FnOnce() -> T,
    ) -> Resolved<T> {
        self.find(read).unwrap_or_else(|| Resolved {
            value: compute(),
            source: ValueSource::Computed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolveStatus;

    #[test]
    fn test_first_present_candidate_wins() {
        let solution = RawSolution::new(SolveStatus::Optimal)
            .with_binding("max_load", 4i64)
            .with_binding("maxLoad", 7i64);

        let chain = ResolutionChain::new(&solution, &["maxload", "maxLoad", "max_load"]);
        let resolved = chain.or_compute(Binding::as_u64, || 0);

        assert_eq!(resolved.value, 7);
        assert_eq!(resolved.source, ValueSource::Named("maxLoad".to_string()));
    }

    #[test]
    fn test_unreadable_candidate_is_skipped() {
        let solution = RawSolution::new(SolveStatus::Optimal)
            .with_binding("maxload", vec![1i64, 2])
            .with_binding("max_load", 3i64);

        let chain = ResolutionChain::new(&solution, &["maxload", "max_load"]);
        assert_eq!(chain.or_compute(Binding::as_u64, || 0).value, 3);
    }

    #[test]
    fn test_compute_runs_only_when_nothing_matches() {
        let solution = RawSolution::new(SolveStatus::Optimal);
        let chain = ResolutionChain::new(&solution, &["maxload"]);

        let resolved = chain.or_compute(Binding::as_u64, || 42);
        assert_eq!(resolved.value, 42);
        assert_eq!(resolved.source, ValueSource::Computed);
    }
}

//! Rule table evaluation.
//!
//! Rules form a read/write graph: if rule A writes an option that rule B's
//! condition reads, A must run before B. Ordering the table topologically
//! (Kahn's algorithm, ties broken by declaration order) means a single pass
//! reaches the fixed point. A cycle in that graph, including a rule that
//! reads an option it writes, is reported instead of iterated.

use std::collections::{BTreeSet, HashMap};

use super::rule::Rule;
use crate::environment::Environment;
use crate::options::OptionSet;
use crate::{Error, Result};

/// Ordered collection of implication rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluation order: writers before readers, otherwise declaration order
    ///
    /// # Errors
    ///
    /// Returns `Error::RuleCycleDetected` naming the rules that lie on a
    /// cycle. Rules that merely read from a cycle are left out.
    pub fn evaluation_order(&self) -> Result<Vec<&Rule>> {
        let n = self.rules.len();
        let writes: Vec<BTreeSet<&str>> = self.rules.iter().map(Rule::writes).collect();
        let reads: Vec<BTreeSet<&str>> = self.rules.iter().map(Rule::reads).collect();

        // successors[i] holds every rule that must run after rule i
        let mut successors: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut in_degree = vec![0usize; n];
        for (writer, written) in writes.iter().enumerate() {
            for (reader, read) in reads.iter().enumerate() {
                if !written.is_disjoint(read) {
                    successors.entry(writer).or_default().push(reader);
                    in_degree[reader] += 1;
                }
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(current) = ready.pop_first() {
            order.push(current);
            for &next in successors.get(&current).into_iter().flatten() {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() != n {
            let ordered: BTreeSet<usize> = order.iter().copied().collect();
            let unordered: BTreeSet<usize> = (0..n).filter(|i| !ordered.contains(i)).collect();
            let rules = unordered
                .iter()
                .filter(|&&i| reaches_itself(i, &successors, &unordered))
                .map(|&i| self.rules[i].name.clone())
                .collect();
            return Err(Error::RuleCycleDetected { rules });
        }

        Ok(order.into_iter().map(|i| &self.rules[i]).collect())
    }

    /// Run every rule once in evaluation order
    ///
    /// Returns the names of the rules that fired, in the order they fired.
    pub fn apply(&self, options: &mut OptionSet, env: &Environment) -> Result<Vec<String>> {
        let order = self.evaluation_order()?;
        let mut fired = Vec::new();
        for rule in order {
            if rule.apply(options, env) {
                tracing::debug!(rule = %rule.name, "Rule applied");
                fired.push(rule.name.clone());
            }
        }
        Ok(fired)
    }
}

/// Whether `start` can reach itself through rules in `within`
fn reaches_itself(
    start: usize,
    successors: &HashMap<usize, Vec<usize>>,
    within: &BTreeSet<usize>,
) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<usize> = successors.get(&start).cloned().unwrap_or_default();
    while let Some(current) = stack.pop() {
        if current == start {
            return true;
        }
        if !within.contains(&current) || !seen.insert(current) {
            continue;
        }
        stack.extend(successors.get(&current).into_iter().flatten().copied());
    }
    false
}

impl From<Vec<Rule>> for RuleTable {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

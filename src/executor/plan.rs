//! Execution plan
//!
//! Splits discovered classes into the set that may run concurrently and the
//! set that must run one after another.

use crate::models::TestClass;

/// Partition classes by their parallelizable flag, keeping discovery order
pub fn classify_tests(classes: Vec<TestClass>) -> (Vec<TestClass>, Vec<TestClass>) {
    classes.into_iter().partition(|c| c.parallelizable)
}

/// Parallel and sequential class sets of one run
#[derive(Debug, Default)]
pub struct ExecutionPlan {
    pub parallel: Vec<TestClass>,
    pub sequential: Vec<TestClass>,
}

impl ExecutionPlan {
    /// With `parallelize` off every class is sequential regardless of its flag
    pub fn build(classes: Vec<TestClass>, parallelize: bool) -> Self {
        if !parallelize {
            return Self {
                parallel: Vec::new(),
                sequential: classes,
            };
        }

        let (parallel, sequential) = classify_tests(classes);
        Self {
            parallel,
            sequential,
        }
    }

    pub fn total(&self) -> usize {
        self.parallel.len() + self.sequential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, parallelizable: bool) -> TestClass {
        let mut class = TestClass::new(name);
        class.parallelizable = parallelizable;
        class
    }

    fn names(classes: &[TestClass]) -> Vec<&str> {
        classes.iter().map(|c| c.name.as_str()).collect()
    }

    fn sample() -> Vec<TestClass> {
        vec![
            class("A", true),
            class("B", false),
            class("C", true),
            class("D", false),
        ]
    }

    #[test]
    fn test_classify_preserves_order() {
        let (parallel, sequential) = classify_tests(sample());
        assert_eq!(names(&parallel), vec!["A", "C"]);
        assert_eq!(names(&sequential), vec!["B", "D"]);
    }

    #[test]
    fn test_sequential_override() {
        let plan = ExecutionPlan::build(sample(), false);
        assert!(plan.parallel.is_empty());
        assert_eq!(names(&plan.sequential), vec!["A", "B", "C", "D"]);
        assert_eq!(plan.total(), 4);
    }

    #[test]
    fn test_empty_plan() {
        let plan = ExecutionPlan::build(Vec::new(), true);
        assert!(plan.is_empty());
    }
}

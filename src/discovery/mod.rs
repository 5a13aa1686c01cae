//! Test discovery
//!
//! Turns the declarations of a `TestModule` into `TestClass` values. Discovery
//! never executes anything and never fails: malformed marker combinations
//! become warnings carried by the discovered method.

mod pairing;

pub use pairing::{pair_markers, CaseSpec, Pairing};

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metadata::{
    ClassMarker, LifecycleRole, MethodDecl, MethodMarker, TestModule, TypeDecl,
};
use crate::models::{LifecycleBinding, TestClass, TestMethod, TestUnit};

/// Filter conditions that select nothing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("No test class found with the name '{0}'.")]
    NoClassFound(String),

    #[error("No test methods found with the name '{method}'.")]
    NoMethodFound { class: String, method: String },
}

/// Discover every type carrying the test-class marker, in declaration order
pub fn discover_test_classes(module: &TestModule) -> Vec<TestClass> {
    let classes: Vec<TestClass> = module
        .types
        .iter()
        .filter(|decl| decl.has_marker(&ClassMarker::TestClass))
        .map(discover_test_class)
        .collect();

    debug!(
        "Discovered {} test classes in module '{}'",
        classes.len(),
        module.name
    );

    classes
}

/// Materialize a single test class with its methods and lifecycle bindings
pub fn discover_test_class(decl: &TypeDecl) -> TestClass {
    let mut class = TestClass::new(&decl.name);
    class.parallelizable = decl.has_marker(&ClassMarker::Parallelizable);
    class.ignore = decl.ignore_policy().cloned();
    class.methods = discover_test_methods(decl);
    class.lifecycle = discover_lifecycle(decl);
    class
}

/// Methods with at least one case marker and no lifecycle role
pub fn discover_test_methods(decl: &TypeDecl) -> Vec<TestMethod> {
    decl.methods
        .iter()
        .filter(|m| is_test_method(m))
        .map(discover_test_method)
        .collect()
}

fn is_test_method(method: &MethodDecl) -> bool {
    let has_case = method
        .markers
        .iter()
        .any(|m| matches!(m, MethodMarker::Case(_)));
    let has_role = method
        .markers
        .iter()
        .any(|m| matches!(m, MethodMarker::Lifecycle(_)));
    has_case && !has_role
}

fn discover_test_method(method: &MethodDecl) -> TestMethod {
    let (units, warnings) = discover_test_cases(method);

    let name = method
        .markers
        .iter()
        .find_map(|m| match m {
            MethodMarker::Name(name) => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_else(|| method.name.clone());

    let ignore = method.markers.iter().find_map(|m| match m {
        MethodMarker::Ignore(policy) => Some(policy.clone()),
        _ => None,
    });

    let categories = method
        .markers
        .iter()
        .filter_map(|m| match m {
            MethodMarker::Category(c) => Some(c.clone()),
            _ => None,
        })
        .collect();

    TestMethod {
        name,
        method_name: method.name.clone(),
        units,
        ignore,
        categories,
        warnings,
    }
}

/// Ordered test units of a method, plus any pairing warnings
pub fn discover_test_cases(method: &MethodDecl) -> (Vec<TestUnit>, Vec<String>) {
    let pairing = pair_markers(&method.name, &method.markers);

    for warning in &pairing.warnings {
        warn!("{}", warning);
    }

    let units = pairing
        .cases
        .into_iter()
        .map(|spec| {
            TestUnit::new(
                &method.name,
                method.params.clone(),
                spec.args,
                spec.repeat,
                method.body.clone(),
            )
        })
        .collect();

    (units, pairing.warnings)
}

fn discover_lifecycle(decl: &TypeDecl) -> HashMap<LifecycleRole, LifecycleBinding> {
    let mut bindings = HashMap::new();

    for role in LifecycleRole::all() {
        let candidates: Vec<&MethodDecl> = decl
            .methods
            .iter()
            .filter(|m| m.markers.contains(&MethodMarker::Lifecycle(role)))
            .collect();

        let Some(first) = candidates.first() else {
            continue;
        };

        let has_multiple = candidates.len() > 1;
        if has_multiple {
            warn!(
                "Multiple [{}] methods found in {}. Running only the first one.",
                role, decl.name
            );
        }

        bindings.insert(
            role,
            LifecycleBinding::new(&first.name, first.body.clone(), has_multiple),
        );
    }

    bindings
}

/// Keep only the class with an exactly matching name
pub fn filter_classes(
    classes: Vec<TestClass>,
    name: Option<&str>,
) -> Result<Vec<TestClass>, DiscoveryError> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return Ok(classes);
    };

    let selected: Vec<TestClass> = classes.into_iter().filter(|c| c.name == name).collect();
    if selected.is_empty() {
        return Err(DiscoveryError::NoClassFound(name.to_string()));
    }

    Ok(selected)
}

/// Methods of a class matching the method-name and category filters
pub fn filter_methods<'a>(
    class: &'a TestClass,
    name: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<&'a TestMethod>, DiscoveryError> {
    let mut methods: Vec<&TestMethod> = class
        .methods
        .iter()
        .filter(|m| category.map_or(true, |c| m.has_category(c)))
        .collect();

    if let Some(name) = name.filter(|n| !n.is_empty()) {
        methods.retain(|m| m.name == name || m.method_name == name);

        if methods.is_empty() {
            return Err(DiscoveryError::NoMethodFound {
                class: class.name.clone(),
                method: name.to_string(),
            });
        }
    }

    Ok(methods)
}

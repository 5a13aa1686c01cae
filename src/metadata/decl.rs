//! Test module declarations
//!
//! A `TestModule` plays the role of a loaded assembly: it lists types and
//! their methods together with the markers attached to each.

use std::fmt;
use std::sync::Arc;

use super::marker::{ClassMarker, IgnorePolicy, LifecycleRole, MethodMarker, RepeatPolicy};
use super::value::{ParamKind, Value};

/// Callable body of a test or lifecycle method
pub type TestFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<()> + Send + Sync>;

/// Box a closure as a `TestFn`
pub fn test_fn<F>(body: F) -> TestFn
where
    F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(body)
}

/// A method declared on a type
#[derive(Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<ParamKind>,
    pub markers: Vec<MethodMarker>,
    pub body: TestFn,
}

impl MethodDecl {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            markers: Vec::new(),
            body: test_fn(body),
        }
    }

    /// Declare a method that takes no arguments
    pub fn unit<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(name, move |_| body())
    }

    pub fn params(mut self, params: impl IntoIterator<Item = ParamKind>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    pub fn marker(mut self, marker: MethodMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn case<I, V>(self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.marker(MethodMarker::Case(args.into_iter().map(Into::into).collect()))
    }

    /// Case marker with no arguments
    pub fn test(self) -> Self {
        self.marker(MethodMarker::Case(Vec::new()))
    }

    pub fn repeat(self, policy: RepeatPolicy) -> Self {
        self.marker(MethodMarker::Repeat(policy))
    }

    pub fn ignore(self, policy: IgnorePolicy) -> Self {
        self.marker(MethodMarker::Ignore(policy))
    }

    pub fn lifecycle(self, role: LifecycleRole) -> Self {
        self.marker(MethodMarker::Lifecycle(role))
    }

    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.marker(MethodMarker::Name(name.into()))
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.marker(MethodMarker::Category(category.into()))
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A type declared in a test module
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub markers: Vec<ClassMarker>,
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn marker(mut self, marker: ClassMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn test_class(self) -> Self {
        self.marker(ClassMarker::TestClass)
    }

    pub fn parallelizable(self) -> Self {
        self.marker(ClassMarker::Parallelizable)
    }

    pub fn ignore(self, policy: IgnorePolicy) -> Self {
        self.marker(ClassMarker::Ignore(policy))
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn has_marker(&self, marker: &ClassMarker) -> bool {
        self.markers.contains(marker)
    }

    pub fn ignore_policy(&self) -> Option<&IgnorePolicy> {
        self.markers.iter().find_map(|m| match m {
            ClassMarker::Ignore(policy) => Some(policy),
            _ => None,
        })
    }
}

/// A loaded set of declared types
#[derive(Clone, Debug, Default)]
pub struct TestModule {
    pub name: String,
    pub types: Vec<TypeDecl>,
}

impl TestModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn register(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_builder_keeps_marker_order() {
        let method = MethodDecl::new("adds", |_| Ok(()))
            .params([ParamKind::Int, ParamKind::Int])
            .repeat(RepeatPolicy::repeat(2))
            .case([1, 2])
            .case([3, 4]);

        assert_eq!(method.params.len(), 2);
        assert!(matches!(method.markers[0], MethodMarker::Repeat(_)));
        assert_eq!(
            method.markers[1],
            MethodMarker::Case(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_type_builder() {
        let decl = TypeDecl::new("MathTests")
            .test_class()
            .parallelizable()
            .ignore(IgnorePolicy::always().with_reason("wip"));

        assert!(decl.has_marker(&ClassMarker::TestClass));
        assert!(decl.has_marker(&ClassMarker::Parallelizable));
        assert_eq!(
            decl.ignore_policy().and_then(|p| p.reason.as_deref()),
            Some("wip")
        );

        let module = TestModule::new("demo").register(decl);
        assert_eq!(module.len(), 1);
    }
}

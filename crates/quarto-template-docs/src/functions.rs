//! Helper functions available to templates.
//!
//! Rust has no runtime reflection over closures, so every entry in a
//! [`FuncMap`] carries a description of its signature registered alongside it.
//! The documentation page only needs the name and that description.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Describes a callable's parameter and result types.
///
/// The description is Go-style and excludes the `func` keyword, for example
/// `(string) template.HTML` or `(format string, args ...any) string`.
pub trait DescribeSignature {
    fn describe_signature(&self) -> String;
}

impl DescribeSignature for String {
    fn describe_signature(&self) -> String {
        self.clone()
    }
}

impl DescribeSignature for &'static str {
    fn describe_signature(&self) -> String {
        (*self).to_string()
    }
}

/// A structured signature: parameter types, an optional variadic tail, and
/// result types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<String>,
    variadic: Option<String>,
    results: Vec<String>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, ty: impl Into<String>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Set the variadic final parameter; printed as `...T`.
    pub fn variadic(mut self, ty: impl Into<String>) -> Self {
        self.variadic = Some(ty.into());
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.results.push(ty.into());
        self
    }
}

impl DescribeSignature for Signature {
    fn describe_signature(&self) -> String {
        let mut params: Vec<String> = self.params.clone();
        if let Some(tail) = &self.variadic {
            params.push(format!("...{}", tail));
        }
        let mut out = format!("({})", params.join(", "));
        match self.results.as_slice() {
            [] => {}
            [single] => {
                out.push(' ');
                out.push_str(single);
            }
            many => {
                out.push_str(" (");
                out.push_str(&many.join(", "));
                out.push(')');
            }
        }
        out
    }
}

/// One entry of a [`FuncMap`].
#[derive(Clone)]
pub struct Function {
    signature: Arc<dyn DescribeSignature + Send + Sync>,
}

impl Function {
    pub fn new(signature: impl DescribeSignature + Send + Sync + 'static) -> Self {
        Self {
            signature: Arc::new(signature),
        }
    }

    pub fn signature(&self) -> String {
        self.signature.describe_signature()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature())
            .finish()
    }
}

/// Functions available to a template set, keyed by the name templates call.
#[derive(Debug, Clone, Default)]
pub struct FuncMap {
    functions: BTreeMap<String, Function>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        signature: impl DescribeSignature + Send + Sync + 'static,
    ) {
        self.functions.insert(name.into(), Function::new(signature));
    }

    /// Builder form of [`FuncMap::insert`].
    pub fn with(
        mut self,
        name: impl Into<String>,
        signature: impl DescribeSignature + Send + Sync + 'static,
    ) -> Self {
        self.insert(name, signature);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.functions.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Function)> for FuncMap {
    fn from_iter<I: IntoIterator<Item = (String, Function)>>(iter: I) -> Self {
        Self {
            functions: iter.into_iter().collect(),
        }
    }
}

//! Scenario runner.
//!
//! A scenario names a class world (a `ClassTable` manifest), a pipeline and a
//! list of cases. Each case resolves one subject and states either the
//! expected rendering or the expected error category.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use type_info::path_de::from_str_with_path;
use type_info::reflect::Parameter;
use type_info::{ClassLookup, ClassTable, Error, ResolutionContext, Type, TypeResolver};

/// Scenarios bundled with the runner.
pub const DEFAULT_PATTERN: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/scenarios/*.json");

// ————————————————————————————————————————————————————————————————————————————
// SCENARIO FILES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    ReflectionOnly,
    #[default]
    DocAware,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextSpec {
    pub called: String,
    #[serde(default)]
    pub declaring: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub uses: IndexMap<String, String>,
}

impl ContextSpec {
    pub fn build(&self) -> ResolutionContext {
        let declaring = self.declaring.as_deref().unwrap_or(&self.called);
        let context = ResolutionContext::new(&self.called, declaring).with_uses(self.uses.clone());
        match &self.namespace {
            Some(namespace) => context.with_namespace(namespace.as_str()),
            None => context,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSubject {
    String(String),
    Property { class: String, name: String },
    Return { class: String, method: String },
    Parameter { class: String, method: String, name: String },
}

impl fmt::Display for CaseSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseSubject::String(text) => write!(f, "\"{text}\""),
            CaseSubject::Property { class, name } => write!(f, "{class}::${name}"),
            CaseSubject::Return { class, method } => write!(f, "{class}::{method}()"),
            CaseSubject::Parameter { class, method, name } => write!(f, "{class}::{method}(${name})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Unsupported,
    InvalidConstruction,
    MissingAncestor,
    Environment,
}

impl ErrorCategory {
    pub fn of(error: &Error) -> Self {
        match error {
            Error::Unsupported { .. } => ErrorCategory::Unsupported,
            Error::InvalidConstruction(_) => ErrorCategory::InvalidConstruction,
            Error::MissingAncestor(_) => ErrorCategory::MissingAncestor,
            Error::Environment(_) => ErrorCategory::Environment,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    pub subject: CaseSubject,
    /// Overrides the scenario context.
    #[serde(default)]
    pub context: Option<ContextSpec>,
    /// Resolve with no context at all.
    #[serde(default)]
    pub without_context: bool,
    #[serde(default)]
    pub expect: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorCategory>,
}

impl Case {
    fn expected(&self) -> anyhow::Result<Outcome> {
        match (&self.expect, self.error) {
            (Some(rendered), None) => Ok(Outcome::Rendered(rendered.clone())),
            (None, Some(category)) => Ok(Outcome::Failed(category)),
            _ => bail!("exactly one of \"expect\" or \"error\" is required"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Class manifest, relative to the scenario file.
    pub world: PathBuf,
    #[serde(default)]
    pub pipeline: Pipeline,
    #[serde(default)]
    pub context: Option<ContextSpec>,
    pub cases: Vec<Case>,
}

// ————————————————————————————————————————————————————————————————————————————
// REPORTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Rendered(String),
    Failed(ErrorCategory),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Rendered(rendered) => f.write_str(rendered),
            Outcome::Failed(category) => write!(f, "<{category:?} error>"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub scenario: PathBuf,
    pub index: usize,
    pub subject: String,
    pub expected: Outcome,
    pub actual: Outcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub results: Vec<CaseResult>,
}

impl Report {
    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn extend(&mut self, other: Report) {
        self.results.extend(other.results);
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RUNNING
// ————————————————————————————————————————————————————————————————————————————

/// Expands literal paths and glob patterns into scenario files.
pub fn discover<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = Vec::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !pattern.bytes().any(|b| matches!(b, b'*' | b'?' | b'[')) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern)? {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}

pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let src = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    from_str_with_path(&src).with_context(|| format!("invalid scenario {}", path.display()))
}

fn load_world(path: &Path) -> anyhow::Result<ClassTable> {
    let src = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    ClassTable::from_json_str(&src).with_context(|| format!("invalid class manifest {}", path.display()))
}

pub fn run_scenario(path: &Path) -> anyhow::Result<Report> {
    let scenario = load_scenario(path)?;
    let world = path.parent().unwrap_or(Path::new(".")).join(&scenario.world);
    let lookup = Arc::new(ClassLookup::new(Arc::new(load_world(&world)?)));
    let resolver = match scenario.pipeline {
        Pipeline::ReflectionOnly => TypeResolver::reflection_only(lookup.clone()),
        Pipeline::DocAware => TypeResolver::doc_aware(lookup.clone()),
    };
    debug!(scenario = %path.display(), cases = scenario.cases.len(), pipeline = ?scenario.pipeline, "running");

    let mut report = Report::default();
    for (index, case) in scenario.cases.iter().enumerate() {
        let expected = case.expected().with_context(|| format!("{} case #{index}", path.display()))?;
        let context = match (case.without_context, &case.context) {
            (true, _) => None,
            (false, Some(spec)) => Some(spec.build()),
            (false, None) => scenario.context.as_ref().map(ContextSpec::build),
        };
        let resolved = run_case(&resolver, &lookup, &case.subject, context.as_ref())
            .with_context(|| format!("{} case #{index}", path.display()))?;
        let actual = match resolved {
            Ok(ty) => Outcome::Rendered(ty.to_string()),
            Err(err) => {
                debug!(subject = %case.subject, %err, "resolution failed");
                Outcome::Failed(ErrorCategory::of(&err))
            }
        };
        report.results.push(CaseResult {
            scenario: path.to_path_buf(),
            index,
            subject: case.subject.to_string(),
            expected,
            actual,
        });
    }
    Ok(report)
}

/// The outer error reports a broken fixture, the inner one the resolution.
fn run_case(
    resolver: &TypeResolver,
    lookup: &ClassLookup,
    subject: &CaseSubject,
    context: Option<&ResolutionContext>,
) -> anyhow::Result<type_info::Result<Type>> {
    let class = |name: &str| lookup.class(name).ok_or_else(|| anyhow!("unknown class {name}"));
    Ok(match subject {
        CaseSubject::String(text) => resolver.resolve_string(text, context),
        CaseSubject::Property { class: owner, name } => {
            let property = class(owner)?.property(name).ok_or_else(|| anyhow!("unknown property {owner}::${name}"))?;
            resolver.resolve_member(property, context)
        }
        CaseSubject::Return { class: owner, method } => {
            let function = class(owner)?.method(method).ok_or_else(|| anyhow!("unknown method {owner}::{method}"))?;
            resolver.resolve_member(function, context)
        }
        CaseSubject::Parameter { class: owner, method, name } => {
            let function = class(owner)?.method(method).ok_or_else(|| anyhow!("unknown method {owner}::{method}"))?;
            let info = function.parameter(name).ok_or_else(|| anyhow!("unknown parameter ${name} of {owner}::{method}"))?;
            resolver.resolve_member(Parameter { function, info }, context)
        }
    })
}

pub fn run_all<I>(patterns: I) -> anyhow::Result<Report>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut report = Report::default();
    for path in discover(patterns)? {
        report.extend(run_scenario(&path)?);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_scenarios_pass() {
        let report = run_all([DEFAULT_PATTERN]).unwrap();
        assert!(report.results.len() > 20);
        let failures: Vec<_> = report
            .failures()
            .map(|r| format!("{} #{} {}: expected {}, got {}", r.scenario.display(), r.index, r.subject, r.expected, r.actual))
            .collect();
        assert!(failures.is_empty(), "{}", failures.join("\n"));
    }

    #[test]
    fn cases_need_one_expectation() {
        let case: Case = serde_json::from_str(r#"{ "subject": { "string": "int" } }"#).unwrap();
        assert!(case.expected().is_err());
        let case: Case = serde_json::from_str(r#"{ "subject": { "string": "int" }, "error": "unsupported" }"#).unwrap();
        assert_eq!(case.expected().unwrap(), Outcome::Failed(ErrorCategory::Unsupported));
    }

    #[test]
    fn missing_patterns_are_reported() {
        let err = discover([concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/nothing-*.json")]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }
}

//! In-memory workflow model
//!
//! A [`Pipeline`] is built fresh for each compile, validated, handed to the
//! serializer, and dropped.

use crate::command::ShellScript;
use crate::error::InvariantViolation;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Entrypoint step group of every compiled workflow
pub const ENTRYPOINT_TEMPLATE: &str = "custom-chaos";
/// Container task that installs all experiment definitions
pub const INSTALL_TEMPLATE: &str = "install-chaos-experiments";
/// Container task that deletes all chaos engines
pub const REVERT_TEMPLATE: &str = "revert-chaos";
/// Workflow parameter carrying the target namespace
pub const NAMESPACE_PARAMETER: &str = "adminModeNamespace";
/// Argo expression that expands to [`NAMESPACE_PARAMETER`] at run time
pub const NAMESPACE_PLACEHOLDER: &str = "{{workflow.parameters.adminModeNamespace}}";
/// Label holding the target cluster id
pub const CLUSTER_ID_LABEL: &str = "cluster_id";

/// Inline file placed into a container before it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub destination_path: String,
    pub inline_content: String,
}

impl Artifact {
    pub fn new(
        name: impl Into<String>,
        destination_path: impl Into<String>,
        inline_content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            destination_path: destination_path.into(),
            inline_content: inline_content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub template: String,
}

impl Step {
    /// Step whose name is also the template it runs
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            template: name.clone(),
            name,
        }
    }
}

/// Step-sets run in sequence; the steps inside one set run concurrently
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepGroup {
    step_sets: Vec<Vec<Step>>,
}

impl StepGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step-set holding a single step
    pub fn push_step(&mut self, step: Step) {
        self.step_sets.push(vec![step]);
    }

    pub fn push_step_set(&mut self, steps: Vec<Step>) {
        self.step_sets.push(steps);
    }

    pub fn step_sets(&self) -> &[Vec<Step>] {
        &self.step_sets
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.step_sets.iter().flatten()
    }
}

/// Container arguments, either literal or a single rendered shell script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerArgs {
    Literal(Vec<String>),
    Shell(ShellScript),
}

impl ContainerArgs {
    pub fn render(&self) -> Vec<String> {
        match self {
            Self::Literal(args) => args.clone(),
            Self::Shell(script) => vec![script.render()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTask {
    pub image: String,
    pub command: Vec<String>,
    pub args: ContainerArgs,
    pub input_artifacts: Vec<Artifact>,
}

impl ContainerTask {
    /// `sh -c <script>` in the given image
    pub fn shell(image: impl Into<String>, script: ShellScript) -> Self {
        Self {
            image: image.into(),
            command: vec!["sh".to_string(), "-c".to_string()],
            args: ContainerArgs::Shell(script),
            input_artifacts: Vec::new(),
        }
    }

    /// Image entrypoint with literal arguments
    pub fn with_args<I, S>(image: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            image: image.into(),
            command: Vec::new(),
            args: ContainerArgs::Literal(args.into_iter().map(Into::into).collect()),
            input_artifacts: Vec::new(),
        }
    }

    /// The first rendered argument; for shell tasks, the whole script
    pub fn command_line(&self) -> Option<String> {
        self.args.render().into_iter().next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    StepGroup(StepGroup),
    Container(ContainerTask),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub task: Task,
}

impl Template {
    pub fn new(name: impl Into<String>, task: Task) -> Self {
        Self {
            name: name.into(),
            task,
        }
    }

    pub fn as_step_group(&self) -> Option<&StepGroup> {
        match &self.task {
            Task::StepGroup(group) => Some(group),
            Task::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerTask> {
        match &self.task {
            Task::Container(container) => Some(container),
            Task::StepGroup(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityContext {
    pub run_as_user: i64,
    pub run_as_non_root: bool,
}

impl SecurityContext {
    pub fn non_root(run_as_user: i64) -> Self {
        Self {
            run_as_user,
            run_as_non_root: true,
        }
    }
}

/// A complete workflow, ready to serialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub entrypoint: String,
    pub parameters: Vec<Parameter>,
    pub service_account: String,
    pub security_context: SecurityContext,
    pub templates: Vec<Template>,
}

impl Pipeline {
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Check template names are unique, every step resolves to a template,
    /// and the entrypoint is a step group.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut by_name: HashMap<&str, &Template> = HashMap::with_capacity(self.templates.len());
        for template in &self.templates {
            if by_name.insert(template.name.as_str(), template).is_some() {
                return Err(InvariantViolation::DuplicateTemplate(template.name.clone()));
            }
        }

        match by_name.get(self.entrypoint.as_str()) {
            None => return Err(InvariantViolation::EntrypointMissing(self.entrypoint.clone())),
            Some(template) if template.as_step_group().is_none() => {
                return Err(InvariantViolation::EntrypointNotStepGroup(
                    self.entrypoint.clone(),
                ))
            }
            Some(_) => {}
        }

        let defined: HashSet<&str> = by_name.keys().copied().collect();
        for group in self.templates.iter().filter_map(Template::as_step_group) {
            if let Some(step) = group
                .steps()
                .find(|step| !defined.contains(step.template.as_str()))
            {
                return Err(InvariantViolation::MissingTemplate {
                    step: step.name.clone(),
                    template: step.template.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(templates: Vec<Template>) -> Pipeline {
        Pipeline {
            name: "wf".to_string(),
            namespace: "litmus".to_string(),
            labels: BTreeMap::new(),
            entrypoint: ENTRYPOINT_TEMPLATE.to_string(),
            parameters: Vec::new(),
            service_account: "argo-chaos".to_string(),
            security_context: SecurityContext::non_root(1000),
            templates,
        }
    }

    fn entry(steps: &[&str]) -> Template {
        let mut group = StepGroup::new();
        for step in steps {
            group.push_step(Step::named(*step));
        }
        Template::new(ENTRYPOINT_TEMPLATE, Task::StepGroup(group))
    }

    fn container(name: &str) -> Template {
        Template::new(
            name,
            Task::Container(ContainerTask::with_args("img", Vec::<String>::new())),
        )
    }

    #[test]
    fn test_valid_pipeline_passes() {
        let p = pipeline(vec![entry(&["a"]), container("a")]);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn test_unresolved_step_is_rejected() {
        let p = pipeline(vec![entry(&["a", "b"]), container("a")]);
        assert_eq!(
            p.validate(),
            Err(InvariantViolation::MissingTemplate {
                step: "b".to_string(),
                template: "b".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_template_is_rejected() {
        let p = pipeline(vec![entry(&["a"]), container("a"), container("a")]);
        assert_eq!(
            p.validate(),
            Err(InvariantViolation::DuplicateTemplate("a".to_string()))
        );
    }

    #[test]
    fn test_entrypoint_must_be_step_group() {
        let mut p = pipeline(vec![entry(&[]), container("a")]);
        p.entrypoint = "a".to_string();
        assert_eq!(
            p.validate(),
            Err(InvariantViolation::EntrypointNotStepGroup("a".to_string()))
        );

        p.entrypoint = "missing".to_string();
        assert_eq!(
            p.validate(),
            Err(InvariantViolation::EntrypointMissing("missing".to_string()))
        );
    }

    #[test]
    fn test_step_group_keeps_set_order() {
        let mut group = StepGroup::new();
        group.push_step(Step::named("first"));
        group.push_step_set(vec![Step::named("x"), Step::named("y")]);
        let names: Vec<_> = group.steps().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["first", "x", "y"]);
        assert_eq!(group.step_sets().len(), 2);
    }
}

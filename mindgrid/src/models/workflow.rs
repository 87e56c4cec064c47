//! Workflow model: an `input -> action -> output` triple run by the backend.

use serde::{Deserialize, Serialize};

use super::Resource;

/// Actions the backend knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Summarise,
    Detail,
    Paraphrase,
    AddEvent,
    UpdateEvent,
    AddTask,
    MarkDone,
    AssignToUser,
    CreateContact,
}

/// How an action constrains its output resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Output is fixed to the rule's type; the user does not pick one.
    Locked,
    /// User picks an output among resources of the rule's type.
    Filtered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRule {
    pub mode: OutputMode,
    pub resource_type: &'static str,
}

impl WorkflowAction {
    pub const ALL: [Self; 9] = [
        Self::Summarise,
        Self::Detail,
        Self::Paraphrase,
        Self::AddEvent,
        Self::UpdateEvent,
        Self::AddTask,
        Self::MarkDone,
        Self::AssignToUser,
        Self::CreateContact,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summarise => "summarise",
            Self::Detail => "detail",
            Self::Paraphrase => "paraphrase",
            Self::AddEvent => "add_event",
            Self::UpdateEvent => "update_event",
            Self::AddTask => "add_task",
            Self::MarkDone => "mark_done",
            Self::AssignToUser => "assign_to_user",
            Self::CreateContact => "create_contact",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    pub const fn output_rule(self) -> OutputRule {
        let (mode, resource_type) = match self {
            Self::Summarise | Self::Detail | Self::Paraphrase => {
                (OutputMode::Filtered, "google doc")
            }
            Self::AddEvent | Self::UpdateEvent => (OutputMode::Locked, "calendar"),
            Self::AddTask | Self::MarkDone => (OutputMode::Locked, "google doc"),
            Self::AssignToUser => (OutputMode::Locked, "task"),
            Self::CreateContact => (OutputMode::Locked, "contact"),
        };
        OutputRule {
            mode,
            resource_type,
        }
    }

    /// Resources that may serve as this action's output.
    ///
    /// Locked actions take no user-picked output, so nothing is eligible.
    pub fn eligible_outputs(self, resources: &[Resource]) -> Vec<&Resource> {
        let rule = self.output_rule();
        match rule.mode {
            OutputMode::Locked => Vec::new(),
            OutputMode::Filtered => resources
                .iter()
                .filter(|r| r.file_type == rule.resource_type)
                .collect(),
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored workflow as listed by `GET /agents/workflows/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(deserialize_with = "super::string_or_number")]
    pub workflow_id: String,
    pub input: String,
    pub action: String,
    #[serde(default)]
    pub llm: String,
    #[serde(default)]
    pub output: Option<String>,
}

impl Workflow {
    /// Key the backend's run endpoint expects for this workflow.
    pub fn run_key(&self) -> String {
        format!("wf-{}", self.workflow_id)
    }

    /// Expand the triple into three nodes and two edges.
    pub fn to_flow(&self) -> FlowGraph {
        let action_id = format!("ac-{}", self.workflow_id);
        let output_id = self.output.clone().unwrap_or_else(|| "auto".to_string());

        let nodes = vec![
            FlowNode {
                id: self.input.clone(),
                label: format!("Resource: {}", self.input),
                position: (20.0, 100.0),
            },
            FlowNode {
                id: action_id.clone(),
                label: format!("Action: {} and Action: {}", self.llm, self.action),
                position: (300.0, 100.0),
            },
            FlowNode {
                id: output_id.clone(),
                label: format!("Resource: {output_id}"),
                position: (550.0, 100.0),
            },
        ];

        let edges = vec![
            FlowEdge::between(&self.input, &action_id),
            FlowEdge::between(&action_id, &output_id),
        ];

        FlowGraph { nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub position: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl FlowEdge {
    fn between(source: &str, target: &str) -> Self {
        Self {
            id: format!("e-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Diagram of one workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// Body of `POST /agents/create-workflow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWorkflow {
    pub input: String,
    pub llm: String,
    pub output: Option<String>,
    pub action: String,
}

impl NewWorkflow {
    /// Build a request, applying the action's output rule.
    ///
    /// The prompt falls back to the action name. Locked actions force their
    /// output type; `"auto"` leaves the output to the backend.
    pub fn new(
        input: impl Into<String>,
        action: WorkflowAction,
        prompt: Option<String>,
        output: Option<String>,
    ) -> Self {
        let rule = action.output_rule();
        let output = match rule.mode {
            OutputMode::Locked => Some(rule.resource_type.to_string()),
            OutputMode::Filtered => output.filter(|o| o != "auto"),
        };
        Self {
            input: input.into(),
            llm: prompt
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| action.as_str().to_string()),
            output,
            action: action.as_str().to_string(),
        }
    }
}

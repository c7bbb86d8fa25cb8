//! Scheduled container jobs on a shared cluster.
//!
//! Each job owns a task definition and a trigger rule. Jobs share the
//! cluster node and the registry image, never a rule.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::registry::LATEST_TAG;
use super::{Construct, RegistryHandle};
use crate::error::{Error, Result};
use crate::graph::{AttrValue, GraphBuilder, NodeHandle, ResourceKind, ResourceNode, Scope};

/// `rate(<n> <unit>)`
static RATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rate\((\d+) (minutes?|hours?|days?)\)$").expect("Invalid rate regex")
});

/// `cron(<fields>)`
static CRON_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cron\(([^()]+)\)$").expect("Invalid cron regex"));

/// Job names double as scope segments and output name prefixes
static JOB_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("Invalid job name regex"));

/// Number of fields in a cron expression
const CRON_FIELDS: usize = 6;

/// Unit of a rate expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    /// Minutes
    Minute,
    /// Hours
    Hour,
    /// Days
    Day,
}

impl RateUnit {
    fn as_str(&self, plural: bool) -> &'static str {
        match (self, plural) {
            (RateUnit::Minute, false) => "minute",
            (RateUnit::Minute, true) => "minutes",
            (RateUnit::Hour, false) => "hour",
            (RateUnit::Hour, true) => "hours",
            (RateUnit::Day, false) => "day",
            (RateUnit::Day, true) => "days",
        }
    }
}

/// Recurrence rule of a scheduled job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed interval
    Rate {
        /// Interval length
        value: u32,
        /// Interval unit
        unit: RateUnit,
    },
    /// Cron fields: minute hour day-of-month month day-of-week year
    Cron(Vec<String>),
}

impl FromStr for Schedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidSchedule(s.to_string());

        if let Some(caps) = RATE_REGEX.captures(s) {
            let value: u32 = caps[1].parse().map_err(|_| invalid())?;
            let word = &caps[2];
            let plural = word.ends_with('s');
            // One takes the singular, everything else the plural
            if value == 0 || (value == 1) == plural {
                return Err(invalid());
            }
            let unit = match word.trim_end_matches('s') {
                "minute" => RateUnit::Minute,
                "hour" => RateUnit::Hour,
                _ => RateUnit::Day,
            };
            return Ok(Schedule::Rate { value, unit });
        }

        if let Some(caps) = CRON_REGEX.captures(s) {
            let fields: Vec<String> = caps[1].split_whitespace().map(str::to_string).collect();
            if fields.len() != CRON_FIELDS {
                return Err(invalid());
            }
            return Ok(Schedule::Cron(fields));
        }

        Err(invalid())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Rate { value, unit } => {
                write!(f, "rate({} {})", value, unit.as_str(*value != 1))
            }
            Schedule::Cron(fields) => write!(f, "cron({})", fields.join(" ")),
        }
    }
}

/// Memory range (MiB) a Fargate task may request for a CPU size
fn fargate_memory_range(cpu: u32) -> Option<(u32, u32)> {
    match cpu {
        256 => Some((512, 2048)),
        512 => Some((1024, 4096)),
        1024 => Some((2048, 8192)),
        2048 => Some((4096, 16384)),
        4096 => Some((8192, 30720)),
        _ => None,
    }
}

fn validate_sizing(job: &str, cpu: u32, memory: u32) -> Result<()> {
    let (min, max) = fargate_memory_range(cpu).ok_or_else(|| {
        Error::invalid_parameter(
            "cpu",
            format!("job '{}': {} is not one of 256, 512, 1024, 2048, 4096", job, cpu),
        )
    })?;
    if memory < min || memory > max || (memory != 512 && memory % 1024 != 0) {
        return Err(Error::invalid_parameter(
            "memory_limit_mib",
            format!(
                "job '{}': {} MiB is not valid with {} CPU units ({}-{} MiB)",
                job, memory, cpu, min, max
            ),
        ));
    }
    Ok(())
}

/// Cluster shared by every scheduled job
#[derive(Debug, Clone, Default)]
pub struct ClusterProps {}

impl Construct for ClusterProps {
    type Handle = NodeHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<NodeHandle> {
        builder.add_node(ResourceNode::new(
            scope.node_id("SharedFargateCluster")?,
            ResourceKind::Cluster,
        ))
    }
}

/// A container job run on a schedule.
///
/// Declare it in a scope named after the job; identifiers become
/// `{name}/{name}TaskDef` and `{name}/{name}ScheduleRule`.
#[derive(Debug, Clone)]
pub struct ScheduledJobProps {
    /// Job name
    pub name: String,
    /// Container command
    pub command: Vec<String>,
    /// `cron(...)` or `rate(...)` expression
    pub schedule: String,
    /// Memory limit in MiB; required
    pub memory_limit_mib: Option<u32>,
    /// CPU units; required
    pub cpu: Option<u32>,
    /// Cluster the task runs on
    pub cluster: NodeHandle,
    /// Registry holding the image
    pub registry: RegistryHandle,
}

/// Handle to a declared job
#[derive(Debug, Clone)]
pub struct ScheduledJobHandle {
    /// Task definition node
    pub task_definition: NodeHandle,
    /// Trigger rule node
    pub rule: NodeHandle,
}

/// Name of the stack output carrying a job's repository URI
pub fn job_output_name(job: &str) -> String {
    format!("{}RepositoryUri", job)
}

/// Check a job's name, sizing and schedule without declaring anything.
///
/// Returns the memory, CPU and parsed schedule.
pub fn validate_job(
    name: &str,
    memory_limit_mib: Option<u32>,
    cpu: Option<u32>,
    schedule: &str,
) -> Result<(u32, u32, Schedule)> {
    if !JOB_NAME_REGEX.is_match(name) {
        return Err(Error::invalid_parameter(
            "jobs",
            format!("'{}' is not a valid job name", name),
        ));
    }
    let memory = memory_limit_mib.ok_or_else(|| Error::MissingJobSizing {
        job: name.to_string(),
        field: "memory_limit_mib".to_string(),
    })?;
    let cpu = cpu.ok_or_else(|| Error::MissingJobSizing {
        job: name.to_string(),
        field: "cpu".to_string(),
    })?;
    validate_sizing(name, cpu, memory)?;
    let schedule = schedule.parse()?;
    Ok((memory, cpu, schedule))
}

impl Construct for ScheduledJobProps {
    type Handle = ScheduledJobHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<ScheduledJobHandle> {
        let (memory, cpu, schedule) =
            validate_job(&self.name, self.memory_limit_mib, self.cpu, &self.schedule)?;
        let name = &self.name;

        let mut container = vec![
            ("Name", AttrValue::from(format!("{}Container", name))),
            (
                "Image",
                AttrValue::map([
                    ("Repository", AttrValue::from(self.registry.uri())),
                    ("Tag", AttrValue::from(LATEST_TAG)),
                ]),
            ),
            (
                "LogConfiguration",
                AttrValue::map([
                    ("LogDriver", AttrValue::from("awslogs")),
                    (
                        "Options",
                        AttrValue::map([("awslogs-stream-prefix", name.as_str())]),
                    ),
                ]),
            ),
        ];
        if !self.command.is_empty() {
            container.push(("Command", AttrValue::strings(self.command.iter())));
        }

        let task_definition = builder.add_node(
            ResourceNode::new(
                scope.node_id(&format!("{}TaskDef", name))?,
                ResourceKind::TaskDefinition,
            )
            .with_attr("RequiresCompatibilities", AttrValue::strings(["FARGATE"]))
            .with_attr("NetworkMode", "awsvpc")
            .with_attr("Cpu", cpu.to_string())
            .with_attr("Memory", memory.to_string())
            .with_attr("ContainerDefinitions", vec![AttrValue::map(container)]),
        )?;

        let rule = builder.add_node(
            ResourceNode::new(
                scope.node_id(&format!("{}ScheduleRule", name))?,
                ResourceKind::ScheduledTask,
            )
            .with_attr("ScheduleExpression", schedule.to_string())
            .with_attr("State", "ENABLED")
            .with_attr(
                "Targets",
                vec![AttrValue::map([
                    ("Id", AttrValue::from(format!("{}Target", name))),
                    ("Arn", AttrValue::from(self.cluster.output("Arn"))),
                    (
                        "EcsParameters",
                        AttrValue::map([
                            ("TaskDefinitionArn", AttrValue::from(task_definition.reference())),
                            ("LaunchType", AttrValue::from("FARGATE")),
                            ("TaskCount", AttrValue::from(1u32)),
                            ("SubnetType", AttrValue::from("PRIVATE_WITH_EGRESS")),
                        ]),
                    ),
                ])],
            ),
        )?;

        builder.add_output(
            job_output_name(name),
            self.registry.uri(),
            format!("ECR repository URI for the {} job", name),
        )?;

        debug!(job = %name, schedule = %schedule, cpu, memory, "declared scheduled job");

        Ok(ScheduledJobHandle {
            task_definition,
            rule,
        })
    }
}
